//! Patient identity and patient record operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Consent, FileRef, Gender, Identification, Patient, PatientIdentity};

const PATIENT_COLUMNS: &str = r#"
    id, user_id, name, email, phone, birth_date, gender, address, occupation,
    emergency_contact_name, emergency_contact_number, primary_physician,
    insurance_provider, insurance_policy_number, allergies, current_medication,
    family_medical_history, past_medical_history, identification_type,
    identification_number, identification_document, treatment_consent,
    disclosure_consent, privacy_consent, created_at
"#;

impl Database {
    /// Insert a new patient identity.
    pub fn insert_identity(&self, identity: &PatientIdentity) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patient_identities (id, name, email, phone, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                identity.id,
                identity.name,
                identity.email,
                identity.phone,
                identity.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get an identity by ID.
    pub fn get_identity(&self, id: &str) -> DbResult<Option<PatientIdentity>> {
        self.conn
            .query_row(
                "SELECT id, name, email, phone, created_at FROM patient_identities WHERE id = ?",
                [id],
                identity_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get an identity by email (emails are unique).
    pub fn get_identity_by_email(&self, email: &str) -> DbResult<Option<PatientIdentity>> {
        self.conn
            .query_row(
                "SELECT id, name, email, phone, created_at FROM patient_identities WHERE email = ?",
                [email],
                identity_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Insert a registered patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        let document = patient
            .identification
            .document
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            &format!(
                "INSERT INTO patients ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, \
                 ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)",
                PATIENT_COLUMNS
            ),
            params![
                patient.id,
                patient.user_id,
                patient.name,
                patient.email,
                patient.phone,
                patient.birth_date.format("%Y-%m-%d").to_string(),
                patient.gender.as_str(),
                patient.address,
                patient.occupation,
                patient.emergency_contact_name,
                patient.emergency_contact_number,
                patient.primary_physician,
                patient.insurance_provider,
                patient.insurance_policy_number,
                patient.allergies,
                patient.current_medication,
                patient.family_medical_history,
                patient.past_medical_history,
                patient.identification.kind,
                patient.identification.number,
                document,
                patient.consent.treatment,
                patient.consent.disclosure,
                patient.consent.privacy,
                patient.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get the patient registered for an identity.
    pub fn get_patient_by_user(&self, user_id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE user_id = ?", PATIENT_COLUMNS),
                [user_id],
                PatientRow::from_row,
            )
            .optional()?
            .map(Patient::try_from)
            .transpose()
    }

    /// Get a patient by record ID.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
                [id],
                PatientRow::from_row,
            )
            .optional()?
            .map(Patient::try_from)
            .transpose()
    }
}

fn identity_from_row(row: &Row<'_>) -> rusqlite::Result<PatientIdentity> {
    Ok(PatientIdentity {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: String,
    user_id: String,
    name: String,
    email: String,
    phone: String,
    birth_date: String,
    gender: String,
    address: String,
    occupation: String,
    emergency_contact_name: String,
    emergency_contact_number: String,
    primary_physician: String,
    insurance_provider: String,
    insurance_policy_number: String,
    allergies: Option<String>,
    current_medication: Option<String>,
    family_medical_history: Option<String>,
    past_medical_history: Option<String>,
    identification_type: Option<String>,
    identification_number: Option<String>,
    identification_document: Option<String>,
    treatment_consent: bool,
    disclosure_consent: bool,
    privacy_consent: bool,
    created_at: String,
}

impl PatientRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            birth_date: row.get(5)?,
            gender: row.get(6)?,
            address: row.get(7)?,
            occupation: row.get(8)?,
            emergency_contact_name: row.get(9)?,
            emergency_contact_number: row.get(10)?,
            primary_physician: row.get(11)?,
            insurance_provider: row.get(12)?,
            insurance_policy_number: row.get(13)?,
            allergies: row.get(14)?,
            current_medication: row.get(15)?,
            family_medical_history: row.get(16)?,
            past_medical_history: row.get(17)?,
            identification_type: row.get(18)?,
            identification_number: row.get(19)?,
            identification_document: row.get(20)?,
            treatment_consent: row.get(21)?,
            disclosure_consent: row.get(22)?,
            privacy_consent: row.get(23)?,
            created_at: row.get(24)?,
        })
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let birth_date = NaiveDate::parse_from_str(&row.birth_date, "%Y-%m-%d")
            .map_err(|e| DbError::Constraint(format!("Bad birth date {}: {}", row.birth_date, e)))?;
        let gender = Gender::parse(&row.gender)
            .ok_or_else(|| DbError::Constraint(format!("Unknown gender: {}", row.gender)))?;
        let document: Option<FileRef> = row
            .identification_document
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Patient {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            birth_date,
            gender,
            address: row.address,
            occupation: row.occupation,
            emergency_contact_name: row.emergency_contact_name,
            emergency_contact_number: row.emergency_contact_number,
            primary_physician: row.primary_physician,
            insurance_provider: row.insurance_provider,
            insurance_policy_number: row.insurance_policy_number,
            allergies: row.allergies,
            current_medication: row.current_medication,
            family_medical_history: row.family_medical_history,
            past_medical_history: row.past_medical_history,
            identification: Identification {
                kind: row.identification_type,
                number: row.identification_number,
                document,
            },
            consent: Consent {
                treatment: row.treatment_consent,
                disclosure: row.disclosure_consent,
                privacy: row.privacy_consent,
            },
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_registration;

    fn setup_db() -> (Database, PatientIdentity) {
        let db = Database::open_in_memory().unwrap();
        let identity = PatientIdentity::new(
            "Jean Dupont".into(),
            "jean@x.com".into(),
            "+225 0102030405".into(),
        );
        db.insert_identity(&identity).unwrap();
        (db, identity)
    }

    #[test]
    fn test_identity_lookup() {
        let (db, identity) = setup_db();

        let by_id = db.get_identity(&identity.id).unwrap().unwrap();
        assert_eq!(by_id, identity);

        let by_email = db.get_identity_by_email("jean@x.com").unwrap().unwrap();
        assert_eq!(by_email.id, identity.id);

        assert!(db.get_identity("missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (db, _) = setup_db();
        let duplicate = PatientIdentity::new("Other".into(), "jean@x.com".into(), "+225 0102030406".into());
        assert!(matches!(db.insert_identity(&duplicate), Err(DbError::Sqlite(_))));
    }

    #[test]
    fn test_insert_and_get_patient() {
        let (db, identity) = setup_db();

        let document = FileRef {
            id: "file-1".into(),
            file_name: "passport.png".into(),
            content_type: "image/png".into(),
            checksum: "abc".into(),
            url: "/storage/files/file-1/view".into(),
        };
        let patient = Patient::from_registration(sample_registration(&identity.id), Some(document.clone()));
        db.insert_patient(&patient).unwrap();

        let retrieved = db.get_patient_by_user(&identity.id).unwrap().unwrap();
        assert_eq!(retrieved, patient);
        assert_eq!(retrieved.identification.document, Some(document));

        let by_id = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(by_id.user_id, identity.id);
    }

    #[test]
    fn test_patient_requires_identity() {
        let (db, _) = setup_db();
        let patient = Patient::from_registration(sample_registration("no-such-user"), None);
        assert!(db.insert_patient(&patient).is_err());
    }
}
