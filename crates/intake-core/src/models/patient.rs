//! Patient models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::FileRef;

/// Gender options offered by the registration form.
pub const GENDER_OPTIONS: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

/// Identification document types offered by the registration form.
pub const IDENTIFICATION_TYPES: &[&str] = &[
    "Birth Certificate",
    "Driver's License",
    "Medical Insurance Card/Policy",
    "Military ID Card",
    "National Identity Card",
    "Passport",
    "Resident Alien Card (Green Card)",
    "Social Security Card",
    "State ID Card",
    "Student ID Card",
    "Voter ID Card",
];

/// Physicians a patient can pick as primary physician or book with.
pub const PHYSICIANS: &[Physician] = &[
    Physician { name: "John Green", image: "/assets/images/dr-green.png" },
    Physician { name: "Leila Cameron", image: "/assets/images/dr-cameron.png" },
    Physician { name: "David Livingston", image: "/assets/images/dr-livingston.png" },
    Physician { name: "Evan Peter", image: "/assets/images/dr-peter.png" },
    Physician { name: "Jane Powell", image: "/assets/images/dr-powell.png" },
    Physician { name: "Alex Ramirez", image: "/assets/images/dr-remirez.png" },
    Physician { name: "Jasmine Lee", image: "/assets/images/dr-lee.png" },
    Physician { name: "Alyana Cruz", image: "/assets/images/dr-cruz.png" },
    Physician { name: "Hardik Sharma", image: "/assets/images/dr-sharma.png" },
];

/// A physician entry for select widgets.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Physician {
    pub name: &'static str,
    pub image: &'static str,
}

/// Look up a physician by display name.
pub fn find_physician(name: &str) -> Option<&'static Physician> {
    PHYSICIANS.iter().find(|p| p.name == name)
}

/// The account created by the intake form, before full registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientIdentity {
    /// Opaque identity ID, used in every patient route
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Creation timestamp
    pub created_at: String,
}

impl PatientIdentity {
    /// Create a new identity with a fresh ID.
    pub fn new(name: String, email: String, phone: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
            phone,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    /// Parse the form/storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        GENDER_OPTIONS.into_iter().find(|g| g.as_str() == s)
    }
}

/// Consent flags collected at registration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Consent {
    pub treatment: bool,
    pub disclosure: bool,
    pub privacy: bool,
}

impl Consent {
    /// All three consents granted.
    pub fn all_granted(&self) -> bool {
        self.treatment && self.disclosure && self.privacy
    }
}

/// Identification details. Every part is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Identification {
    pub kind: Option<String>,
    pub number: Option<String>,
    /// Uploaded scan of the document
    pub document: Option<FileRef>,
}

/// Fields of a registration as sent to persistence.
///
/// The identification document itself travels separately as an
/// [`IdentificationUpload`](super::IdentificationUpload).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRegistration {
    /// Identity this registration completes
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub address: String,
    pub occupation: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    pub primary_physician: String,
    pub insurance_provider: String,
    pub insurance_policy_number: String,
    pub allergies: Option<String>,
    pub current_medication: Option<String>,
    pub family_medical_history: Option<String>,
    pub past_medical_history: Option<String>,
    pub identification_type: Option<String>,
    pub identification_number: Option<String>,
    pub consent: Consent,
}

/// A registered patient record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Record ID assigned by persistence
    pub id: String,
    /// Identity ID (the one that appears in routes)
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub address: String,
    pub occupation: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    pub primary_physician: String,
    pub insurance_provider: String,
    pub insurance_policy_number: String,
    pub allergies: Option<String>,
    pub current_medication: Option<String>,
    pub family_medical_history: Option<String>,
    pub past_medical_history: Option<String>,
    pub identification: Identification,
    pub consent: Consent,
    /// Creation timestamp
    pub created_at: String,
}

impl Patient {
    /// Build a record from a registration and an optional stored document.
    pub fn from_registration(registration: PatientRegistration, document: Option<FileRef>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: registration.user_id,
            name: registration.name,
            email: registration.email,
            phone: registration.phone,
            birth_date: registration.birth_date,
            gender: registration.gender,
            address: registration.address,
            occupation: registration.occupation,
            emergency_contact_name: registration.emergency_contact_name,
            emergency_contact_number: registration.emergency_contact_number,
            primary_physician: registration.primary_physician,
            insurance_provider: registration.insurance_provider,
            insurance_policy_number: registration.insurance_policy_number,
            allergies: registration.allergies,
            current_medication: registration.current_medication,
            family_medical_history: registration.family_medical_history,
            past_medical_history: registration.past_medical_history,
            identification: Identification {
                kind: registration.identification_type,
                number: registration.identification_number,
                document,
            },
            consent: registration.consent,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// A record is complete once every consent has been granted.
    pub fn is_complete(&self) -> bool {
        self.consent.all_granted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_registration;

    #[test]
    fn test_from_registration() {
        let patient = Patient::from_registration(sample_registration("user-1"), None);
        assert_eq!(patient.user_id, "user-1");
        assert_eq!(patient.id.len(), 36); // UUID format
        assert_eq!(patient.identification.kind.as_deref(), Some("Passport"));
        assert!(patient.identification.document.is_none());
        assert!(patient.is_complete());
    }

    #[test]
    fn test_incomplete_without_consent() {
        let mut registration = sample_registration("user-1");
        registration.consent.privacy = false;
        let patient = Patient::from_registration(registration, None);
        assert!(!patient.is_complete());
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("Female"), Some(Gender::Female));
        assert_eq!(Gender::parse("female"), None);
    }

    #[test]
    fn test_find_physician() {
        assert!(find_physician("Jane Powell").is_some());
        assert!(find_physician("Dr Nobody").is_none());
    }
}
