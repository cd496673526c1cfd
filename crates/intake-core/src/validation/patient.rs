//! Patient intake and registration schemas.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::checker::Checker;
use super::fields::*;
use super::{RawValues, Schema, ValidationErrors};
use crate::models::{Consent, FileAttachment, Gender, PatientRegistration};

pub const TREATMENT_CONSENT_MESSAGE: &str = "You must consent to treatment in order to proceed";
pub const DISCLOSURE_CONSENT_MESSAGE: &str = "You must consent to disclosure in order to proceed";
pub const PRIVACY_CONSENT_MESSAGE: &str = "You must consent to privacy in order to proceed";

/// Validated intake form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientIntake {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Intake form: name, email, phone.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatientIntakeSchema;

impl PatientIntakeSchema {
    fn check(check: &mut Checker<'_>) -> PatientIntake {
        PatientIntake {
            name: check.required_text(NAME, "Name", 2, 50),
            email: check.email(EMAIL),
            phone: check.phone(PHONE),
        }
    }
}

impl Schema for PatientIntakeSchema {
    type Output = PatientIntake;

    fn validate(&self, values: &RawValues) -> Result<PatientIntake, ValidationErrors> {
        let mut check = Checker::new(values);
        let intake = Self::check(&mut check);
        check.finish(intake)
    }
}

/// Validated registration form.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub intake: PatientIntake,
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
    pub identification_document: Option<FileAttachment>,
    pub consent: Consent,
}

impl Registration {
    /// Split into the persisted fields and the picked document, if any.
    pub fn into_parts(self, user_id: impl Into<String>) -> (PatientRegistration, Option<FileAttachment>) {
        let registration = PatientRegistration {
            user_id: user_id.into(),
            name: self.intake.name,
            email: self.intake.email,
            phone: self.intake.phone,
            birth_date: self.birth_date,
            gender: self.gender,
            address: self.address,
            occupation: self.occupation,
            emergency_contact_name: self.emergency_contact_name,
            emergency_contact_number: self.emergency_contact_number,
            primary_physician: self.primary_physician,
            insurance_provider: self.insurance_provider,
            insurance_policy_number: self.insurance_policy_number,
            allergies: self.allergies,
            current_medication: self.current_medication,
            family_medical_history: self.family_medical_history,
            past_medical_history: self.past_medical_history,
            identification_type: self.identification_type,
            identification_number: self.identification_number,
            consent: self.consent,
        };
        (registration, self.identification_document)
    }
}

/// Full registration form: intake fields plus demographics, medical
/// history, identification and consents.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationSchema;

impl Schema for RegistrationSchema {
    type Output = Registration;

    fn validate(&self, values: &RawValues) -> Result<Registration, ValidationErrors> {
        let mut check = Checker::new(values);

        let intake = PatientIntakeSchema::check(&mut check);
        let birth_date = check.date(BIRTH_DATE);
        let gender = check.choice(GENDER, "gender", Gender::parse);
        let address = check.required_text(ADDRESS, "Address", 5, 500);
        let occupation = check.required_text(OCCUPATION, "Occupation", 2, 500);
        let emergency_contact_name =
            check.required_text(EMERGENCY_CONTACT_NAME, "Emergency contact name", 2, 50);
        let emergency_contact_number = check.phone(EMERGENCY_CONTACT_NUMBER);
        let primary_physician = physician(&mut check);
        let insurance_provider = check.required_text(INSURANCE_PROVIDER, "Insurance provider", 2, 50);
        let insurance_policy_number =
            check.required_text(INSURANCE_POLICY_NUMBER, "Insurance policy number", 2, 50);
        let allergies = check.optional_text(ALLERGIES, "Allergies", 500);
        let current_medication = check.optional_text(CURRENT_MEDICATION, "Current medication", 500);
        let family_medical_history =
            check.optional_text(FAMILY_MEDICAL_HISTORY, "Family medical history", 500);
        let past_medical_history =
            check.optional_text(PAST_MEDICAL_HISTORY, "Past medical history", 500);
        let identification_type = check.optional_text(IDENTIFICATION_TYPE, "Identification type", 100);
        let identification_number =
            check.optional_text(IDENTIFICATION_NUMBER, "Identification number", 100);
        let identification_document =
            check.single_file(IDENTIFICATION_DOCUMENT, "identification document");
        let consent = Consent {
            treatment: check.must_be_true(TREATMENT_CONSENT, TREATMENT_CONSENT_MESSAGE),
            disclosure: check.must_be_true(DISCLOSURE_CONSENT, DISCLOSURE_CONSENT_MESSAGE),
            privacy: check.must_be_true(PRIVACY_CONSENT, PRIVACY_CONSENT_MESSAGE),
        };

        check.finish(Registration {
            intake,
            birth_date,
            // placeholder only reached on error, which `finish` discards
            gender: gender.unwrap_or(Gender::Other),
            address,
            occupation,
            emergency_contact_name,
            emergency_contact_number,
            primary_physician,
            insurance_provider,
            insurance_policy_number,
            allergies,
            current_medication,
            family_medical_history,
            past_medical_history,
            identification_type,
            identification_number,
            identification_document,
            consent,
        })
    }
}

/// Physician select: at least two characters.
pub(crate) fn physician(check: &mut Checker<'_>) -> String {
    let name = check.required_text(PRIMARY_PHYSICIAN, "Physician", 2, 100);
    if name.chars().count() < 2 {
        // replace the generic length message with the select hint
        check.replace_last(PRIMARY_PHYSICIAN, "Select at least one doctor");
    }
    name
}
