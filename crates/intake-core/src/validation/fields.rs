//! Field names shared by schemas, value trees and renderers.

pub const NAME: &str = "name";
pub const EMAIL: &str = "email";
pub const PHONE: &str = "phone";

pub const BIRTH_DATE: &str = "birthDate";
pub const GENDER: &str = "gender";
pub const ADDRESS: &str = "address";
pub const OCCUPATION: &str = "occupation";
pub const EMERGENCY_CONTACT_NAME: &str = "emergencyContactName";
pub const EMERGENCY_CONTACT_NUMBER: &str = "emergencyContactNumber";
pub const PRIMARY_PHYSICIAN: &str = "primaryPhysician";
pub const INSURANCE_PROVIDER: &str = "insuranceProvider";
pub const INSURANCE_POLICY_NUMBER: &str = "insurancePolicyNumber";
pub const ALLERGIES: &str = "allergies";
pub const CURRENT_MEDICATION: &str = "currentMedication";
pub const FAMILY_MEDICAL_HISTORY: &str = "familyMedicalHistory";
pub const PAST_MEDICAL_HISTORY: &str = "pastMedicalHistory";
pub const IDENTIFICATION_TYPE: &str = "identificationType";
pub const IDENTIFICATION_NUMBER: &str = "identificationNumber";
pub const IDENTIFICATION_DOCUMENT: &str = "identificationDocument";
pub const TREATMENT_CONSENT: &str = "treatmentConsent";
pub const DISCLOSURE_CONSENT: &str = "disclosureConsent";
pub const PRIVACY_CONSENT: &str = "privacyConsent";

pub const SCHEDULE: &str = "schedule";
pub const REASON: &str = "reason";
pub const NOTE: &str = "note";
pub const CANCELLATION_REASON: &str = "cancellationReason";
