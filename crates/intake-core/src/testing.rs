//! Shared fixtures for unit tests.

use chrono::{NaiveDate, TimeZone, Utc};

use crate::models::{AppointmentStatus, Consent, Gender, NewAppointment, PatientRegistration};

pub(crate) fn sample_registration(user_id: &str) -> PatientRegistration {
    PatientRegistration {
        user_id: user_id.into(),
        name: "Jean Dupont".into(),
        email: "jean@x.com".into(),
        phone: "+225 0102030405".into(),
        birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
        gender: Gender::Male,
        address: "Abidjan Koumassi, Cite 147".into(),
        occupation: "Developpeur web".into(),
        emergency_contact_name: "Marie Dupont".into(),
        emergency_contact_number: "+225 0708091011".into(),
        primary_physician: "John Green".into(),
        insurance_provider: "MUGEF-CI".into(),
        insurance_policy_number: "ABC123456".into(),
        allergies: Some("Penicillin".into()),
        current_medication: None,
        family_medical_history: None,
        past_medical_history: None,
        identification_type: Some("Passport".into()),
        identification_number: Some("P1234567".into()),
        consent: Consent { treatment: true, disclosure: true, privacy: true },
    }
}

pub(crate) fn sample_appointment(user_id: &str, patient_id: &str) -> NewAppointment {
    NewAppointment {
        user_id: user_id.into(),
        patient_id: patient_id.into(),
        primary_physician: "Dr A".into(),
        schedule: Utc.with_ymd_and_hms(2030, 1, 15, 9, 30, 0).unwrap(),
        reason: "checkup".into(),
        note: None,
        status: AppointmentStatus::Pending,
    }
}
