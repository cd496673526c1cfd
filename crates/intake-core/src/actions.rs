//! Persistence actions consumed by the form controllers.
//!
//! Every action is a fallible call with no retry and no idempotency
//! guarantee. Callers run on a single thread, so futures are not `Send`.

use async_trait::async_trait;
use thiserror::Error;

use crate::db::DbError;
use crate::models::{
    Appointment, AppointmentAction, AppointmentUpdate, FileRef, IdentificationUpload,
    NewAppointment, Patient, PatientIdentity, PatientRegistration, RecentAppointments,
};
use crate::validation::PatientIntake;

/// Persistence action errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl ActionError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ActionError::NotFound(_))
    }
}

impl From<DbError> for ActionError {
    fn from(e: DbError) -> Self {
        ActionError::Backend(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ActionError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ActionError::Backend(format!("Lock poisoned: {}", e))
    }
}

pub type ActionResult<T> = Result<T, ActionError>;

/// Operations the intake workflow performs against the persistence layer.
#[async_trait(?Send)]
pub trait PersistenceActions {
    /// Create the identity behind an intake form. An existing identity with
    /// the same email is returned as is.
    async fn create_patient_identity(&self, intake: PatientIntake) -> ActionResult<PatientIdentity>;

    async fn get_patient_identity(&self, user_id: &str) -> ActionResult<PatientIdentity>;

    /// Register a patient, storing the identification document first when
    /// one is supplied.
    async fn register_patient(
        &self,
        registration: PatientRegistration,
        document: Option<IdentificationUpload>,
    ) -> ActionResult<Patient>;

    /// Get the patient registered for an identity ID.
    async fn get_patient_by_id(&self, user_id: &str) -> ActionResult<Patient>;

    async fn create_appointment(&self, appointment: NewAppointment) -> ActionResult<Appointment>;

    async fn get_appointment(&self, appointment_id: &str) -> ActionResult<Appointment>;

    /// Apply a staff action to an appointment.
    async fn update_appointment(
        &self,
        appointment_id: &str,
        update: AppointmentUpdate,
        action: AppointmentAction,
    ) -> ActionResult<Appointment>;

    /// Every appointment, newest first, with per-status counts.
    async fn list_recent_appointments(&self) -> ActionResult<RecentAppointments>;

    async fn upload_file(&self, upload: IdentificationUpload) -> ActionResult<FileRef>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_are_backend_errors() {
        let err: ActionError = DbError::Constraint("bad".into()).into();
        assert!(!err.is_not_found());
        assert_eq!(err, ActionError::Backend("Constraint violation: bad".into()));
    }
}
