//! Intake Core Library
//!
//! Patient intake, registration and appointment scheduling.
//!
//! # Architecture
//!
//! ```text
//! Form input ──► Validation Schema ──► Persistence Action ──► Navigation
//!                 (pass / fail)          (IntakeCore)
//!                                             │
//!                          ┌──────────────────┼──────────────────┐
//!                          ▼                  ▼                  ▼
//!                      Patients          Appointments       Stored files
//!                                             │
//!                                    Admin aggregate view
//! ```
//!
//! # Core Principle
//!
//! **Appointment status is set, never inferred.** The status written to
//! storage always comes from the action that produced it.
//!
//! # Modules
//!
//! - [`validation`]: Schemas for the intake, registration and appointment forms
//! - [`models`]: Domain types (Patient, Appointment, FileRef, etc.)
//! - [`actions`]: Persistence actions trait and errors
//! - [`db`]: SQLite database layer
//! - [`notify`]: Best-effort patient notifications
//! - [`config`]: Application configuration

pub mod actions;
pub mod config;
pub mod db;
pub mod models;
pub mod notify;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use actions::{ActionError, ActionResult, PersistenceActions};
pub use config::{AppConfig, ConfigError};
pub use db::Database;
pub use models::{
    Appointment, AppointmentAction, AppointmentCounts, AppointmentStatus, AppointmentUpdate,
    FileAttachment, FileRef, IdentificationUpload, NewAppointment, Patient, PatientIdentity,
    PatientRegistration, RecentAppointments,
};
pub use notify::{LogNotifier, Notifier};
pub use validation::{FieldValue, RawValues, Schema, ValidationErrors};

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::validation::PatientIntake;

// =========================================================================
// Main API Object
// =========================================================================

/// SQLite-backed persistence for the intake workflow.
pub struct IntakeCore {
    db: Arc<Mutex<Database>>,
    notifier: Box<dyn Notifier>,
    storage_url: String,
    clinic_name: String,
}

impl IntakeCore {
    /// Open the database named by the configuration, in memory when none is set.
    pub fn open(config: &AppConfig) -> ActionResult<Self> {
        let db = match &config.database_path {
            Some(path) => {
                log::info!("Opening intake database at {}", path.display());
                Database::open(path)?
            }
            None => {
                log::info!("Opening in-memory intake database");
                Database::open_in_memory()?
            }
        };
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            notifier: Box::new(LogNotifier),
            storage_url: config.storage_url.trim_end_matches('/').to_string(),
            clinic_name: config.clinic_name.clone(),
        })
    }

    /// Create an in-memory store with default settings (for testing).
    pub fn open_in_memory() -> ActionResult<Self> {
        Self::open(&AppConfig::default())
    }

    /// Replace the notifier used after staff actions.
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    fn db(&self) -> ActionResult<MutexGuard<'_, Database>> {
        Ok(self.db.lock()?)
    }

    fn store_file(&self, db: &Database, upload: &IdentificationUpload) -> ActionResult<FileRef> {
        let stored = db.insert_file(upload)?;
        log::info!(
            "Stored file {} ({} bytes) as {}",
            stored.file_name,
            stored.size,
            stored.id
        );
        Ok(FileRef {
            url: format!("{}/files/{}/view", self.storage_url, stored.id),
            id: stored.id,
            file_name: stored.file_name,
            content_type: stored.content_type,
            checksum: stored.checksum,
        })
    }

    fn send_notification(&self, action: AppointmentAction, appointment: &Appointment) {
        let Some(message) = notify::notification_message(&self.clinic_name, action, appointment)
        else {
            return;
        };
        if let Err(e) = self.notifier.notify(&appointment.user_id, &message) {
            log::warn!("Could not notify {}: {}", appointment.user_id, e);
        }
    }
}

#[async_trait(?Send)]
impl PersistenceActions for IntakeCore {
    async fn create_patient_identity(&self, intake: PatientIntake) -> ActionResult<PatientIdentity> {
        let db = self.db()?;
        if let Some(existing) = db.get_identity_by_email(&intake.email)? {
            log::info!("Identity for {} already exists: {}", intake.email, existing.id);
            return Ok(existing);
        }

        let identity = PatientIdentity::new(intake.name, intake.email, intake.phone);
        db.insert_identity(&identity)?;
        log::info!("Created patient identity {}", identity.id);
        Ok(identity)
    }

    async fn get_patient_identity(&self, user_id: &str) -> ActionResult<PatientIdentity> {
        self.db()?
            .get_identity(user_id)?
            .ok_or_else(|| ActionError::NotFound(format!("patient identity {}", user_id)))
    }

    async fn register_patient(
        &self,
        registration: PatientRegistration,
        document: Option<IdentificationUpload>,
    ) -> ActionResult<Patient> {
        if !registration.consent.all_granted() {
            return Err(ActionError::Rejected("all consents must be granted".into()));
        }

        let db = self.db()?;
        if db.get_identity(&registration.user_id)?.is_none() {
            return Err(ActionError::NotFound(format!(
                "patient identity {}",
                registration.user_id
            )));
        }
        if db.get_patient_by_user(&registration.user_id)?.is_some() {
            return Err(ActionError::Rejected(format!(
                "identity {} is already registered",
                registration.user_id
            )));
        }

        let patient = db.transaction(|db| -> ActionResult<Patient> {
            let document = document
                .map(|upload| self.store_file(db, &upload))
                .transpose()?;
            let patient = Patient::from_registration(registration, document);
            db.insert_patient(&patient)?;
            Ok(patient)
        })?;
        log::info!("Registered patient {} for identity {}", patient.id, patient.user_id);
        Ok(patient)
    }

    async fn get_patient_by_id(&self, user_id: &str) -> ActionResult<Patient> {
        self.db()?
            .get_patient_by_user(user_id)?
            .ok_or_else(|| ActionError::NotFound(format!("patient for identity {}", user_id)))
    }

    async fn create_appointment(&self, appointment: NewAppointment) -> ActionResult<Appointment> {
        if appointment.status != AppointmentAction::Create.status() {
            return Err(ActionError::Rejected(format!(
                "new appointments must be {}, got {}",
                AppointmentAction::Create.status(),
                appointment.status
            )));
        }

        let db = self.db()?;
        let patient = db
            .get_patient(&appointment.patient_id)?
            .ok_or_else(|| ActionError::NotFound(format!("patient {}", appointment.patient_id)))?;

        let appointment = Appointment::from_request(appointment, patient.name);
        db.insert_appointment(&appointment)?;
        log::info!(
            "Created appointment {} with {} for {}",
            appointment.id,
            appointment.primary_physician,
            appointment.schedule
        );
        Ok(appointment)
    }

    async fn get_appointment(&self, appointment_id: &str) -> ActionResult<Appointment> {
        self.db()?
            .get_appointment(appointment_id)?
            .ok_or_else(|| ActionError::NotFound(format!("appointment {}", appointment_id)))
    }

    async fn update_appointment(
        &self,
        appointment_id: &str,
        update: AppointmentUpdate,
        action: AppointmentAction,
    ) -> ActionResult<Appointment> {
        if update.status != action.status() {
            return Err(ActionError::Rejected(format!(
                "status {} does not match action {}",
                update.status, action
            )));
        }
        if action == AppointmentAction::Cancel
            && update.cancellation_reason.as_deref().map_or(true, |r| r.trim().is_empty())
        {
            return Err(ActionError::Rejected("cancellation requires a reason".into()));
        }

        let appointment = {
            let db = self.db()?;
            let mut appointment = db
                .get_appointment(appointment_id)?
                .ok_or_else(|| ActionError::NotFound(format!("appointment {}", appointment_id)))?;
            appointment.apply(update);
            db.update_appointment(&appointment)?;
            appointment
        };
        log::info!("Appointment {} is now {}", appointment.id, appointment.status);

        self.send_notification(action, &appointment);
        Ok(appointment)
    }

    async fn list_recent_appointments(&self) -> ActionResult<RecentAppointments> {
        let documents = self.db()?.list_recent_appointments()?;
        Ok(RecentAppointments::from_documents(documents))
    }

    async fn upload_file(&self, upload: IdentificationUpload) -> ActionResult<FileRef> {
        let db = self.db()?;
        self.store_file(&db, &upload)
    }
}
