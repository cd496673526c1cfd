//! Appointment models and the action/status lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Appointment status. Always set from an [`AppointmentAction`], never inferred.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    /// Requested by the patient, awaiting staff
    Pending,
    /// Confirmed by staff
    Scheduled,
    /// Cancelled by staff
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(UnknownTag(other.to_string())),
        }
    }
}

/// Action applied through the appointment form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentAction {
    Create,
    Schedule,
    Cancel,
}

impl AppointmentAction {
    pub const ALL: [AppointmentAction; 3] = [
        AppointmentAction::Create,
        AppointmentAction::Schedule,
        AppointmentAction::Cancel,
    ];

    /// Status an appointment takes when this action is applied.
    pub fn status(self) -> AppointmentStatus {
        match self {
            AppointmentAction::Create => AppointmentStatus::Pending,
            AppointmentAction::Schedule => AppointmentStatus::Scheduled,
            AppointmentAction::Cancel => AppointmentStatus::Cancelled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentAction::Create => "create",
            AppointmentAction::Schedule => "schedule",
            AppointmentAction::Cancel => "cancel",
        }
    }
}

impl fmt::Display for AppointmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action or status tag outside the known set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown tag: {0}")]
pub struct UnknownTag(pub String);

impl FromStr for AppointmentAction {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(AppointmentAction::Create),
            "schedule" => Ok(AppointmentAction::Schedule),
            "cancel" => Ok(AppointmentAction::Cancel),
            other => Err(UnknownTag(other.to_string())),
        }
    }
}

/// A stored appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    /// Identity ID of the patient
    pub user_id: String,
    /// Patient record ID
    pub patient_id: String,
    /// Patient name, kept for list display
    pub patient_name: String,
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    pub reason: String,
    pub note: Option<String>,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
    pub created_at: String,
}

/// Payload for a new appointment request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAppointment {
    pub user_id: String,
    pub patient_id: String,
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    pub reason: String,
    pub note: Option<String>,
    pub status: AppointmentStatus,
}

/// Partial update applied by staff. `None` leaves a field untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentUpdate {
    pub primary_physician: Option<String>,
    pub schedule: Option<DateTime<Utc>>,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
}

impl Appointment {
    /// Build a stored appointment from a request.
    pub fn from_request(request: NewAppointment, patient_name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: request.user_id,
            patient_id: request.patient_id,
            patient_name,
            primary_physician: request.primary_physician,
            schedule: request.schedule,
            reason: request.reason,
            note: request.note,
            status: request.status,
            cancellation_reason: None,
            created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
        }
    }

    /// Apply a staff update in place.
    pub fn apply(&mut self, update: AppointmentUpdate) {
        if let Some(physician) = update.primary_physician {
            self.primary_physician = physician;
        }
        if let Some(schedule) = update.schedule {
            self.schedule = schedule;
        }
        if let Some(reason) = update.cancellation_reason {
            self.cancellation_reason = Some(reason);
        }
        self.status = update.status;
    }
}

/// Per-status appointment counts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentCounts {
    pub scheduled: usize,
    pub pending: usize,
    pub cancelled: usize,
}

impl AppointmentCounts {
    /// Count appointments by status.
    pub fn tally<'a>(appointments: impl IntoIterator<Item = &'a Appointment>) -> Self {
        appointments
            .into_iter()
            .fold(Self::default(), |mut counts, appointment| {
                match appointment.status {
                    AppointmentStatus::Scheduled => counts.scheduled += 1,
                    AppointmentStatus::Pending => counts.pending += 1,
                    AppointmentStatus::Cancelled => counts.cancelled += 1,
                }
                counts
            })
    }
}

/// Aggregate view backing the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentAppointments {
    pub counts: AppointmentCounts,
    pub total: usize,
    /// Newest first
    pub documents: Vec<Appointment>,
}

impl RecentAppointments {
    pub fn from_documents(documents: Vec<Appointment>) -> Self {
        Self {
            counts: AppointmentCounts::tally(&documents),
            total: documents.len(),
            documents,
        }
    }
}
