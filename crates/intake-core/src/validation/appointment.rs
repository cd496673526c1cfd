//! Appointment schemas, one per action.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::checker::Checker;
use super::fields::*;
use super::patient::physician;
use super::{RawValues, Schema, ValidationErrors};
use crate::models::AppointmentAction;

/// Whether a schema needs a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
}

/// Declarative field rules for one appointment action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentSchema {
    pub action: AppointmentAction,
    pub primary_physician: Requirement,
    pub schedule: Requirement,
    pub reason: Requirement,
    pub note: Requirement,
    pub cancellation_reason: Requirement,
}

static CREATE_SCHEMA: Lazy<AppointmentSchema> = Lazy::new(|| AppointmentSchema {
    action: AppointmentAction::Create,
    primary_physician: Requirement::Required,
    schedule: Requirement::Required,
    reason: Requirement::Required,
    note: Requirement::Optional,
    cancellation_reason: Requirement::Optional,
});

static SCHEDULE_SCHEMA: Lazy<AppointmentSchema> = Lazy::new(|| AppointmentSchema {
    action: AppointmentAction::Schedule,
    reason: Requirement::Optional,
    ..(*CREATE_SCHEMA).clone()
});

static CANCEL_SCHEMA: Lazy<AppointmentSchema> = Lazy::new(|| AppointmentSchema {
    action: AppointmentAction::Cancel,
    primary_physician: Requirement::Optional,
    schedule: Requirement::Optional,
    reason: Requirement::Optional,
    note: Requirement::Optional,
    cancellation_reason: Requirement::Required,
});

/// Schema for an action. Built once; selection depends on nothing else.
pub fn appointment_schema(action: AppointmentAction) -> &'static AppointmentSchema {
    match action {
        AppointmentAction::Create => &*CREATE_SCHEMA,
        AppointmentAction::Schedule => &*SCHEDULE_SCHEMA,
        AppointmentAction::Cancel => &*CANCEL_SCHEMA,
    }
}

impl AppointmentSchema {
    /// Requirement for a field name, `None` for fields this form never has.
    pub fn requirement(&self, field: &str) -> Option<Requirement> {
        match field {
            PRIMARY_PHYSICIAN => Some(self.primary_physician),
            SCHEDULE => Some(self.schedule),
            REASON => Some(self.reason),
            NOTE => Some(self.note),
            CANCELLATION_REASON => Some(self.cancellation_reason),
            _ => None,
        }
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.requirement(field) == Some(Requirement::Required)
    }
}

/// Physician and slot requested when booking or confirming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentSlot {
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
}

/// A validated appointment form. Each variant carries only what its
/// action needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum AppointmentRequest {
    Create {
        slot: AppointmentSlot,
        reason: String,
        note: Option<String>,
    },
    Schedule {
        slot: AppointmentSlot,
        reason: Option<String>,
        note: Option<String>,
    },
    Cancel {
        cancellation_reason: String,
    },
}

impl AppointmentRequest {
    pub fn action(&self) -> AppointmentAction {
        match self {
            AppointmentRequest::Create { .. } => AppointmentAction::Create,
            AppointmentRequest::Schedule { .. } => AppointmentAction::Schedule,
            AppointmentRequest::Cancel { .. } => AppointmentAction::Cancel,
        }
    }
}

fn slot(check: &mut Checker<'_>) -> AppointmentSlot {
    AppointmentSlot {
        primary_physician: physician(check),
        schedule: check.date_time(SCHEDULE),
    }
}

impl Schema for AppointmentSchema {
    type Output = AppointmentRequest;

    fn validate(&self, values: &RawValues) -> Result<AppointmentRequest, ValidationErrors> {
        let mut check = Checker::new(values);
        let request = match self.action {
            AppointmentAction::Create => AppointmentRequest::Create {
                slot: slot(&mut check),
                reason: check.required_text(REASON, "Reason", 2, 500),
                note: check.optional_text(NOTE, "Note", 500),
            },
            AppointmentAction::Schedule => AppointmentRequest::Schedule {
                slot: slot(&mut check),
                reason: check.optional_text(REASON, "Reason", 500),
                note: check.optional_text(NOTE, "Note", 500),
            },
            AppointmentAction::Cancel => AppointmentRequest::Cancel {
                cancellation_reason: check.required_text(
                    CANCELLATION_REASON,
                    "Cancellation reason",
                    2,
                    500,
                ),
            },
        };
        check.finish(request)
    }
}
