//! Appointment form: booking by a patient, scheduling or cancelling by staff.
//!
//! The form runs in one of two modes. Create mode books a pending
//! appointment and moves to the success page. Update mode applies a staff
//! action to an existing appointment and calls the close callback of the
//! overlay it lives in.
//!
//! The persisted status always comes from the action, never from the
//! values the user typed.

use chrono::{DateTime, Utc};

use intake_core::models::{
    Appointment, AppointmentAction, AppointmentStatus, AppointmentUpdate, NewAppointment,
};
use intake_core::validation::fields::{CANCELLATION_REASON, NOTE, PRIMARY_PHYSICIAN, REASON, SCHEDULE};
use intake_core::validation::{appointment_schema, raw_values, AppointmentRequest, FieldValue, RawValues};
use intake_core::ActionError;

use crate::controller::{Form, FormContext, FormCore, SubmitOutcome};
use crate::field::{physician_options, FieldSpec, FieldType, DATE_TIME_FORMAT};
use crate::routes::Route;

/// Staff actions on an existing appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    Schedule,
    Cancel,
}

impl From<UpdateAction> for AppointmentAction {
    fn from(action: UpdateAction) -> Self {
        match action {
            UpdateAction::Schedule => AppointmentAction::Schedule,
            UpdateAction::Cancel => AppointmentAction::Cancel,
        }
    }
}

enum Mode {
    Create {
        user_id: String,
        patient_id: String,
    },
    Update {
        appointment_id: String,
        on_close: Box<dyn Fn()>,
    },
}

/// Initial values for the form. Pure in its inputs: an existing
/// appointment supplies every field, otherwise the schedule is `now`.
pub fn appointment_defaults(appointment: Option<&Appointment>, now: DateTime<Utc>) -> RawValues {
    let mut values = raw_values([
        (
            PRIMARY_PHYSICIAN,
            appointment.map(|a| a.primary_physician.clone()).unwrap_or_default(),
        ),
        (REASON, appointment.map(|a| a.reason.clone()).unwrap_or_default()),
        (
            NOTE,
            appointment.and_then(|a| a.note.clone()).unwrap_or_default(),
        ),
        (
            CANCELLATION_REASON,
            appointment
                .and_then(|a| a.cancellation_reason.clone())
                .unwrap_or_default(),
        ),
    ]);
    values.insert(
        SCHEDULE.into(),
        FieldValue::DateTime(appointment.map_or(now, |a| a.schedule)),
    );
    values
}

pub struct AppointmentForm {
    core: FormCore,
    context: FormContext,
    action: AppointmentAction,
    mode: Mode,
}

impl AppointmentForm {
    /// Booking form for a registered patient.
    pub fn create(
        user_id: impl Into<String>,
        patient_id: impl Into<String>,
        now: DateTime<Utc>,
        context: FormContext,
    ) -> Self {
        Self {
            core: FormCore::new(appointment_defaults(None, now), context.submit_timeout),
            context,
            action: AppointmentAction::Create,
            mode: Mode::Create {
                user_id: user_id.into(),
                patient_id: patient_id.into(),
            },
        }
    }

    /// Staff form for an existing appointment. `on_close` runs after a
    /// successful update.
    pub fn update(
        action: UpdateAction,
        appointment: &Appointment,
        on_close: impl Fn() + 'static,
        context: FormContext,
    ) -> Self {
        Self {
            core: FormCore::new(
                appointment_defaults(Some(appointment), appointment.schedule),
                context.submit_timeout,
            ),
            context,
            action: action.into(),
            mode: Mode::Update {
                appointment_id: appointment.id.clone(),
                on_close: Box::new(on_close),
            },
        }
    }

    pub fn action(&self) -> AppointmentAction {
        self.action
    }

    /// Heading shown above the form; only the booking form has one.
    pub fn title(&self) -> Option<&'static str> {
        match self.action {
            AppointmentAction::Create => Some("Nouveau rendez-vous"),
            _ => None,
        }
    }

    /// Whether the submit button is styled as destructive.
    pub fn is_destructive(&self) -> bool {
        self.action == AppointmentAction::Cancel
    }

    /// Validate against the action's schema and persist.
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(in_flight) = self.core.begin() else {
            return SubmitOutcome::Ignored;
        };

        let request = match self.core.validate(appointment_schema(self.action)) {
            Ok(request) => request,
            Err(errors) => return SubmitOutcome::Invalid(errors),
        };
        let status = self.action.status();

        let outcome = match &self.mode {
            Mode::Create { user_id, patient_id } => {
                self.submit_create(request, status, user_id, patient_id).await
            }
            Mode::Update { appointment_id, on_close } => {
                self.submit_update(request, status, appointment_id, on_close.as_ref())
                    .await
            }
        };
        if outcome.is_success() {
            in_flight.succeed();
        }
        outcome
    }

    async fn submit_create(
        &self,
        request: AppointmentRequest,
        status: AppointmentStatus,
        user_id: &str,
        patient_id: &str,
    ) -> SubmitOutcome {
        let (slot, reason, note) = match request {
            AppointmentRequest::Create { slot, reason, note } => (slot, reason, note),
            other => {
                let error = ActionError::Rejected(format!("cannot book with a {} request", other.action()));
                return self.core.failed("Appointment", error.into());
            }
        };

        let appointment = NewAppointment {
            user_id: user_id.to_string(),
            patient_id: patient_id.to_string(),
            primary_physician: slot.primary_physician,
            schedule: slot.schedule,
            reason,
            note,
            status,
        };

        match self
            .core
            .call(self.context.actions.create_appointment(appointment))
            .await
        {
            Ok(created) => {
                log::info!("Booked appointment {}", created.id);
                self.core.reset();
                let route = Route::AppointmentSuccess {
                    user_id: user_id.to_string(),
                    appointment_id: created.id,
                };
                self.context.navigator.push(route.clone());
                SubmitOutcome::Navigated(route)
            }
            Err(e) => self.core.failed("Appointment", e),
        }
    }

    async fn submit_update(
        &self,
        request: AppointmentRequest,
        status: AppointmentStatus,
        appointment_id: &str,
        on_close: &dyn Fn(),
    ) -> SubmitOutcome {
        let update = match request {
            AppointmentRequest::Cancel { cancellation_reason } => AppointmentUpdate {
                primary_physician: None,
                schedule: None,
                status,
                cancellation_reason: Some(cancellation_reason),
            },
            AppointmentRequest::Create { slot, .. } | AppointmentRequest::Schedule { slot, .. } => {
                AppointmentUpdate {
                    primary_physician: Some(slot.primary_physician),
                    schedule: Some(slot.schedule),
                    status,
                    cancellation_reason: self.edited_cancellation_reason(),
                }
            }
        };

        match self
            .core
            .call(
                self.context
                    .actions
                    .update_appointment(appointment_id, update, self.action),
            )
            .await
        {
            Ok(updated) => {
                log::info!("Appointment {} updated to {}", updated.id, updated.status);
                on_close();
                self.core.reset();
                SubmitOutcome::Closed
            }
            Err(e) => self.core.failed("Appointment", e),
        }
    }

    /// The cancellation reason, only if the user changed it.
    fn edited_cancellation_reason(&self) -> Option<String> {
        let values = self.core.values();
        if !values.is_dirty(CANCELLATION_REASON) {
            return None;
        }
        values
            .get(CANCELLATION_REASON)
            .as_text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

impl Form for AppointmentForm {
    fn core(&self) -> &FormCore {
        &self.core
    }

    fn fields(&self) -> Vec<FieldSpec> {
        if self.action == AppointmentAction::Cancel {
            return vec![FieldSpec::new(FieldType::Textarea, CANCELLATION_REASON)
                .label("Raison de l'annulation")
                .placeholder("Entrer la raison pour l'annulation")];
        }

        vec![
            FieldSpec::new(FieldType::Select, PRIMARY_PHYSICIAN)
                .label("Doctor")
                .placeholder("Select a doctor")
                .options(physician_options()),
            FieldSpec::new(FieldType::DatePicker, SCHEDULE)
                .label("Expected appointment date")
                .date_format(DATE_TIME_FORMAT)
                .time_select(),
            FieldSpec::new(FieldType::Textarea, REASON)
                .label("La raison du RDV")
                .placeholder("Entrer la raison du RDV"),
            FieldSpec::new(FieldType::Textarea, NOTE)
                .label("Notes")
                .placeholder("Entrer les notes"),
        ]
    }

    fn submit_label(&self) -> &'static str {
        match self.action {
            AppointmentAction::Create => "Creer un RDV",
            AppointmentAction::Schedule => "Programmer un RDV",
            AppointmentAction::Cancel => "Annuler le RDV",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::History;
    use chrono::TimeZone;
    use intake_core::{IntakeCore, PersistenceActions};
    use std::rc::Rc;

    fn context() -> FormContext {
        let actions: Rc<dyn PersistenceActions> = Rc::new(IntakeCore::open_in_memory().unwrap());
        FormContext::new(actions, Rc::new(History::new()))
    }

    fn existing() -> Appointment {
        Appointment {
            id: "appt-1".into(),
            user_id: "user-1".into(),
            patient_id: "patient-1".into(),
            patient_name: "Jean Dupont".into(),
            primary_physician: "Jane Powell".into(),
            schedule: Utc.with_ymd_and_hms(2030, 1, 15, 9, 30, 0).unwrap(),
            reason: "checkup".into(),
            note: Some("morning".into()),
            status: AppointmentStatus::Pending,
            cancellation_reason: None,
            created_at: "2030-01-01T00:00:00.000000Z".into(),
        }
    }

    #[test]
    fn test_defaults_are_pure() {
        let now = Utc.with_ymd_and_hms(2030, 2, 1, 8, 0, 0).unwrap();
        assert_eq!(appointment_defaults(None, now), appointment_defaults(None, now));
        assert_eq!(appointment_defaults(None, now)[SCHEDULE], FieldValue::DateTime(now));

        let appointment = existing();
        let defaults = appointment_defaults(Some(&appointment), now);
        assert_eq!(defaults[SCHEDULE], FieldValue::DateTime(appointment.schedule));
        assert_eq!(defaults[NOTE].as_text(), Some("morning"));
        assert_eq!(defaults[CANCELLATION_REASON].as_text(), Some(""));
    }

    #[test]
    fn test_labels_and_fields_follow_action() {
        let now = Utc::now();
        let create = AppointmentForm::create("user-1", "patient-1", now, context());
        assert_eq!(create.submit_label(), "Creer un RDV");
        assert_eq!(create.title(), Some("Nouveau rendez-vous"));
        assert_eq!(create.fields().len(), 4);

        let schedule = AppointmentForm::update(UpdateAction::Schedule, &existing(), || {}, context());
        assert_eq!(schedule.submit_label(), "Programmer un RDV");
        assert!(!schedule.is_destructive());

        let cancel = AppointmentForm::update(UpdateAction::Cancel, &existing(), || {}, context());
        assert_eq!(cancel.submit_label(), "Annuler le RDV");
        assert!(cancel.is_destructive());
        let names: Vec<_> = cancel.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec![CANCELLATION_REASON]);
    }

    #[test]
    fn test_physician_search() {
        let form = AppointmentForm::create("user-1", "patient-1", Utc::now(), context());
        let found: Vec<_> = form
            .search_options(PRIMARY_PHYSICIAN, "powel")
            .into_iter()
            .map(|o| o.label)
            .collect();
        assert_eq!(found, vec!["Jane Powell".to_string()]);

        assert!(form.search_options(REASON, "powel").is_empty());
        assert!(form.search_options("missing", "powel").is_empty());
    }

    #[test]
    fn test_cancellation_reason_only_when_edited() {
        let form = AppointmentForm::update(UpdateAction::Schedule, &existing(), || {}, context());
        assert_eq!(form.edited_cancellation_reason(), None);

        form.set(CANCELLATION_REASON, "moved to next week");
        assert_eq!(form.edited_cancellation_reason().as_deref(), Some("moved to next week"));
    }
}
