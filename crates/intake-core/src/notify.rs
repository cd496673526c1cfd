//! Best-effort patient notifications after staff actions.

use thiserror::Error;

use crate::models::{Appointment, AppointmentAction};

#[derive(Error, Debug)]
#[error("Notification failed: {0}")]
pub struct NotifyError(pub String);

/// Delivers a message to a patient. Delivery is never guaranteed.
pub trait Notifier: Send + Sync {
    fn notify(&self, user_id: &str, message: &str) -> Result<(), NotifyError>;
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, user_id: &str, message: &str) -> Result<(), NotifyError> {
        log::info!("Notification for {}: {}", user_id, message);
        Ok(())
    }
}

/// Human-readable date and time, e.g. `Jan 15, 2030 9:30 AM`.
pub fn format_date_time(appointment: &Appointment) -> String {
    appointment.schedule.format("%b %-d, %Y %-I:%M %p").to_string()
}

/// Message sent after an action, `None` when the action notifies nobody.
pub fn notification_message(
    clinic_name: &str,
    action: AppointmentAction,
    appointment: &Appointment,
) -> Option<String> {
    let body = match action {
        AppointmentAction::Create => return None,
        AppointmentAction::Schedule => format!(
            "Your appointment is confirmed for {} with Dr. {}",
            format_date_time(appointment),
            appointment.primary_physician
        ),
        AppointmentAction::Cancel => format!(
            "We regret to inform that your appointment for {} is cancelled. Reason: {}",
            format_date_time(appointment),
            appointment.cancellation_reason.as_deref().unwrap_or("not given")
        ),
    };
    Some(format!("Greetings from {}. {}.", clinic_name, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentStatus, NewAppointment};
    use chrono::{TimeZone, Utc};

    fn make_appointment() -> Appointment {
        Appointment::from_request(
            NewAppointment {
                user_id: "user-1".into(),
                patient_id: "patient-1".into(),
                primary_physician: "Jane Powell".into(),
                schedule: Utc.with_ymd_and_hms(2030, 1, 15, 9, 30, 0).unwrap(),
                reason: "checkup".into(),
                note: None,
                status: AppointmentStatus::Pending,
            },
            "Jean".into(),
        )
    }

    #[test]
    fn test_format_date_time() {
        assert_eq!(format_date_time(&make_appointment()), "Jan 15, 2030 9:30 AM");
    }

    #[test]
    fn test_schedule_message() {
        let message =
            notification_message("IvoireSante", AppointmentAction::Schedule, &make_appointment())
                .unwrap();
        assert_eq!(
            message,
            "Greetings from IvoireSante. Your appointment is confirmed for Jan 15, 2030 9:30 AM with Dr. Jane Powell."
        );
    }

    #[test]
    fn test_cancel_message_includes_reason() {
        let mut appointment = make_appointment();
        appointment.cancellation_reason = Some("doctor unavailable".into());
        let message =
            notification_message("IvoireSante", AppointmentAction::Cancel, &appointment).unwrap();
        assert!(message.ends_with("Reason: doctor unavailable."));
    }

    #[test]
    fn test_create_sends_nothing() {
        assert!(
            notification_message("IvoireSante", AppointmentAction::Create, &make_appointment())
                .is_none()
        );
    }
}
