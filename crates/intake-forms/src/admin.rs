//! Admin dashboard: status counts, the appointment table and the
//! schedule/cancel overlays.

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;

use intake_core::models::{find_physician, Appointment, AppointmentStatus, RecentAppointments};
use intake_core::notify::format_date_time;
use intake_core::ActionResult;

use crate::appointment_form::{AppointmentForm, UpdateAction};
use crate::controller::FormContext;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Scheduled,
    Pending,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatCard {
    pub kind: StatKind,
    pub count: usize,
    pub label: &'static str,
    pub icon: &'static str,
}

/// One line of the appointment table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AppointmentRow {
    /// 1-based position in the table
    pub index: usize,
    pub appointment_id: String,
    pub patient: String,
    pub status: AppointmentStatus,
    pub schedule: String,
    pub physician: String,
    pub physician_image: Option<&'static str>,
}

impl AppointmentRow {
    fn new(index: usize, appointment: &Appointment) -> Self {
        Self {
            index: index + 1,
            appointment_id: appointment.id.clone(),
            patient: appointment.patient_name.clone(),
            status: appointment.status,
            schedule: format_date_time(appointment),
            physician: appointment.primary_physician.clone(),
            physician_image: find_physician(&appointment.primary_physician).map(|p| p.image),
        }
    }
}

/// Dashboard state for one page load.
#[derive(Debug, Clone)]
pub struct AdminDashboard {
    recent: RecentAppointments,
}

impl AdminDashboard {
    pub const TITLE: &'static str = "Bienvenu";

    /// Fetch the aggregate view. Nothing is cached between loads.
    pub async fn load(context: &FormContext) -> ActionResult<Self> {
        let recent = context.actions.list_recent_appointments().await?;
        log::debug!(
            "Admin dashboard loaded {} appointments ({} pending)",
            recent.total,
            recent.counts.pending
        );
        Ok(Self { recent })
    }

    pub fn recent(&self) -> &RecentAppointments {
        &self.recent
    }

    pub fn stat_cards(&self) -> [StatCard; 3] {
        let counts = &self.recent.counts;
        [
            StatCard {
                kind: StatKind::Scheduled,
                count: counts.scheduled,
                label: "Scheduled des RDV",
                icon: "/assets/icons/appointments.svg",
            },
            StatCard {
                kind: StatKind::Pending,
                count: counts.pending,
                label: "Pending des RDV",
                icon: "/assets/icons/pending.svg",
            },
            StatCard {
                kind: StatKind::Cancelled,
                count: counts.cancelled,
                label: "Cancelled des RDV",
                icon: "/assets/icons/cancelled.svg",
            },
        ]
    }

    pub fn rows(&self) -> Vec<AppointmentRow> {
        self.recent
            .documents
            .iter()
            .enumerate()
            .map(|(i, appointment)| AppointmentRow::new(i, appointment))
            .collect()
    }

    pub fn appointment(&self, appointment_id: &str) -> Option<&Appointment> {
        self.recent.documents.iter().find(|a| a.id == appointment_id)
    }

    /// Open the overlay for a row, `None` if the id is not on the table.
    pub fn open_modal(
        &self,
        action: UpdateAction,
        appointment_id: &str,
        context: FormContext,
    ) -> Option<AppointmentModal> {
        self.appointment(appointment_id)
            .map(|appointment| AppointmentModal::open(action, appointment, context))
    }
}

/// Overlay wrapping an update-mode appointment form. A successful submit
/// closes it.
pub struct AppointmentModal {
    action: UpdateAction,
    open: Rc<Cell<bool>>,
    form: AppointmentForm,
}

impl AppointmentModal {
    pub fn open(action: UpdateAction, appointment: &Appointment, context: FormContext) -> Self {
        let open = Rc::new(Cell::new(true));
        let flag = Rc::clone(&open);
        let form = AppointmentForm::update(action, appointment, move || flag.set(false), context);
        Self { action, open, form }
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn close(&self) {
        self.open.set(false);
    }

    pub fn form(&self) -> &AppointmentForm {
        &self.form
    }

    /// Trigger label on the table row.
    pub fn trigger_label(&self) -> &'static str {
        match self.action {
            UpdateAction::Schedule => "Schedule",
            UpdateAction::Cancel => "Cancel",
        }
    }

    pub fn title(&self) -> &'static str {
        match self.action {
            UpdateAction::Schedule => "Schedule Appointment",
            UpdateAction::Cancel => "Cancel Appointment",
        }
    }

    pub fn description(&self) -> &'static str {
        match self.action {
            UpdateAction::Schedule => "Please confirm the following details to schedule.",
            UpdateAction::Cancel => "Are you sure you want to cancel your appointment?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::History;
    use chrono::{TimeZone, Utc};
    use intake_core::models::AppointmentCounts;
    use intake_core::{IntakeCore, PersistenceActions};

    fn appointment(id: &str, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: id.into(),
            user_id: "user-1".into(),
            patient_id: "patient-1".into(),
            patient_name: "Jean Dupont".into(),
            primary_physician: "Jane Powell".into(),
            schedule: Utc.with_ymd_and_hms(2030, 1, 15, 9, 30, 0).unwrap(),
            reason: "checkup".into(),
            note: None,
            status,
            cancellation_reason: None,
            created_at: "2030-01-01T00:00:00.000000Z".into(),
        }
    }

    fn dashboard() -> AdminDashboard {
        AdminDashboard {
            recent: RecentAppointments::from_documents(vec![
                appointment("a-2", AppointmentStatus::Scheduled),
                appointment("a-1", AppointmentStatus::Pending),
            ]),
        }
    }

    fn context() -> FormContext {
        let actions: Rc<dyn PersistenceActions> = Rc::new(IntakeCore::open_in_memory().unwrap());
        FormContext::new(actions, Rc::new(History::new()))
    }

    #[test]
    fn test_stat_cards() {
        let cards = dashboard().stat_cards();
        let counts: Vec<_> = cards.iter().map(|c| (c.kind, c.count)).collect();
        assert_eq!(
            counts,
            vec![(StatKind::Scheduled, 1), (StatKind::Pending, 1), (StatKind::Cancelled, 0)]
        );
        assert_eq!(dashboard().recent().counts, AppointmentCounts { scheduled: 1, pending: 1, cancelled: 0 });
    }

    #[test]
    fn test_rows() {
        let rows = dashboard().rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].appointment_id, "a-2");
        assert_eq!(rows[0].schedule, "Jan 15, 2030 9:30 AM");
        assert_eq!(rows[0].physician_image, Some("/assets/images/dr-powell.png"));
    }

    #[test]
    fn test_modal_open_and_close() {
        let board = dashboard();
        assert!(board.open_modal(UpdateAction::Cancel, "missing", context()).is_none());

        let modal = board.open_modal(UpdateAction::Cancel, "a-1", context()).unwrap();
        assert!(modal.is_open());
        assert_eq!(modal.title(), "Cancel Appointment");
        modal.close();
        assert!(!modal.is_open());
    }
}
