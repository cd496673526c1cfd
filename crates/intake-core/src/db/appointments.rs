//! Appointment database operations.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Appointment, AppointmentStatus};

const APPOINTMENT_COLUMNS: &str = r#"
    id, user_id, patient_id, patient_name, primary_physician, schedule,
    reason, note, status, cancellation_reason, created_at
"#;

impl Database {
    /// Insert a new appointment.
    pub fn insert_appointment(&self, appointment: &Appointment) -> DbResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO appointments ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                APPOINTMENT_COLUMNS
            ),
            params![
                appointment.id,
                appointment.user_id,
                appointment.patient_id,
                appointment.patient_name,
                appointment.primary_physician,
                format_schedule(&appointment.schedule),
                appointment.reason,
                appointment.note,
                appointment.status.as_str(),
                appointment.cancellation_reason,
                appointment.created_at,
            ],
        )?;
        Ok(())
    }

    /// Update the mutable fields of an appointment.
    pub fn update_appointment(&self, appointment: &Appointment) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE appointments SET
                primary_physician = ?2,
                schedule = ?3,
                status = ?4,
                cancellation_reason = ?5
            WHERE id = ?1
            "#,
            params![
                appointment.id,
                appointment.primary_physician,
                format_schedule(&appointment.schedule),
                appointment.status.as_str(),
                appointment.cancellation_reason,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get an appointment by ID.
    pub fn get_appointment(&self, id: &str) -> DbResult<Option<Appointment>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM appointments WHERE id = ?", APPOINTMENT_COLUMNS),
                [id],
                AppointmentRow::from_row,
            )
            .optional()?
            .map(Appointment::try_from)
            .transpose()
    }

    /// List every appointment, newest first.
    pub fn list_recent_appointments(&self) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM appointments ORDER BY created_at DESC, rowid DESC",
            APPOINTMENT_COLUMNS
        ))?;
        let rows = stmt.query_map([], AppointmentRow::from_row)?;

        let mut appointments = Vec::new();
        for row in rows {
            appointments.push(row?.try_into()?);
        }
        Ok(appointments)
    }
}

fn format_schedule(schedule: &DateTime<Utc>) -> String {
    schedule.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Intermediate row struct for database mapping.
struct AppointmentRow {
    id: String,
    user_id: String,
    patient_id: String,
    patient_name: String,
    primary_physician: String,
    schedule: String,
    reason: String,
    note: Option<String>,
    status: String,
    cancellation_reason: Option<String>,
    created_at: String,
}

impl AppointmentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            patient_id: row.get(2)?,
            patient_name: row.get(3)?,
            primary_physician: row.get(4)?,
            schedule: row.get(5)?,
            reason: row.get(6)?,
            note: row.get(7)?,
            status: row.get(8)?,
            cancellation_reason: row.get(9)?,
            created_at: row.get(10)?,
        })
    }
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = DbError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let schedule = DateTime::parse_from_rfc3339(&row.schedule)
            .map_err(|e| DbError::Constraint(format!("Bad schedule {}: {}", row.schedule, e)))?
            .with_timezone(&Utc);
        let status: AppointmentStatus = row
            .status
            .parse()
            .map_err(|_| DbError::Constraint(format!("Unknown appointment status: {}", row.status)))?;

        Ok(Appointment {
            id: row.id,
            user_id: row.user_id,
            patient_id: row.patient_id,
            patient_name: row.patient_name,
            primary_physician: row.primary_physician,
            schedule,
            reason: row.reason,
            note: row.note,
            status,
            cancellation_reason: row.cancellation_reason,
            created_at: row.created_at,
        })
    }
}
