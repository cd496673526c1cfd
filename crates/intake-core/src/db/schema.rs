//! SQLite schema definition.

/// Complete database schema for patient intake.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patient identities (created by the intake form)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patient_identities (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    phone TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Stored files (identification documents)
-- ============================================================================

CREATE TABLE IF NOT EXISTS stored_files (
    id TEXT PRIMARY KEY,
    file_name TEXT NOT NULL,
    content_type TEXT NOT NULL,
    checksum TEXT NOT NULL,                      -- hex SHA-256 of content
    size INTEGER NOT NULL,
    content BLOB NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Patients (created by the registration form)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE REFERENCES patient_identities(id),
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL,
    birth_date TEXT NOT NULL,                    -- YYYY-MM-DD
    gender TEXT NOT NULL CHECK (gender IN ('Male', 'Female', 'Other')),
    address TEXT NOT NULL,
    occupation TEXT NOT NULL,
    emergency_contact_name TEXT NOT NULL,
    emergency_contact_number TEXT NOT NULL,
    primary_physician TEXT NOT NULL,
    insurance_provider TEXT NOT NULL,
    insurance_policy_number TEXT NOT NULL,
    allergies TEXT,
    current_medication TEXT,
    family_medical_history TEXT,
    past_medical_history TEXT,
    identification_type TEXT,
    identification_number TEXT,
    identification_document TEXT,                -- JSON FileRef
    treatment_consent INTEGER NOT NULL,
    disclosure_consent INTEGER NOT NULL,
    privacy_consent INTEGER NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Appointments
-- ============================================================================

CREATE TABLE IF NOT EXISTS appointments (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    patient_name TEXT NOT NULL,
    primary_physician TEXT NOT NULL,
    schedule TEXT NOT NULL,                      -- RFC 3339, UTC
    reason TEXT NOT NULL,
    note TEXT,
    status TEXT NOT NULL CHECK (status IN ('pending', 'scheduled', 'cancelled')),
    cancellation_reason TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_appointments_created_at ON appointments(created_at);
CREATE INDEX IF NOT EXISTS idx_appointments_user_id ON appointments(user_id);
"#;
