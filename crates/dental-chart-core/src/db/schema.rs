//! SQLite schema definition.

/// Complete database schema for the dental chart store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Treatment Plans
-- ============================================================================

CREATE TABLE IF NOT EXISTS treatment_plans (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    treatment_content TEXT NOT NULL,
    staff_type TEXT NOT NULL CHECK (staff_type IN ('doctor', 'hygienist')),
    tooth_number TEXT NOT NULL DEFAULT '',        -- comma-joined FDI numbers, e.g. "14, 15"
    priority INTEGER NOT NULL DEFAULT 2 CHECK (priority IN (1, 2, 3)),
    status TEXT NOT NULL DEFAULT 'planned' CHECK (status IN ('planned', 'completed')),
    completed_at TEXT,
    sort_order INTEGER NOT NULL DEFAULT 0,        -- unique per (patient, staff_type) by convention
    periodontal_phase TEXT,                       -- NULL for free-standing plans
    hygienist_menu_type TEXT,
    is_memo INTEGER NOT NULL DEFAULT 0,
    memo TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_plans_patient_order
    ON treatment_plans(patient_id, staff_type, sort_order);
CREATE INDEX IF NOT EXISTS idx_plans_phase ON treatment_plans(patient_id, periodontal_phase);

-- ============================================================================
-- Treatment Memo (one free-text memo per patient)
-- ============================================================================

CREATE TABLE IF NOT EXISTS treatment_memos (
    patient_id TEXT PRIMARY KEY,
    memo TEXT NOT NULL DEFAULT '',
    updated_at TEXT NOT NULL
);

-- ============================================================================
-- Exams (read-only inputs to plan generation)
-- ============================================================================

CREATE TABLE IF NOT EXISTS visual_exams (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    examined_on TEXT NOT NULL,
    notes TEXT,
    observations TEXT NOT NULL DEFAULT '[]'       -- JSON array of ToothObservation
);

CREATE INDEX IF NOT EXISTS idx_visual_exams_patient ON visual_exams(patient_id, examined_on);

CREATE TABLE IF NOT EXISTS periodontal_exams (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    phase TEXT NOT NULL,                          -- P_EXAM_1 .. P_EXAM_5
    examined_on TEXT NOT NULL,
    tooth_data TEXT NOT NULL DEFAULT '[]'         -- JSON array of PerioToothRecord
);

CREATE INDEX IF NOT EXISTS idx_perio_exams_patient ON periodontal_exams(patient_id, examined_on);
"#;
