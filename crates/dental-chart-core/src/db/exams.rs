//! Visual and periodontal exam database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{PerioToothRecord, PeriodontalExam, PeriodontalPhase, ToothObservation, VisualExam};
use crate::store::{PeriodontalExamProvider, VisualExamProvider};

impl Database {
    /// Insert a visual exam. Each tooth may be observed at most once.
    pub fn insert_visual_exam(&self, exam: &VisualExam) -> DbResult<()> {
        if let Some(tooth) = exam.duplicate_tooth() {
            return Err(DbError::Constraint(format!(
                "Tooth {} observed more than once in exam {}",
                tooth, exam.id
            )));
        }
        let observations_json = serde_json::to_string(&exam.observations)?;

        self.conn.execute(
            r#"
            INSERT INTO visual_exams (id, patient_id, examined_on, notes, observations)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                exam.id,
                exam.patient_id,
                exam.examined_on,
                exam.notes,
                observations_json,
            ],
        )?;
        Ok(())
    }

    /// Insert a periodontal exam. The phase must be an exam phase.
    pub fn insert_periodontal_exam(&self, exam: &PeriodontalExam) -> DbResult<()> {
        if !exam.phase.is_exam() {
            return Err(DbError::Constraint(format!(
                "Periodontal exam tagged with non-exam phase {}",
                exam.phase
            )));
        }
        let tooth_data_json = serde_json::to_string(&exam.teeth)?;

        self.conn.execute(
            r#"
            INSERT INTO periodontal_exams (id, patient_id, phase, examined_on, tooth_data)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                exam.id,
                exam.patient_id,
                exam.phase.as_str(),
                exam.examined_on,
                tooth_data_json,
            ],
        )?;
        Ok(())
    }
}

impl VisualExamProvider for Database {
    fn latest_visual_exam(&self, patient_id: &str) -> DbResult<Option<VisualExam>> {
        self.conn
            .query_row(
                r#"
                SELECT id, patient_id, examined_on, notes, observations
                FROM visual_exams
                WHERE patient_id = ?
                ORDER BY examined_on DESC
                LIMIT 1
                "#,
                [patient_id],
                |row| {
                    Ok(VisualExamRow {
                        id: row.get(0)?,
                        patient_id: row.get(1)?,
                        examined_on: row.get(2)?,
                        notes: row.get(3)?,
                        observations: row.get(4)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }
}

impl PeriodontalExamProvider for Database {
    fn periodontal_exams(&self, patient_id: &str) -> DbResult<Vec<PeriodontalExam>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, phase, examined_on, tooth_data
            FROM periodontal_exams
            WHERE patient_id = ?
            ORDER BY examined_on DESC
            "#,
        )?;

        let rows = stmt.query_map([patient_id], |row| {
            Ok(PerioExamRow {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                phase: row.get(2)?,
                examined_on: row.get(3)?,
                tooth_data: row.get(4)?,
            })
        })?;

        let mut exams = Vec::new();
        for row in rows {
            exams.push(row?.try_into()?);
        }
        Ok(exams)
    }
}

/// Intermediate row struct for database mapping.
struct VisualExamRow {
    id: String,
    patient_id: String,
    examined_on: String,
    notes: Option<String>,
    observations: String,
}

impl TryFrom<VisualExamRow> for VisualExam {
    type Error = DbError;

    fn try_from(row: VisualExamRow) -> Result<Self, Self::Error> {
        let observations: Vec<ToothObservation> = serde_json::from_str(&row.observations)?;

        Ok(VisualExam {
            id: row.id,
            patient_id: row.patient_id,
            examined_on: row.examined_on,
            notes: row.notes,
            observations,
        })
    }
}

struct PerioExamRow {
    id: String,
    patient_id: String,
    phase: String,
    examined_on: String,
    tooth_data: String,
}

impl TryFrom<PerioExamRow> for PeriodontalExam {
    type Error = DbError;

    fn try_from(row: PerioExamRow) -> Result<Self, Self::Error> {
        let teeth: Vec<PerioToothRecord> = serde_json::from_str(&row.tooth_data)?;
        let phase = PeriodontalPhase::parse(&row.phase)
            .ok_or_else(|| DbError::Constraint(format!("Unknown periodontal phase: {}", row.phase)))?;

        Ok(PeriodontalExam {
            id: row.id,
            patient_id: row.patient_id,
            phase,
            examined_on: row.examined_on,
            teeth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CariesLevel, ToothStatus};
    use crate::teeth::ToothNumber;

    fn t(n: u32) -> ToothNumber {
        ToothNumber::new(n).unwrap()
    }

    #[test]
    fn test_latest_visual_exam() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.latest_visual_exam("patient-1").unwrap().is_none());

        let mut older = VisualExam::new(
            "patient-1".into(),
            vec![ToothObservation::new(t(36), ToothStatus::Healthy)],
        );
        older.examined_on = "2026-01-10T09:00:00+00:00".into();
        let mut newer = VisualExam::new(
            "patient-1".into(),
            vec![
                ToothObservation::caries(t(14), CariesLevel::C2),
                ToothObservation::new(t(36), ToothStatus::Missing),
            ],
        );
        newer.examined_on = "2026-02-10T09:00:00+00:00".into();

        db.insert_visual_exam(&older).unwrap();
        db.insert_visual_exam(&newer).unwrap();

        let latest = db.latest_visual_exam("patient-1").unwrap().unwrap();
        assert_eq!(latest, newer);
    }

    #[test]
    fn test_duplicate_observation_rejected() {
        let db = Database::open_in_memory().unwrap();
        let exam = VisualExam::new(
            "patient-1".into(),
            vec![
                ToothObservation::caries(t(14), CariesLevel::C1),
                ToothObservation::new(t(14), ToothStatus::Healthy),
            ],
        );
        assert!(matches!(db.insert_visual_exam(&exam), Err(DbError::Constraint(_))));
    }

    #[test]
    fn test_periodontal_exams_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let mut exam2 = PeriodontalExam::new(
            "patient-1".into(),
            PeriodontalPhase::PExam2,
            vec![PerioToothRecord::new(t(16)).with_depths([3, 5, 3, 3, 3, 3])],
        );
        exam2.examined_on = "2026-01-05T09:00:00+00:00".into();
        let mut exam3 = PeriodontalExam::new("patient-1".into(), PeriodontalPhase::PExam3, vec![]);
        exam3.examined_on = "2026-03-05T09:00:00+00:00".into();

        db.insert_periodontal_exam(&exam2).unwrap();
        db.insert_periodontal_exam(&exam3).unwrap();

        let exams = db.periodontal_exams("patient-1").unwrap();
        let phases: Vec<PeriodontalPhase> = exams.iter().map(|e| e.phase).collect();
        assert_eq!(phases, vec![PeriodontalPhase::PExam3, PeriodontalPhase::PExam2]);
        assert_eq!(exams[1].teeth[0].max_depth(), 5);
    }

    #[test]
    fn test_non_exam_phase_rejected() {
        let db = Database::open_in_memory().unwrap();
        let exam = PeriodontalExam::new("patient-1".into(), PeriodontalPhase::Srp, vec![]);
        assert!(matches!(db.insert_periodontal_exam(&exam), Err(DbError::Constraint(_))));
    }
}
