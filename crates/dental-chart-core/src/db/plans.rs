//! Treatment plan database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{now_rfc3339, Database, DbError, DbResult};
use crate::models::{
    HygienistMenu, NewPlan, PeriodontalPhase, PlanPatch, PlanStatus, Priority, StaffType,
    TreatmentPlan,
};
use crate::store::PlanStore;
use crate::teeth::ToothSet;

const PLAN_COLUMNS: &str = r#"
    id, patient_id, treatment_content, staff_type, tooth_number, priority,
    status, completed_at, sort_order, periodontal_phase, hygienist_menu_type,
    is_memo, memo, created_at, updated_at
"#;

impl Database {
    /// Get a plan by ID.
    pub fn get_plan(&self, plan_id: &str) -> DbResult<Option<TreatmentPlan>> {
        let sql = format!("SELECT {} FROM treatment_plans WHERE id = ?", PLAN_COLUMNS);
        self.conn
            .query_row(&sql, [plan_id], PlanRow::from_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    fn write_plan(&self, plan: &TreatmentPlan) -> DbResult<usize> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE treatment_plans SET
                treatment_content = ?2,
                tooth_number = ?3,
                priority = ?4,
                status = ?5,
                completed_at = ?6,
                sort_order = ?7,
                periodontal_phase = ?8,
                hygienist_menu_type = ?9,
                is_memo = ?10,
                memo = ?11,
                updated_at = ?12
            WHERE id = ?1
            "#,
            params![
                plan.id,
                plan.treatment_content,
                plan.teeth.to_field(),
                plan.priority.as_i64(),
                plan.status.as_str(),
                plan.completed_at,
                plan.sort_order,
                plan.periodontal_phase.map(PeriodontalPhase::as_str),
                plan.hygienist_menu_type.map(HygienistMenu::as_str),
                plan.is_memo,
                plan.memo,
                plan.updated_at,
            ],
        )?;
        Ok(rows_affected)
    }
}

impl PlanStore for Database {
    fn list_plans(&self, patient_id: &str) -> DbResult<Vec<TreatmentPlan>> {
        let sql = format!(
            "SELECT {} FROM treatment_plans WHERE patient_id = ? ORDER BY staff_type, sort_order, created_at",
            PLAN_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([patient_id], PlanRow::from_row)?;

        let mut plans = Vec::new();
        for row in rows {
            plans.push(row?.try_into()?);
        }
        Ok(plans)
    }

    fn create_plan(&self, patient_id: &str, plan: NewPlan) -> DbResult<TreatmentPlan> {
        let now = now_rfc3339();
        let plan = plan.into_plan(uuid::Uuid::new_v4().to_string(), patient_id.to_string(), &now);

        self.conn.execute(
            r#"
            INSERT INTO treatment_plans (
                id, patient_id, treatment_content, staff_type, tooth_number, priority,
                status, completed_at, sort_order, periodontal_phase, hygienist_menu_type,
                is_memo, memo, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                plan.id,
                plan.patient_id,
                plan.treatment_content,
                plan.staff_type.as_str(),
                plan.teeth.to_field(),
                plan.priority.as_i64(),
                plan.status.as_str(),
                plan.completed_at,
                plan.sort_order,
                plan.periodontal_phase.map(PeriodontalPhase::as_str),
                plan.hygienist_menu_type.map(HygienistMenu::as_str),
                plan.is_memo,
                plan.memo,
                plan.created_at,
                plan.updated_at,
            ],
        )?;
        Ok(plan)
    }

    fn update_plan(&self, plan_id: &str, patch: &PlanPatch) -> DbResult<()> {
        let mut plan = self
            .get_plan(plan_id)?
            .ok_or_else(|| DbError::NotFound(format!("plan {}", plan_id)))?;
        patch.apply_to(&mut plan);
        plan.updated_at = now_rfc3339();
        self.write_plan(&plan)?;
        Ok(())
    }

    fn delete_plan(&self, plan_id: &str) -> DbResult<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM treatment_plans WHERE id = ?", [plan_id])?;
        if rows_affected == 0 {
            return Err(DbError::NotFound(format!("plan {}", plan_id)));
        }
        Ok(())
    }
}

/// Intermediate row struct for database mapping.
struct PlanRow {
    id: String,
    patient_id: String,
    treatment_content: String,
    staff_type: String,
    tooth_number: String,
    priority: i64,
    status: String,
    completed_at: Option<String>,
    sort_order: i64,
    periodontal_phase: Option<String>,
    hygienist_menu_type: Option<String>,
    is_memo: bool,
    memo: Option<String>,
    created_at: String,
    updated_at: String,
}

impl PlanRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PlanRow {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            treatment_content: row.get(2)?,
            staff_type: row.get(3)?,
            tooth_number: row.get(4)?,
            priority: row.get(5)?,
            status: row.get(6)?,
            completed_at: row.get(7)?,
            sort_order: row.get(8)?,
            periodontal_phase: row.get(9)?,
            hygienist_menu_type: row.get(10)?,
            is_memo: row.get(11)?,
            memo: row.get(12)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }
}

impl TryFrom<PlanRow> for TreatmentPlan {
    type Error = DbError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        let teeth = ToothSet::parse(&row.tooth_number)
            .map_err(|e| DbError::Constraint(format!("Plan {}: {}", row.id, e)))?;
        let staff_type = StaffType::parse(&row.staff_type)
            .ok_or_else(|| DbError::Constraint(format!("Unknown staff type: {}", row.staff_type)))?;
        let priority = Priority::from_i64(row.priority)
            .ok_or_else(|| DbError::Constraint(format!("Unknown priority: {}", row.priority)))?;
        let status = PlanStatus::parse(&row.status)
            .ok_or_else(|| DbError::Constraint(format!("Unknown plan status: {}", row.status)))?;
        let periodontal_phase = row
            .periodontal_phase
            .as_deref()
            .map(|s| {
                PeriodontalPhase::parse(s)
                    .ok_or_else(|| DbError::Constraint(format!("Unknown periodontal phase: {}", s)))
            })
            .transpose()?;
        let hygienist_menu_type = row
            .hygienist_menu_type
            .as_deref()
            .map(|s| {
                HygienistMenu::parse(s)
                    .ok_or_else(|| DbError::Constraint(format!("Unknown hygienist menu: {}", s)))
            })
            .transpose()?;

        Ok(TreatmentPlan {
            id: row.id,
            patient_id: row.patient_id,
            treatment_content: row.treatment_content,
            staff_type,
            teeth,
            priority,
            status,
            completed_at: row.completed_at,
            sort_order: row.sort_order,
            periodontal_phase,
            hygienist_menu_type,
            is_memo: row.is_memo,
            memo: row.memo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
