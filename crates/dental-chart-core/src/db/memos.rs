//! Treatment memo database operations.

use rusqlite::{params, OptionalExtension};

use super::{now_rfc3339, Database, DbResult};
use crate::store::TreatmentMemoStore;

impl TreatmentMemoStore for Database {
    fn treatment_memo(&self, patient_id: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT memo FROM treatment_memos WHERE patient_id = ?",
                [patient_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn set_treatment_memo(&self, patient_id: &str, memo: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO treatment_memos (patient_id, memo, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(patient_id) DO UPDATE SET
                memo = excluded.memo,
                updated_at = excluded.updated_at
            "#,
            params![patient_id, memo, now_rfc3339()],
        )?;
        Ok(())
    }
}
