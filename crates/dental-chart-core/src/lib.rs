//! Dental Chart Core Library
//!
//! Treatment-plan engine for a dental charting app: FDI tooth registry, plan
//! splitting, the periodontal treatment flow and exam-driven plan generation.
//!
//! # Architecture
//!
//! ```text
//!   Visual exam        Periodontal exam
//!        │                    │
//!        └────────┬───────────┘
//!                 ▼
//!          Auto-generation ──→ Proposals ──→ Clinician review
//!                                                   │
//!                          ┌────────────────────────┤
//!                          ▼                        ▼
//!                  Treatment plans            Treatment memo
//!                  (doctor / hygienist         (restoration
//!                   columns, sort_order)        choices)
//!                          │
//!          ┌───────────────┼────────────────┐
//!          ▼               ▼                ▼
//!        Split      Periodontal flow     Reorder
//!                  (branch select,
//!                   phase toggle)
//! ```
//!
//! # Core Principle
//!
//! **Every multi-step change is computed before it is written.** Engines turn
//! the current plan list into a list of store mutations; only then are the
//! mutations issued, one store call each.
//!
//! # Modules
//!
//! - [`teeth`]: FDI tooth numbers, tooth-sets and display notation
//! - [`models`]: Domain types (TreatmentPlan, PeriodontalPhase, exams, proposals)
//! - [`db`]: SQLite-backed store
//! - [`store`]: Store traits, mutation batches and sort-order maintenance
//! - [`split`]: Binary plan splitting
//! - [`flow`]: Periodontal flow state, branch selection, phase toggle, tooth picker
//! - [`generator`]: Proposals from exams and the review session
//! - [`config`]: Engine configuration (TOML)
//! - [`logging`]: Tracing subscriber setup

pub mod config;
pub mod db;
pub mod error;
pub mod flow;
pub mod generator;
pub mod logging;
pub mod models;
pub mod split;
pub mod store;
pub mod teeth;

// Re-export commonly used types
pub use config::{ConfigError, EngineConfig, PeriodontalThresholds};
pub use db::Database;
pub use error::{PlanError, PlanResult};
pub use flow::{FlowState, PhaseToggle, PhaseTransition, ToothPicker, ToothSelection};
pub use generator::{ReviewSession, generate_from_periodontal, generate_from_visual};
pub use models::{
    NewPlan, PeriodontalPhase, PlanPatch, PlanStatus, Priority, Proposal, StaffType,
    TreatmentPlan,
};
pub use split::{plan_split, split_plan};
pub use store::{PlanMutation, PlanStore, TreatmentMemoStore};
pub use teeth::{ToothNumber, ToothSet};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum DentalChartError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Batch failed after {completed} of {attempted} changes: {message}")]
    PartialBatchFailure {
        completed: u32,
        attempted: u32,
        message: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for DentalChartError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => DentalChartError::NotFound(what),
            other => DentalChartError::DatabaseError(other.to_string()),
        }
    }
}

impl From<PlanError> for DentalChartError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::InvalidSplit(m) => DentalChartError::InvalidSplit(m),
            PlanError::InvalidState(m) => DentalChartError::InvalidState(m),
            PlanError::NotFound(m) => DentalChartError::NotFound(m),
            PlanError::PartialBatchFailure {
                completed,
                attempted,
                source,
            } => DentalChartError::PartialBatchFailure {
                completed: completed as u32,
                attempted: attempted as u32,
                message: source.to_string(),
            },
            PlanError::Store(e) => e.into(),
            other => DentalChartError::InvalidInput(other.to_string()),
        }
    }
}

impl From<teeth::ToothError> for DentalChartError {
    fn from(e: teeth::ToothError) -> Self {
        DentalChartError::InvalidInput(e.to_string())
    }
}

impl From<serde_json::Error> for DentalChartError {
    fn from(e: serde_json::Error) -> Self {
        DentalChartError::SerializationError(e.to_string())
    }
}

impl From<ConfigError> for DentalChartError {
    fn from(e: ConfigError) -> Self {
        DentalChartError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for DentalChartError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        DentalChartError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path, optionally with a config file.
///
/// Installs the log subscriber with the configured filter unless one is
/// already installed.
#[uniffi::export]
pub fn open_database(
    path: String,
    config_path: Option<String>,
) -> Result<Arc<DentalChartCore>, DentalChartError> {
    let config = match config_path {
        Some(config_path) => EngineConfig::load(config_path)?,
        None => EngineConfig::default(),
    };
    logging::init_logging(&config.logging.filter);
    let db = Database::open(&path)?;
    Ok(Arc::new(DentalChartCore::new(db, config)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<DentalChartCore>, DentalChartError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(DentalChartCore::new(db, EngineConfig::default())))
}

/// Install the log subscriber. Returns false if one was already installed.
#[uniffi::export]
pub fn init_logging(filter: String) -> bool {
    logging::init_logging(&filter)
}

/// Quadrant-aware display notation for a tooth list.
#[uniffi::export]
pub fn display_notation(tooth_numbers: Vec<u32>) -> Result<String, DentalChartError> {
    Ok(teeth::set_display_notation(&parse_teeth(&tooth_numbers)?))
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn parse_teeth(teeth: &[u32]) -> Result<ToothSet, DentalChartError> {
    Ok(ToothSet::from_raw(teeth.iter().copied())?)
}

fn parse_staff(staff_type: &str) -> Result<StaffType, DentalChartError> {
    StaffType::parse(staff_type)
        .ok_or_else(|| DentalChartError::InvalidInput(format!("unknown staff type: {}", staff_type)))
}

fn parse_phase(phase: &str) -> Result<PeriodontalPhase, DentalChartError> {
    PeriodontalPhase::parse(phase)
        .ok_or_else(|| DentalChartError::InvalidInput(format!("unknown periodontal phase: {}", phase)))
}

fn parse_priority(priority: i64) -> Result<Priority, DentalChartError> {
    Priority::from_i64(priority)
        .ok_or_else(|| DentalChartError::InvalidInput(format!("priority out of range: {}", priority)))
}

fn parse_menu(menu: &str) -> Result<models::HygienistMenu, DentalChartError> {
    models::HygienistMenu::parse(menu)
        .ok_or_else(|| DentalChartError::InvalidInput(format!("unknown hygienist menu: {}", menu)))
}

fn parse_dentition(dentition: &str) -> Result<teeth::Dentition, DentalChartError> {
    match dentition {
        "permanent" => Ok(teeth::Dentition::Permanent),
        "deciduous" => Ok(teeth::Dentition::Deciduous),
        other => Err(DentalChartError::InvalidInput(format!("unknown dentition: {}", other))),
    }
}

/// Empty string clears a nullable field.
fn parse_nullable<T>(
    value: Option<String>,
    parse: impl Fn(&str) -> Result<T, DentalChartError>,
) -> Result<Option<Option<T>>, DentalChartError> {
    value
        .map(|v| if v.is_empty() { Ok(None) } else { parse(&v).map(Some) })
        .transpose()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI, holding at most one open review.
#[derive(uniffi::Object)]
pub struct DentalChartCore {
    db: Arc<Mutex<Database>>,
    review: Mutex<Option<ReviewSession>>,
    config: EngineConfig,
}

impl DentalChartCore {
    fn new(db: Database, config: EngineConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            review: Mutex::new(None),
            config,
        }
    }

    fn with_review<T>(
        &self,
        f: impl FnOnce(&mut ReviewSession) -> PlanResult<T>,
    ) -> Result<T, DentalChartError> {
        let mut review = self.review.lock()?;
        let session = review
            .as_mut()
            .ok_or_else(|| DentalChartError::InvalidState("no review in progress".into()))?;
        Ok(f(session)?)
    }

    fn start_review(
        &self,
        patient_id: String,
        proposals: Vec<Proposal>,
    ) -> Result<Vec<FfiProposal>, DentalChartError> {
        let session = ReviewSession::new(patient_id, proposals);
        let listed = ffi_proposals(&session);
        *self.review.lock()? = Some(session);
        Ok(listed)
    }
}

#[uniffi::export]
impl DentalChartCore {
    // =========================================================================
    // Plan Operations
    // =========================================================================

    /// All plans of a patient, by staff column then sort order.
    pub fn list_plans(&self, patient_id: String) -> Result<Vec<FfiTreatmentPlan>, DentalChartError> {
        let db = self.db.lock()?;
        let plans = db.list_plans(&patient_id)?;
        Ok(plans.into_iter().map(|p| p.into()).collect())
    }

    /// Create a plan at the end of the list.
    pub fn create_plan(
        &self,
        patient_id: String,
        plan: FfiNewPlan,
    ) -> Result<FfiTreatmentPlan, DentalChartError> {
        let db = self.db.lock()?;
        let mut new_plan = NewPlan::try_from(plan)?;
        new_plan.sort_order = store::next_sort_order(&db.list_plans(&patient_id)?);
        let created = db.create_plan(&patient_id, new_plan)?;
        Ok(created.into())
    }

    pub fn update_plan(&self, plan_id: String, patch: FfiPlanPatch) -> Result<(), DentalChartError> {
        let db = self.db.lock()?;
        let patch = PlanPatch::try_from(patch)?;
        db.update_plan(&plan_id, &patch)?;
        Ok(())
    }

    pub fn delete_plan(&self, plan_id: String) -> Result<(), DentalChartError> {
        let db = self.db.lock()?;
        db.delete_plan(&plan_id)?;
        Ok(())
    }

    pub fn complete_plan(&self, plan_id: String) -> Result<(), DentalChartError> {
        let db = self.db.lock()?;
        store::complete_plan(&*db, &plan_id, &now())?;
        Ok(())
    }

    pub fn reopen_plan(&self, plan_id: String) -> Result<(), DentalChartError> {
        let db = self.db.lock()?;
        store::reopen_plan(&*db, &plan_id)?;
        Ok(())
    }

    /// Move `teeth` off a plan into a new sibling plan right after it.
    pub fn split_plan(
        &self,
        patient_id: String,
        plan_id: String,
        teeth: Vec<u32>,
    ) -> Result<FfiTreatmentPlan, DentalChartError> {
        let db = self.db.lock()?;
        let selection = parse_teeth(&teeth)?;
        let sibling = split::split_plan(&*db, &patient_id, &plan_id, &selection)?;
        Ok(sibling.into())
    }

    /// Renumber one staff column in the given order.
    pub fn reorder_plans(
        &self,
        patient_id: String,
        staff_type: String,
        ordered_ids: Vec<String>,
    ) -> Result<FfiBatchReport, DentalChartError> {
        let db = self.db.lock()?;
        let plans = db.list_plans(&patient_id)?;
        let mutations = store::reorder_partition(&plans, parse_staff(&staff_type)?, &ordered_ids)?;
        let report = store::apply_mutations(&*db, &patient_id, mutations)?;
        Ok(report.into())
    }

    /// Drag-and-drop move within a staff column.
    pub fn move_plan(
        &self,
        patient_id: String,
        plan_id: String,
        staff_type: String,
        target_index: u32,
    ) -> Result<FfiBatchReport, DentalChartError> {
        let db = self.db.lock()?;
        let plans = db.list_plans(&patient_id)?;
        let mutations = store::move_plan(
            &plans,
            &plan_id,
            parse_staff(&staff_type)?,
            target_index as usize,
        )?;
        let report = store::apply_mutations(&*db, &patient_id, mutations)?;
        Ok(report.into())
    }

    pub fn treatment_memo(&self, patient_id: String) -> Result<Option<String>, DentalChartError> {
        let db = self.db.lock()?;
        Ok(db.treatment_memo(&patient_id)?)
    }

    // =========================================================================
    // Periodontal Flow Operations
    // =========================================================================

    /// Phase-by-phase progress and the phases offered next.
    pub fn flow_summary(&self, patient_id: String) -> Result<FfiFlowSummary, DentalChartError> {
        let db = self.db.lock()?;
        let state = FlowState::derive(&db.list_plans(&patient_id)?);
        Ok(state.into())
    }

    /// Select a branch: purge superseded phase plans, then create the new ones.
    pub fn select_branch(
        &self,
        patient_id: String,
        phase: String,
        selections: Vec<FfiToothSelection>,
    ) -> Result<FfiBatchReport, DentalChartError> {
        let db = self.db.lock()?;
        let phase = parse_phase(&phase)?;
        let selections = selections
            .into_iter()
            .map(ToothSelection::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let report = flow::select_branch(&*db, &patient_id, phase, &selections)?;
        Ok(report.into())
    }

    /// Complete or reopen a whole phase. Returns the status its plans now carry.
    pub fn toggle_phase(&self, patient_id: String, phase: String) -> Result<String, DentalChartError> {
        let db = self.db.lock()?;
        let toggle = flow::toggle_phase(&*db, &patient_id, parse_phase(&phase)?, &now())?;
        Ok(toggle.target.as_str().to_string())
    }

    /// Rewrite the teeth of an SRP or surgery plan.
    pub fn reassign_phase_teeth(
        &self,
        patient_id: String,
        plan_id: String,
        teeth: Vec<u32>,
    ) -> Result<(), DentalChartError> {
        let db = self.db.lock()?;
        let plans = db.list_plans(&patient_id)?;
        let mutation = flow::reassign_phase_teeth(&plans, &plan_id, parse_teeth(&teeth)?)?;
        store::apply_mutations(&*db, &patient_id, vec![mutation])?;
        Ok(())
    }

    // =========================================================================
    // Exam Operations
    // =========================================================================

    /// Store a visual exam given as JSON.
    pub fn record_visual_exam(&self, exam_json: String) -> Result<String, DentalChartError> {
        let exam: models::VisualExam = serde_json::from_str(&exam_json)?;
        let db = self.db.lock()?;
        db.insert_visual_exam(&exam)?;
        Ok(exam.id)
    }

    /// Store a periodontal exam given as JSON.
    pub fn record_periodontal_exam(&self, exam_json: String) -> Result<String, DentalChartError> {
        let exam: models::PeriodontalExam = serde_json::from_str(&exam_json)?;
        let db = self.db.lock()?;
        db.insert_periodontal_exam(&exam)?;
        Ok(exam.id)
    }

    // =========================================================================
    // Review Operations
    // =========================================================================

    /// Open a review of proposals from the latest visual exam.
    pub fn start_visual_review(&self, patient_id: String) -> Result<Vec<FfiProposal>, DentalChartError> {
        let proposals = {
            let db = self.db.lock()?;
            generator::proposals_from_latest_visual(&*db, &patient_id)?
        };
        self.start_review(patient_id, proposals)
    }

    /// Open a review of proposals from the newest periodontal exam.
    pub fn start_periodontal_review(
        &self,
        patient_id: String,
    ) -> Result<Vec<FfiProposal>, DentalChartError> {
        let proposals = {
            let db = self.db.lock()?;
            generator::proposals_from_latest_periodontal(
                &*db,
                &patient_id,
                &self.config.periodontal,
            )?
        };
        self.start_review(patient_id, proposals)
    }

    pub fn review_proposals(&self) -> Result<Vec<FfiProposal>, DentalChartError> {
        self.with_review(|session| Ok(ffi_proposals(session)))
    }

    pub fn resolve_proposal(&self, index: u32, choice: String) -> Result<(), DentalChartError> {
        let choice = models::RestorationChoice::parse(&choice)
            .ok_or_else(|| DentalChartError::InvalidInput(format!("unknown restoration choice: {}", choice)))?;
        self.with_review(|session| session.resolve(index as usize, choice))
    }

    pub fn remove_proposal(&self, index: u32) -> Result<(), DentalChartError> {
        self.with_review(|session| session.remove(index as usize).map(|_| ()))
    }

    pub fn split_proposal(&self, index: u32, teeth: Vec<u32>) -> Result<(), DentalChartError> {
        let selection = parse_teeth(&teeth)?;
        self.with_review(|session| session.split(index as usize, &selection))
    }

    pub fn annotate_proposal(&self, index: u32, note: String) -> Result<(), DentalChartError> {
        self.with_review(|session| session.annotate(index as usize, &note))
    }

    /// Commit the open review. On a validation failure the review stays open.
    pub fn commit_review(&self) -> Result<FfiCommitOutcome, DentalChartError> {
        let mut review = self.review.lock()?;
        let session = review
            .as_ref()
            .ok_or_else(|| DentalChartError::InvalidState("no review in progress".into()))?
            .clone();
        let db = self.db.lock()?;
        let outcome = session.commit(&*db)?;
        *review = None;
        Ok(outcome.into())
    }

    pub fn discard_review(&self) -> Result<(), DentalChartError> {
        *self.review.lock()? = None;
        Ok(())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe treatment plan.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTreatmentPlan {
    pub id: String,
    pub patient_id: String,
    pub treatment_content: String,
    pub staff_type: String,
    pub teeth: Vec<u32>,
    pub priority: i64,
    pub status: String,
    pub completed_at: Option<String>,
    pub sort_order: i64,
    pub periodontal_phase: Option<String>,
    pub hygienist_menu_type: Option<String>,
    pub is_memo: bool,
    pub memo: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TreatmentPlan> for FfiTreatmentPlan {
    fn from(plan: TreatmentPlan) -> Self {
        Self {
            id: plan.id,
            patient_id: plan.patient_id,
            treatment_content: plan.treatment_content,
            staff_type: plan.staff_type.as_str().to_string(),
            teeth: plan.teeth.iter().map(u32::from).collect(),
            priority: plan.priority.as_i64(),
            status: plan.status.as_str().to_string(),
            completed_at: plan.completed_at,
            sort_order: plan.sort_order,
            periodontal_phase: plan.periodontal_phase.map(|p| p.as_str().to_string()),
            hygienist_menu_type: plan.hygienist_menu_type.map(|m| m.as_str().to_string()),
            is_memo: plan.is_memo,
            memo: plan.memo,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

/// FFI-safe plan fields for creation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPlan {
    pub treatment_content: String,
    pub staff_type: String,
    pub teeth: Vec<u32>,
    pub priority: i64,
    pub periodontal_phase: Option<String>,
    pub hygienist_menu_type: Option<String>,
    pub is_memo: bool,
    pub memo: Option<String>,
}

impl TryFrom<FfiNewPlan> for NewPlan {
    type Error = DentalChartError;

    fn try_from(plan: FfiNewPlan) -> Result<Self, Self::Error> {
        let hygienist_menu_type = plan.hygienist_menu_type.as_deref().map(parse_menu).transpose()?;
        Ok(NewPlan {
            teeth: parse_teeth(&plan.teeth)?,
            priority: parse_priority(plan.priority)?,
            periodontal_phase: plan.periodontal_phase.as_deref().map(parse_phase).transpose()?,
            hygienist_menu_type,
            is_memo: plan.is_memo,
            memo: plan.memo,
            ..NewPlan::new(plan.treatment_content, parse_staff(&plan.staff_type)?)
        })
    }
}

/// FFI-safe partial update. `None` leaves a field unchanged; an empty
/// string clears `periodontal_phase`, `hygienist_menu_type` or `memo`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPlanPatch {
    pub treatment_content: Option<String>,
    pub teeth: Option<Vec<u32>>,
    pub priority: Option<i64>,
    pub periodontal_phase: Option<String>,
    pub hygienist_menu_type: Option<String>,
    pub is_memo: Option<bool>,
    pub memo: Option<String>,
}

impl TryFrom<FfiPlanPatch> for PlanPatch {
    type Error = DentalChartError;

    fn try_from(patch: FfiPlanPatch) -> Result<Self, Self::Error> {
        Ok(PlanPatch {
            treatment_content: patch.treatment_content,
            teeth: patch.teeth.as_deref().map(parse_teeth).transpose()?,
            priority: patch.priority.map(parse_priority).transpose()?,
            periodontal_phase: parse_nullable(patch.periodontal_phase, parse_phase)?,
            hygienist_menu_type: parse_nullable(patch.hygienist_menu_type, parse_menu)?,
            is_memo: patch.is_memo,
            memo: patch.memo.map(|memo| Some(memo).filter(|m| !m.is_empty())),
            ..PlanPatch::default()
        })
    }
}

/// FFI-safe tooth group for branch selection. `block` is a block label
/// such as "upper right"; when set, `teeth` may narrow the block.
/// `dentition` ("permanent" or "deciduous", default permanent) picks the
/// teeth of a whole block.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiToothSelection {
    pub block: Option<String>,
    pub dentition: Option<String>,
    pub teeth: Vec<u32>,
}

impl TryFrom<FfiToothSelection> for ToothSelection {
    type Error = DentalChartError;

    fn try_from(selection: FfiToothSelection) -> Result<Self, Self::Error> {
        let selected = parse_teeth(&selection.teeth)?;
        match selection.block {
            None => Ok(ToothSelection::Teeth(selected)),
            Some(label) => {
                let block = teeth::Block::ALL
                    .into_iter()
                    .find(|b| b.label() == label)
                    .ok_or_else(|| DentalChartError::InvalidInput(format!("unknown block: {}", label)))?;
                if selected.is_empty() {
                    let dentition = selection
                        .dentition
                        .as_deref()
                        .map(parse_dentition)
                        .transpose()?
                        .unwrap_or(teeth::Dentition::Permanent);
                    Ok(ToothSelection::block(block, dentition))
                } else {
                    Ok(ToothSelection::Block { block, teeth: selected })
                }
            }
        }
    }
}

/// FFI-safe batch result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBatchReport {
    pub created: Vec<FfiTreatmentPlan>,
    pub updated: u32,
    pub deleted: u32,
}

impl From<store::BatchReport> for FfiBatchReport {
    fn from(report: store::BatchReport) -> Self {
        Self {
            created: report.created.into_iter().map(|p| p.into()).collect(),
            updated: report.updated as u32,
            deleted: report.deleted as u32,
        }
    }
}

/// FFI-safe phase progress.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPhaseSummary {
    pub phase: String,
    pub label: String,
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
    pub status: String,
}

/// FFI-safe flow overview.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFlowSummary {
    pub phases: Vec<FfiPhaseSummary>,
    pub current_phase: Option<String>,
    pub next_phases: Vec<String>,
}

impl From<FlowState> for FfiFlowSummary {
    fn from(state: FlowState) -> Self {
        let current_phase = state.current_phase().map(|p| p.as_str().to_string());
        let next_phases = state
            .next_phases()
            .into_iter()
            .map(|p| p.as_str().to_string())
            .collect();
        let phases = state
            .summaries
            .into_iter()
            .map(|s| FfiPhaseSummary {
                phase: s.phase.as_str().to_string(),
                label: s.phase.label().to_string(),
                total: s.total as u32,
                completed: s.completed as u32,
                pending: s.pending as u32,
                status: match s.status {
                    flow::PhaseStatus::NotStarted => "not_started",
                    flow::PhaseStatus::InProgress => "in_progress",
                    flow::PhaseStatus::Completed => "completed",
                }
                .to_string(),
            })
            .collect();
        Self {
            phases,
            current_phase,
            next_phases,
        }
    }
}

/// FFI-safe restoration option.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRestorationOption {
    pub choice: String,
    pub label: String,
    pub description: String,
}

/// FFI-safe proposal under review.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProposal {
    pub index: u32,
    pub teeth: Vec<u32>,
    pub treatment_content: String,
    pub staff_type: String,
    pub priority: i64,
    pub periodontal_phase: Option<String>,
    pub notes: String,
    /// Empty for direct proposals
    pub options: Vec<FfiRestorationOption>,
    pub chosen: Option<String>,
}

fn ffi_proposals(session: &ReviewSession) -> Vec<FfiProposal> {
    session
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let proposal = &item.proposal;
            FfiProposal {
                index: index as u32,
                teeth: proposal.teeth.iter().map(u32::from).collect(),
                treatment_content: proposal.treatment_content.clone(),
                staff_type: proposal.staff_type.as_str().to_string(),
                priority: proposal.priority.as_i64(),
                periodontal_phase: proposal.periodontal_phase.map(|p| p.as_str().to_string()),
                notes: proposal.notes.clone(),
                options: proposal
                    .options()
                    .iter()
                    .map(|o| FfiRestorationOption {
                        choice: o.choice.as_str().to_string(),
                        label: o.label.clone(),
                        description: o.description.clone(),
                    })
                    .collect(),
                chosen: item.choice.map(|c| c.as_str().to_string()),
            }
        })
        .collect()
}

/// FFI-safe commit result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCommitOutcome {
    pub created: Vec<FfiTreatmentPlan>,
    pub memo: Option<String>,
}

impl From<generator::CommitOutcome> for FfiCommitOutcome {
    fn from(outcome: generator::CommitOutcome) -> Self {
        Self {
            created: outcome.created.into_iter().map(|p| p.into()).collect(),
            memo: outcome.memo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visual_exam_json() -> String {
        serde_json::json!({
            "id": "exam-1",
            "patient_id": "patient-1",
            "examined_on": "2026-05-01T09:00:00+00:00",
            "notes": null,
            "observations": [
                {"tooth": 14, "status": "caries", "caries_level": "C2",
                 "restoration_type": null, "material_type": null, "notes": null},
                {"tooth": 15, "status": "caries", "caries_level": "C2",
                 "restoration_type": null, "material_type": null, "notes": null},
                {"tooth": 36, "status": "missing", "caries_level": null,
                 "restoration_type": null, "material_type": null, "notes": null}
            ]
        })
        .to_string()
    }

    #[test]
    fn test_review_over_ffi() {
        let core = open_database_in_memory().unwrap();
        core.record_visual_exam(visual_exam_json()).unwrap();

        let proposals = core.start_visual_review("patient-1".into()).unwrap();
        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[1].options.len(), 4);

        assert!(matches!(
            core.commit_review(),
            Err(DentalChartError::InvalidInput(_))
        ));
        core.resolve_proposal(1, "bridge".into()).unwrap();
        let outcome = core.commit_review().unwrap();
        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.created[0].teeth, vec![14, 15]);
        assert_eq!(outcome.memo.as_deref(), Some("36: bridge"));

        assert!(matches!(
            core.review_proposals(),
            Err(DentalChartError::InvalidState(_))
        ));
    }

    #[test]
    fn test_plan_flow_over_ffi() {
        let core = open_database_in_memory().unwrap();
        let plan = core
            .create_plan(
                "patient-1".into(),
                FfiNewPlan {
                    treatment_content: "CR filling".into(),
                    staff_type: "doctor".into(),
                    teeth: vec![14, 15, 16],
                    priority: 2,
                    periodontal_phase: None,
                    hygienist_menu_type: None,
                    is_memo: false,
                    memo: None,
                },
            )
            .unwrap();

        let sibling = core
            .split_plan("patient-1".into(), plan.id.clone(), vec![16])
            .unwrap();
        assert_eq!(sibling.teeth, vec![16]);
        assert!(matches!(
            core.split_plan("patient-1".into(), sibling.id, vec![16]),
            Err(DentalChartError::InvalidSplit(_))
        ));

        core.select_branch("patient-1".into(), "P_EXAM_1".into(), vec![])
            .unwrap();
        assert_eq!(
            core.toggle_phase("patient-1".into(), "P_EXAM_1".into()).unwrap(),
            "completed"
        );
        let summary = core.flow_summary("patient-1".into()).unwrap();
        assert_eq!(summary.next_phases, vec!["INITIAL".to_string()]);

        assert!(matches!(
            core.toggle_phase("patient-1".into(), "P_EXAM_9".into()),
            Err(DentalChartError::InvalidInput(_))
        ));
    }

    fn new_plan(content: &str, staff_type: &str) -> FfiNewPlan {
        FfiNewPlan {
            treatment_content: content.into(),
            staff_type: staff_type.into(),
            teeth: vec![],
            priority: 1,
            periodontal_phase: None,
            hygienist_menu_type: None,
            is_memo: false,
            memo: None,
        }
    }

    #[test]
    fn test_patch_phase_fields_over_ffi() {
        let core = open_database_in_memory().unwrap();
        let plan = core
            .create_plan(
                "patient-1".into(),
                FfiNewPlan {
                    hygienist_menu_type: Some("TBI".into()),
                    ..new_plan("brushing instruction", "hygienist")
                },
            )
            .unwrap();

        core.update_plan(
            plan.id.clone(),
            FfiPlanPatch {
                treatment_content: None,
                teeth: None,
                priority: None,
                periodontal_phase: Some("INITIAL".into()),
                hygienist_menu_type: Some(String::new()),
                is_memo: Some(true),
                memo: None,
            },
        )
        .unwrap();

        let plans = core.list_plans("patient-1".into()).unwrap();
        assert_eq!(plans[0].periodontal_phase.as_deref(), Some("INITIAL"));
        assert_eq!(plans[0].hygienist_menu_type, None);
        assert!(plans[0].is_memo);
        assert_eq!(plans[0].treatment_content, "brushing instruction");

        assert!(matches!(
            core.update_plan(
                plan.id,
                FfiPlanPatch {
                    treatment_content: None,
                    teeth: None,
                    priority: None,
                    periodontal_phase: Some("SRP_9".into()),
                    hygienist_menu_type: None,
                    is_memo: None,
                    memo: None,
                },
            ),
            Err(DentalChartError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_deciduous_block_selection() {
        let core = open_database_in_memory().unwrap();
        let report = core
            .select_branch(
                "patient-1".into(),
                "SRP".into(),
                vec![
                    FfiToothSelection {
                        block: Some("upper right".into()),
                        dentition: Some("deciduous".into()),
                        teeth: vec![],
                    },
                    FfiToothSelection {
                        block: Some("lower left".into()),
                        dentition: None,
                        teeth: vec![],
                    },
                ],
            )
            .unwrap();
        assert_eq!(report.created[0].teeth, vec![51, 52, 53, 54, 55]);
        assert_eq!(report.created[1].teeth, vec![31, 32, 33, 34, 35, 36, 37, 38]);

        assert!(matches!(
            core.select_branch(
                "patient-1".into(),
                "SRP".into(),
                vec![FfiToothSelection {
                    block: Some("upper left".into()),
                    dentition: Some("mixed".into()),
                    teeth: vec![],
                }],
            ),
            Err(DentalChartError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_open_database_installs_configured_logging() {
        use std::io::Write;

        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("engine.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "[logging]\nfilter = \"dental_chart_core=debug\"").unwrap();

        let core = open_database(
            dir.path().join("chart.db").to_string_lossy().into_owned(),
            Some(config_path.to_string_lossy().into_owned()),
        )
        .unwrap();
        assert!(core.list_plans("patient-1".into()).unwrap().is_empty());

        // A subscriber is in place once a database is open.
        assert!(!init_logging("warn".into()));
    }
}
