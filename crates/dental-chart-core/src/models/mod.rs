//! Domain models for the dental chart engine.

mod exam;
mod phase;
mod plan;
mod proposal;

pub use exam::*;
pub use phase::*;
pub use plan::*;
pub use proposal::*;
