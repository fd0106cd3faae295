//! Error types for the leadrelay protocol layer.

mod delivery;
mod enrichment;
mod submission;

pub use delivery::*;
pub use enrichment::*;
pub use submission::*;
