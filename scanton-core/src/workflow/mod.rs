//! Multi-step UI workflows built on the endpoint clients.

pub mod golden_set;
pub mod proposals;
pub mod recovery;

pub use golden_set::{BulkOutcome, GoldenSetState, SampleCandidate};
pub use proposals::{DecisionCounts, ProposalBoard};
pub use recovery::{run_recovery, RecoveryLog, RecoveryPhase};
