//! Replicated state machine layer
//!
//! The consensus layer delivers committed log entries one at a time to
//! the dispatcher. Independently of the apply stream it may request a
//! whole-state snapshot for log compaction or install a foreign one to
//! bring a replica up to date.
//!
//! - `command`: the closed set of replicated operations
//! - `machine`: the dispatcher plus snapshot/restore endpoints
//! - `traits`: the seam the consensus layer drives the machine through

pub mod command;
pub mod machine;
pub mod traits;

pub use command::{Command, CommandEnvelope, SCHEMA_VERSION};
pub use machine::{Fsm, SharedFsm};
pub use traits::{ApplyResult, Snapshotable, StateMachine};
