//! State machine seam driven by the consensus layer
//!
//! Implementations must be deterministic: applying the same committed
//! entries in the same order must produce the same state and the same
//! results on all replicas.

use std::io::Read;

use crate::snapshot::{FsmSnapshot, RestoreError};
use crate::store::StoreError;

/// Result of applying one committed command
///
/// Store outcomes pass through verbatim - this layer does not interpret
/// or mask them. The error side is serializable so the replication layer
/// can deliver it back to the submitting client.
pub type ApplyResult = Result<(), StoreError>;

/// State machine trait - the application logic replication coordinates
pub trait StateMachine: Send {
    /// Apply one committed log entry
    ///
    /// Halts the process instead of returning if the entry cannot be
    /// decoded: a committed entry no replica can interpret means
    /// corruption or irreconcilable version skew, and continuing would
    /// risk silent divergence from peers.
    fn apply(&mut self, entry: &[u8]) -> ApplyResult;
}

/// Snapshotable state machine - supports log compaction and catch-up
///
/// Snapshot production and installation must never interleave with
/// `apply`; see `SharedFsm` for the serialization discipline.
pub trait Snapshotable: StateMachine {
    /// Capture a consistent point-in-time image of the whole state
    fn snapshot(&self) -> FsmSnapshot;

    /// Replace the whole state with an image read from `reader`
    ///
    /// Decode failure is recoverable and leaves existing state
    /// untouched. The reader is consumed on every exit path.
    fn restore(&mut self, reader: Box<dyn Read + Send>) -> Result<(), RestoreError>;
}
