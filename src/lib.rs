//! Rulekeeper - replicated state machine core
//!
//! The deterministic state machine layer of a replicated rule/event
//! processing store. The consensus layer delivers committed log entries
//! one at a time to `Fsm::apply` and mutates nothing else directly.
//! Whole-state snapshots support log compaction and bring new or
//! lagging replicas up to date.

pub mod fsm;
pub mod snapshot;
pub mod store;

/// Testing utilities for routing and integration tests.
pub mod testing;
