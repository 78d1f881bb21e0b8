//! Map refresh gating.
//!
//! [`RefreshGate`] remembers the last image actually shown and
//! [`RefreshPolicy`] decides whether a new position or heading justifies a
//! new request.

mod gate;
mod policy;

pub use gate::RefreshGate;
pub use policy::{
    RefreshDecision, RefreshPolicy, DEFAULT_MAX_AGE, DEFAULT_MIN_DISTANCE_M,
    DEFAULT_MIN_HEADING_DELTA, DEFAULT_POLL_INTERVAL,
};
