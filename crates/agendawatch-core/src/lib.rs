//! Core types: raw agenda events, canonical keys, event-set diffing, message formatting

pub mod canonical;
pub mod diff;
pub mod event;
pub mod message;
pub mod tracing;

pub use canonical::{CanonicalKey, MANDATORY_SUFFIX, PLACEHOLDER_TITLE, canonicalize};
pub use diff::{EventDiff, EventSet, diff};
pub use event::RawEvent;
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
