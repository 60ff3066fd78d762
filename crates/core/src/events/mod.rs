//! Domain events module.
//!
//! Provides the bookmark event types and the sink trait for emitting events
//! after successful domain mutations. The server runtime implements the sink
//! to fan events out to the owner identity's live push connections.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
