//! Operation handlers for agent message acceptance
//!
//! Each handler evaluates every check before issuing its first write.

pub mod directory_helpers;
pub mod provenance_helpers;
pub mod sequence_helpers;
pub mod validation;

pub mod query_provenance;
pub mod register_agent;
pub mod submit_message;
pub mod submit_shielded_message;

use crate::config::AcceptancePolicy;
use crate::events::EventLog;

/// Everything a handler may read or write.
pub struct Context<'a, S: ?Sized> {
    pub store: &'a mut S,
    pub policy: &'a AcceptancePolicy,
    pub events: &'a mut EventLog,
}
