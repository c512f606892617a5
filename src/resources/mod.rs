//! Ancillary resources outside the format engine: cleanup policies and
//! routing rules. Same lifecycle shape as the engine, one fixed shape each.

pub mod cleanup_policy;
pub mod routing_rule;
