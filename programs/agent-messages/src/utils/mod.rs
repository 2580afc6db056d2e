//! Utility modules for agent message acceptance

pub mod validation;
