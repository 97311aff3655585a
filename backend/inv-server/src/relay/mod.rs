//! Supervision of the change listener that feeds the broadcast hub.

pub mod backoff;
pub mod relay_context;
