//! Collaborators living at the edge of the core: the event log.
pub mod log;
