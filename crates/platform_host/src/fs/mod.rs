//! Filesystem orchestrator contracts.

pub mod service;
pub mod types;
