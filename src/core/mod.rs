//! Core command model: tokenization, command specs, and termination status.

pub mod command;
pub mod expansion;
pub mod status;
