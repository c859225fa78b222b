//! Shared domain types for the genstudio workspace.
//!
//! Everything here is free of I/O: identifiers, the error taxonomy, the
//! generation status state machine, request validation, and the content
//! path naming scheme shared by the generators and the file server.

pub mod error;
pub mod generation;
pub mod naming;
pub mod types;
