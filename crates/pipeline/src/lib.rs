//! Generation workflow for one accepted request.
//!
//! - [`images`]: the Image Generation Adapter over an [`images::ImageOracle`].
//! - [`videos`]: the inert Video Generation Stub.
//! - [`orchestrator`]: runs both generators and writes the joint outcome.
//! - [`tasks`]: supervised registry of in-flight orchestrator units.
//! - [`store`]: the terminal-update seam onto the Content Store.

pub mod error;
pub mod images;
pub mod orchestrator;
pub mod store;
pub mod tasks;
pub mod videos;

#[cfg(test)]
pub(crate) mod testing;

pub use error::GenerationError;
pub use orchestrator::{GenerationJob, GenerationOrchestrator, GenerationOutcome};
pub use tasks::{log_reports, GenerationTasks, InFlightGeneration, TaskReport};
