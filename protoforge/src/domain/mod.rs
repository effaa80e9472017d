//! Domain types

pub mod plugin;
pub mod types;

pub use plugin::{GeneratedFileFilter, ProtocPlugin};
pub use types::{GenerationOutcome, UnpackedDependencies};
