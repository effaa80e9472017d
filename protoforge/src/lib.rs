//! Protoforge
//!
//! Orchestration glue around an external protobuf schema compiler: locate
//! `.proto` files, unpack proto dependencies bundled inside library
//! archives, invoke the compiler, and report its generated output as build
//! sources, skipping the invocation entirely when no schema changed.
//!
//! The compiler binary does all of the actual schema-to-code translation;
//! this crate only expresses the surrounding build steps (include paths,
//! output targets, cache invalidation) and shells out.

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod service;

pub use config::{Config, RuntimeDependency};
pub use domain::{GeneratedFileFilter, GenerationOutcome, ProtocPlugin, UnpackedDependencies};
pub use error::{Error, Result};
pub use infra::protoc::{ProtocRunner, SystemProtocRunner};
pub use service::{GenerationService, UnpackService};
