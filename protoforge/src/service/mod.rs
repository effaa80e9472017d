//! Service layer

pub mod discovery;
pub mod generation;
pub mod unpack;

pub use generation::GenerationService;
pub use unpack::UnpackService;
