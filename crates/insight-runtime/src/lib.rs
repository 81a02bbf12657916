//! Runtime coordinator. Drives one source through classification,
//! synthesis and relevance generation into an [`IngestOutcome`].

pub mod coordinator;
pub mod types;

pub use coordinator::Coordinator;
pub use types::*;
