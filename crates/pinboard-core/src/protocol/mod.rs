//! Save-endpoint protocol: revision tagging and wire payloads.

pub mod payload;
pub mod revision;

pub use payload::{SaveRequest, SaveResponse, SavedItem};
pub use revision::RevisionCounter;
