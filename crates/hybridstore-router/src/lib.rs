//! Hybrid Upload Router
//!
//! Accepts a file with optional metadata, attempts the upload against a
//! primary blob store, and falls back to a secondary store after the primary
//! fails. Three consecutive primary failures disable the primary until an
//! explicit re-enable probe succeeds. Every stored blob is catalogued in the
//! metadata repository; the catalog write is deliberately not transactional
//! with the blob write.

pub mod router;
pub mod state;

pub use router::{HybridRouter, UploadOutcome};
pub use state::RouterState;
