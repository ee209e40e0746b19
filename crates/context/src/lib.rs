//! # Atlas Context
//!
//! Bounded context bundles for external agents: the focus document, a fixed
//! spine of canonical documents, and the focus document's outbound links,
//! deduplicated and size-capped, each loaded fresh and content-hashed.

mod assembler;
mod error;

pub use assembler::{assemble_context, ContextSource, SPINE};
pub use error::{ContextError, Result};
