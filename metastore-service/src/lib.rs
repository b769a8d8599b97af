//! The service layer provides the synchronous API of the metadata store.
//!
//! The [`MetadataStore`] trait is the boundary that benchmark clients drive load against. This
//! crate ships an [`InMemoryStore`] implementation, plus [`populate`] helpers to seed a store
//! with types and nodes before a benchmark runs.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod error;
mod in_memory;
pub mod populate;
mod store;

pub use error::{StoreError, StoreResult};
pub use in_memory::InMemoryStore;
pub use store::MetadataStore;
