//! Excaliapp document store
//!
//! Persists drawings in a local directory as pairs of files: a small JSON
//! metadata record (`<id>.i.json`) and the raw drawing content
//! (`<id>.excalidraw`). Listing reads only the metadata records.

pub mod core;

pub use crate::core::config::{MalformedPolicy, StoreConfig};
pub use crate::core::document::{Document, Location, SaveRequest};
pub use crate::core::error::{Result, StoreError};
pub use crate::core::store::DocumentStore;
