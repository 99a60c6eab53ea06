//! Persistence layer: per-tenant configuration documents.
//!
//! Each tenant owns one JSON object stored as `<hosts-root>/<tenant-id>.json`.
//! The host loads it on creation and writes it back only on explicit save;
//! memory and disk may diverge in between.

pub mod document;
pub mod file_store;

pub use document::ConfigDocument;
pub use file_store::DocumentStore;
