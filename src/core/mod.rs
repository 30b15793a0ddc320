//! Core functionality: documents, on-disk layout, configuration, and the store

pub mod config;
pub mod document;
pub mod error;
pub mod file_system;
pub mod store;
