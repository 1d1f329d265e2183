//! Object storage for finished renders.
//!
//! This crate provides:
//! - An R2 (S3-compatible) upload client
//! - The `ArtifactStore` seam the worker uploads through
//! - Filename sanitization and storage key layout

pub mod client;
pub mod error;
pub mod naming;

pub use client::{ArtifactStore, R2Client, R2Config};
pub use error::{StorageError, StorageResult};
pub use naming::{output_file_name, render_key, sanitize_filename};
