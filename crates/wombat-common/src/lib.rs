//! Common utilities for the wombat document model.
//!
//! This crate provides shared infrastructure used by all model components:
//! - **URL Resolution** - joining relative references onto absolute bases
//! - **Warning Bus** - per-view de-duplicated diagnostics

pub mod url;
pub mod warning;

pub use url::{has_scheme, resolve_url, split_fragment, url_root};
pub use warning::WarningSet;
