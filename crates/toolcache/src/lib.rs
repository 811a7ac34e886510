//! Cache substrate for steamup.
//!
//! Two independent persistence primitives, both directory-backed:
//!
//! - [`ToolStore`] / [`HostedToolStore`]: versioned `(name, version)` →
//!   directory storage in the hosted runner's tool-cache layout, with a
//!   completion marker giving per-version atomic-commit semantics
//! - [`FileCache`] / [`DirFileCache`]: keyed file-set storage with
//!   fallback-key matching, used for the tool's configuration file

#![warn(missing_docs)]

mod error;
mod files;
mod store;

pub use error::{Error, Result};
pub use files::{DirFileCache, FileCache};
pub use store::{HostedToolStore, ToolStore};
