//! Utility modules.
//!
//! - [`paths`]: Tilde/env expansion and directory creation
//! - [`uri`]: Provider base URLs
pub mod paths;
pub mod uri;
