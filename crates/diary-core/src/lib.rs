//! Diary Core Library
//!
//! Core types, configuration, and error handling for the Diary journal generator.

pub mod config;
pub mod content;
pub mod error;
pub mod frontmatter;
pub mod site;

pub use config::Config;
pub use content::{ParsedContent, Post};
pub use error::{CoreError, Result};
pub use frontmatter::Frontmatter;
pub use site::Site;
