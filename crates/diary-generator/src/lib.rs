//! Diary Generator Library
//!
//! The content pipeline shared by the static build and the live server.
//!
//! # Modules
//!
//! - [`collector`] - Post discovery, parsing and ordering
//! - [`archive`] - Year/month grouping of posts
//! - [`template`] - Theme template resolution with fallback
//! - [`page`] - Per-page template data
//! - [`build`] - Build orchestration

pub mod archive;
pub mod build;
pub mod collector;
pub mod page;
pub mod template;

pub use archive::ArchiveIndex;
pub use build::{BuildError, BuildStats, Builder};
pub use collector::PostCollector;
pub use page::{Page, debug_listing, debug_panel, global_context};
pub use template::{TemplateError, ThemeRenderer};
