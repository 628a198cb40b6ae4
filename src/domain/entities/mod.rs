//! Core domain entities.
//!
//! - [`UrlMapping`] - A persisted short code with its destination and visit counter
//! - [`NewMapping`] - Input for creating a mapping

pub mod url_mapping;

pub use url_mapping::{NewMapping, UrlMapping};
