//! Browser-facing responses for the redirect path.
//!
//! Browsers that follow a dead short link get a small HTML page rather than a
//! JSON error body. Uses Askama templates for server-side rendering.
//!
//! # Modules
//!
//! - [`negotiation`] - Decides between JSON and HTML from request headers
//! - [`pages`] - Error page template

pub mod negotiation;
pub mod pages;

pub use negotiation::ResponseStyle;
pub use pages::{error_page, not_found_fallback};
