//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! cache invalidation, and business rules. Services consume repository traits
//! and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation and administration
//! - [`services::redirect_service::RedirectService`] - Short code resolution and visit counting
//! - [`services::auth_service::AuthService`] - Admin login and session tokens

pub mod services;
