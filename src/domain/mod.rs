//! Domain layer containing business entities and logic.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`visit_event`] - Deferred visit model
//! - [`visit_worker`] - Asynchronous visit counting worker
//!
//! # Visit Counting Flow
//!
//! 1. A redirect is resolved from the store: `find_and_increment` counts it inline
//! 2. A redirect is resolved from the cache: a [`visit_event::VisitEvent`] is queued
//! 3. [`visit_worker::run_visit_worker`] applies queued increments with retry

pub mod entities;
pub mod repositories;
pub mod visit_event;
pub mod visit_worker;
