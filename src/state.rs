//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AuthService, LinkService, RedirectService};
use crate::domain::repositories::MappingRepository;

/// Services and settings shared by all requests.
///
/// Cheap to clone: every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn MappingRepository>>,
    pub redirect_service: Arc<RedirectService<dyn MappingRepository>>,
    pub auth_service: Arc<AuthService>,
    /// Configured public base for short links, if any.
    pub base_url: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService<dyn MappingRepository>>,
        redirect_service: Arc<RedirectService<dyn MappingRepository>>,
        auth_service: Arc<AuthService>,
        base_url: Option<String>,
    ) -> Self {
        Self {
            link_service,
            redirect_service,
            auth_service,
            base_url: base_url.map(Arc::from),
        }
    }
}
