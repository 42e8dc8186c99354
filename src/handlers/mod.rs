// handlers/mod.rs - Handlers grouped by gateway route class
//
// public    → no identity (root, health)
// protected → identity from the gateway; tenant routes scope by x-company-id
// elevated  → platform administration (SUPER_ADMIN only)
//
// Handlers never decide access themselves. They read the TrustedIdentity the
// gateway attached and use it as the only source of user and company ids.

pub mod elevated;
pub mod protected;
pub mod public;

use std::sync::Arc;

use crate::store::MeetingStore;

/// Shared state for downstream handlers.
#[derive(Clone, Default)]
pub struct AppState {
    pub meetings: Arc<MeetingStore>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
