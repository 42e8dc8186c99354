// handlers/protected/mod.rs - Handlers that require a gateway-authorized identity
//
// Every handler here takes TrustedIdentity as an extractor. Tenant-scoped
// handlers call require_company() and pass that id to the store; ids found in
// request bodies are never used.

pub mod auth;
pub mod meetings;

pub use auth::whoami;
pub use meetings::{meeting_create, meeting_get, meetings_list};
