//! SiteSync Core Library
//!
//! Resource models and client-side synchronization for the SiteSync
//! construction-management client.

pub mod api;
pub mod dashboard;
pub mod draft;
pub mod kind;
pub mod models;
pub mod normalize;
pub mod resource;
pub mod session;
pub mod sync;
pub mod upload;

pub use api::{ApiClient, ApiOptions, LoginResponse};
pub use dashboard::{summarize, DashboardData, Role, Stat};
pub use draft::{FieldKind, FieldSpec, FormDraft, FormSchema, Payload, References};
pub use kind::ResourceKind;
pub use resource::{Collection, Record, Resource, ResourceId};
pub use session::{
    FileSessionStore, MemorySessionStore, Session, SessionError, SessionStore, SessionUser,
};
pub use sync::{
    load_pair, LoadGroup, LoadOutcome, NetworkError, NetworkErrorKind, ResourceSync, SeedFallback,
    SyncError, ValidationError,
};
pub use upload::{FileHandle, UploadError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
