//! Client-side synchronization of remote resource collections.
//!
//! [`ResourceSync`] owns one local collection and applies the three
//! operations every screen of the application needs:
//! 1. `load_all` - replace local state with the server's collection
//! 2. `create` - validate a draft, submit it, prepend the result
//! 3. `update` - submit a patch, replace the matching element
//!
//! [`LoadGroup`] loads several collections at once, all or nothing.

mod error;
mod group;
mod resource_sync;

pub use error::{NetworkError, NetworkErrorKind, SyncError, ValidationError, GENERIC_FAILURE};
pub use group::{load_pair, LoadGroup};
pub use resource_sync::{LoadOutcome, ResourceSync, SeedFallback};
