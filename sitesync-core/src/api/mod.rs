//! Remote backend access.

mod client;

pub use client::{build_http_url, ApiClient, ApiOptions, LoginResponse};
