//! API constants
//!
//! Handler path annotations spell the versioned prefix out literally because
//! utoipa needs compile-time strings; keep them in step with `API_PREFIX`.

/// API base path prefix (version-independent)
pub const API_BASE: &str = "/api";

pub const API_VERSION: &str = "v0";

/// Versioned prefix every JSON route is nested under
pub const API_PREFIX: &str = "/api/v0";

/// Path the local storage backend serves signed object URLs from
pub const STORAGE_PREFIX: &str = "/storage";
