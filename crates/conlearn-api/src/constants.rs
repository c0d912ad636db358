//! Route prefixes.

/// Base path of the upload endpoints
pub const FILES_PREFIX: &str = "/api/files";

/// Path serving the generated OpenAPI document
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Largest JSON body the API accepts. Requests only carry metadata.
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;
