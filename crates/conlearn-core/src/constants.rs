//! Constants shared between the server and the client.

/// Maximum number of records returned by a single upload listing.
pub const MAX_UPLOADS_PER_LIST: i64 = 50;

/// Default validity window of a pre-signed upload URL.
pub const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 300;

/// Bounds accepted for `PRESIGN_EXPIRY_SECS`.
pub const MIN_PRESIGN_EXPIRY_SECS: u64 = 10;
pub const MAX_PRESIGN_EXPIRY_SECS: u64 = 900;

/// Extension used for storage keys when the file name has none.
pub const DEFAULT_FILE_EXTENSION: &str = "bin";

/// Path segment between the user id and the object name in storage keys.
pub const UPLOADS_SEGMENT: &str = "uploads";
