//! ConLearn Storage Library
//!
//! Object storage access for the upload service: pre-signed PUT URLs, public
//! object URLs and existence checks, with an S3 implementation built on
//! the AWS SDK.
//!
//! # Storage key format
//!
//! Every object lives under its owner's namespace:
//!
//! - `{user_id}/uploads/{uuid}.{ext}`
//!
//! Key generation is centralized in the `keys` module so the issuer and any
//! tooling agree on the layout.

pub mod factory;
pub mod keys;
pub mod s3;
pub mod traits;

pub use factory::create_storage;
pub use keys::{file_extension, generate_upload_key};
pub use s3::{S3Credentials, S3Storage};
pub use traits::{Storage, StorageError, StorageResult};
