//! ConLearn Database Layer
//!
//! Persistence for upload metadata. Callers depend on the
//! [`UploadRepository`] trait; [`PgUploadRepository`] is the PostgreSQL
//! implementation used by the API server.

pub mod db;
pub mod pool;
pub mod repository;

pub use db::PgUploadRepository;
pub use pool::{connect, migrate, MIGRATOR};
pub use repository::UploadRepository;
