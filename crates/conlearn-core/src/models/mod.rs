//! Data models shared between the API server and its clients.

mod upload;

pub use upload::*;
