//! Data models for the client
//!
//! Mirrors of the records and payloads the fileshare backend exchanges with its clients.

mod file;
mod preferences;
mod responses;

pub use file::*;
pub use preferences::*;
pub use responses::*;
