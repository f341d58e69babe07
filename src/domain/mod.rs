//! # Domain Layer
//!
//! Classification records, chat transcript entries, generation settings and
//! the error type shared by every layer. Nothing here performs I/O.

mod error;
pub mod models;

pub use error::*;
pub use models::*;
