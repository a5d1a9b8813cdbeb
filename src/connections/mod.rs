//! Database Connections
//!
//! Registry of named database endpoints used as `database` validation sources.

mod registry;

pub use registry::{ConnectionError, ConnectionRegistry, ConnectionResult};
