//! Dashboard Client
//!
//! - `DashboardClient`: typed reqwest wrapper over the REST API
//! - `Dashboard`: view state driven by that client

mod dashboard;
mod http;

pub use dashboard::{CheckFilter, Dashboard, ExportBlob};
pub use http::{ClientConfig, ClientError, DashboardClient, DEFAULT_API_URL};
