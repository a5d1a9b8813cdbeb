//! API Route Handlers

pub mod connections;
pub mod datasets;
pub mod export;
pub mod health;
pub mod validation;
