//! Models Module
//!
//! Response DTOs for the operational API.

mod responses;

pub use responses::{HealthResponse, RunResponse, StatsResponse};
