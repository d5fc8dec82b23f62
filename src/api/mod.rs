//! API Module
//!
//! Operational HTTP surface for the maintenance jobs.
//!
//! # Endpoints
//! - `GET /health` - Liveness check
//! - `GET /stats` - Last-pass snapshots of all three jobs
//! - `POST /run/:job` - Run one job's pass now, outside its schedule

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
