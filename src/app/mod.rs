//! Usage: Host-facing layer (navigation seam, logging setup, client wiring).

pub mod auth_app;
pub mod logging;
pub mod navigation;
