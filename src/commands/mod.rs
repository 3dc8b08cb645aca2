//! Usage: Operations invoked by views (login/register forms, protected-view gate, logout).

pub mod auth;
pub mod session;
