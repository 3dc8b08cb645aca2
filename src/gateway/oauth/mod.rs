//! Usage: GitHub OAuth web flow helpers (authorize URL, callback parsing, code exchange).

pub mod authorize_url;
pub mod callback;
pub mod exchange_flow;
