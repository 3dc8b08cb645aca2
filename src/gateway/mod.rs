//! Usage: Backend plumbing: endpoint table, credential transport, OAuth exchange.

pub(crate) mod credentials;
pub mod endpoints;
pub mod oauth;
pub mod transport;
