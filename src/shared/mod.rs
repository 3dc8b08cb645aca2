pub mod error;
pub(crate) mod mutex_ext;
pub(crate) mod security;
pub mod single_flight;
