pub mod normalize;
pub mod user;
