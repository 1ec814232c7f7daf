pub mod endpoint;
pub mod interface;
