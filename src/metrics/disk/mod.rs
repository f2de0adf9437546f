pub mod collector;
pub mod types;
