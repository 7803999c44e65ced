pub mod config;
pub mod flow;
pub mod platform;
pub mod protocol;
