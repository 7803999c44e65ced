pub mod audit;
pub mod http;
pub mod poller;
pub mod purpose;
pub mod session;
pub mod source;
