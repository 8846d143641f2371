pub mod client;
pub mod forms;
pub mod handlers;
pub mod session;
