pub mod cache;
pub mod handlers;
pub mod service;
pub mod subjects;
pub mod synthesizer;
pub mod videos;
