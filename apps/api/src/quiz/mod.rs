pub mod catalog;
pub mod enrichment;
pub mod handlers;
pub mod history;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod sessions;
pub mod validation;
pub mod wizard;
