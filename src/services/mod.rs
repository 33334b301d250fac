// src/services/mod.rs
pub mod extractor;
pub mod image_processor;
pub mod orchestrator;
pub mod poller;
pub mod providers;

pub use orchestrator::Orchestrator;
