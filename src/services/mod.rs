// src/services/mod.rs

pub mod normalizer;
pub mod result_store;
pub mod scoring;
pub mod submission;

pub use result_store::ResultStore;
pub use submission::SubmissionService;
