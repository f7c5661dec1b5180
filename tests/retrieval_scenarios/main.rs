//! End-to-end retrieval scenarios
//!
//! Drives the full stack through the `cyberrag` facade: corpus ingestion,
//! lexical and hybrid retrieval, reranking, persistence and configuration.

mod common;
mod config_files;
mod end_to_end;
mod properties;
mod reranked_pipeline;
