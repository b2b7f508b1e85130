#![doc = "repo-corpus-core: core logic library for repo-corpus."]

//! This crate contains all open-source logic, data models and pipelines for repo-corpus:
//! discovering a user's repositories, crawling each repository tree through the host
//! contents API, extracting text and aggregating it into one corpus per repository.
//! Transport clients (GitHub, chat-completions) live in the CLI crate.
//!
//! # Usage
//! Add this as a dependency for all shared crawling, extraction and aggregation code.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod contract;
pub mod corpus;
pub mod discovery;
pub mod extract;
pub mod retry;
pub mod walk;
