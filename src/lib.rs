//! Content-safety pipeline for untrusted MDX and Markdown.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
