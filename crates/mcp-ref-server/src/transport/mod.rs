//! Transport implementations: line-delimited STDIO and HTTP with
//! resumable SSE (spec.md §6).

pub mod http;
pub mod stdio;
