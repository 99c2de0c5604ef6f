//! EHB Roadmap: fuzzy roadmap search and agent state behind an HTTP API,
//! an MCP server and the `ehbr` CLI.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod mcp;

pub use ehb_roadmap_core::{models, search, seed, store};
