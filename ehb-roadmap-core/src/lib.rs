//! Core of EHB Roadmap: the roadmap models, fuzzy search over them and the
//! agent state store. Nothing in this crate performs I/O.

pub mod models;
pub mod search;
pub mod seed;
pub mod store;
