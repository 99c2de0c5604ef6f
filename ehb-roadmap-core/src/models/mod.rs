//! Domain models for EHB Roadmap.
//!
//! # Core Concepts
//!
//! ## Roadmap Dataset
//!
//! - [`Module`]: A platform module (wallet, franchise management, e-learning, ...)
//!   with its ordered list of nested [`Feature`]s.
//! - [`TimelineEvent`]: A dated roadmap milestone, optionally linked to modules.
//! - [`Dataset`]: The full snapshot of modules and timeline events that search runs over.
//! - [`SearchableRecord`]: One module, feature or timeline event viewed through the
//!   fields search cares about.
//!
//! ## Agent State
//!
//! - [`Agent`], [`Message`], [`AgentTask`]: The entities held by the reducer-driven
//!   store in [`crate::store`].

mod agent;
mod dataset;
mod module;
mod record;
mod status;
mod timeline;

pub use agent::*;
pub use dataset::*;
pub use module::*;
pub use record::*;
pub use status::*;
pub use timeline::*;
