//! # trigdeps-core
//!
//! The dependency list engine for trigger forms - THE LOGIC.
//!
//! A trigger form shows an ordered list of the triggers it depends on. A
//! selection popup sends back batches of candidates; this crate merges them
//! into the list without ever listing the same trigger twice, and builds the
//! edit link of every row it appends.
//!
//! ## Architectural Constraints
//!
//! - Synchronous: every operation completes or fails immediately
//! - Stateless engine: `DependencyMerger` owns no list; callers pass it in
//! - No async, no network, no logging (the app layer logs outcomes)

// =============================================================================
// MODULES
// =============================================================================

pub mod formats;
pub mod links;
pub mod list;
pub mod merger;
pub mod primitives;
pub mod render;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use types::{Batch, Dependency, Descriptor, FormField, TrigDepsError, TriggerId, Variant};

pub use formats::{list_from_bytes, list_from_json, list_to_bytes, list_to_json};
pub use links::LinkTemplates;
pub use list::{DependencyList, SerializableList};
pub use merger::{DependencyMerger, MalformedPolicy, MergeOutcome};
pub use render::{HtmlRowRenderer, RenderedRow, RowRenderer};
