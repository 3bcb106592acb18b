//! GridPlan template synthesis.
//!
//! Renders an assembled `TopologyGraph` into the provider-template form:
//! resources keyed by logical ID, each with a type and a property bag.
//! Rendering is deterministic — the same graph always serializes to the
//! same bytes — so templates can be diffed meaningfully.
//!
//! # Components
//!
//! - **`template`** — `Template`/`Resource` and graph rendering
//! - **`diff`** — structural comparison of two templates

pub mod diff;
pub mod template;

pub use diff::{TemplateDiff, diff_templates};
pub use template::{Resource, Template, render};
