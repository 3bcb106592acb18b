//! Structural diff between two synthesized templates.
//!
//! Compares resources by logical ID. This diffs desired state against
//! previously-synthesized desired state; reconciling against live
//! infrastructure is the provisioner's job.

use serde::{Deserialize, Serialize};

use crate::template::Template;

/// Differences between an old and a new template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDiff {
    /// Logical IDs present only in the new template.
    pub added: Vec<String>,
    /// Logical IDs present only in the old template.
    pub removed: Vec<String>,
    /// Logical IDs whose type or properties changed.
    pub changed: Vec<String>,
}

impl TemplateDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Compare two templates resource-by-resource.
///
/// Output ID lists are sorted (inherited from the template's BTreeMap
/// ordering), so the diff itself is deterministic.
pub fn diff_templates(old: &Template, new: &Template) -> TemplateDiff {
    let mut diff = TemplateDiff::default();

    for (id, resource) in &new.resources {
        match old.resources.get(id) {
            None => diff.added.push(id.clone()),
            Some(previous) if previous != resource => diff.changed.push(id.clone()),
            Some(_) => {}
        }
    }
    for id in old.resources.keys() {
        if !new.resources.contains_key(id) {
            diff.removed.push(id.clone());
        }
    }

    diff
}

impl std::fmt::Display for TemplateDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return writeln!(f, "no changes");
        }
        for id in &self.added {
            writeln!(f, "+ {id}")?;
        }
        for id in &self.removed {
            writeln!(f, "- {id}")?;
        }
        for id in &self.changed {
            writeln!(f, "~ {id}")?;
        }
        Ok(())
    }
}
