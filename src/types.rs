//! Plan and metadata value types exchanged with the host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A change to a single attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// The path to the attribute that changed.
    pub path: String,
    /// The value before the change (None if creating).
    pub before: Option<Value>,
    /// The value after the change (None if deleting).
    pub after: Option<Value>,
}

impl AttributeChange {
    fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// Create a change for a new attribute.
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// Create a change for a removed attribute.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// Create a change for a modified attribute.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self::new(path, Some(before), Some(after))
    }

    /// Compare the top-level attributes of two state objects.
    ///
    /// `null` and absent are treated alike. Non-object inputs count as empty,
    /// so diffing against `Value::Null` lists every attribute as added or
    /// removed. Changes are ordered by path.
    pub fn diff(before: &Value, after: &Value) -> Vec<AttributeChange> {
        let empty = Map::new();
        let before = before.as_object().unwrap_or(&empty);
        let after = after.as_object().unwrap_or(&empty);

        let mut paths: Vec<&String> = before.keys().chain(after.keys()).collect();
        paths.sort();
        paths.dedup();

        paths
            .into_iter()
            .filter_map(|path| {
                let old = before.get(path).filter(|v| !v.is_null());
                let new = after.get(path).filter(|v| !v.is_null());
                match (old, new) {
                    (None, None) => None,
                    (None, Some(b)) => Some(AttributeChange::added(path.clone(), b.clone())),
                    (Some(a), None) => Some(AttributeChange::removed(path.clone(), a.clone())),
                    (Some(a), Some(b)) if a == b => None,
                    (Some(a), Some(b)) => {
                        Some(AttributeChange::modified(path.clone(), a.clone(), b.clone()))
                    }
                }
            })
            .collect()
    }
}

/// The result of a plan operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The planned state after the operation.
    pub planned_state: Value,
    /// The list of attribute changes.
    pub changes: Vec<AttributeChange>,
    /// Whether the resource requires replacement.
    pub requires_replace: bool,
}

impl PlanResult {
    /// Create a plan result with no changes.
    pub fn no_change(state: Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    /// Create a plan result with changes.
    pub fn with_changes(
        planned_state: Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }
}

/// Provider metadata derived from the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// The provider's type name, the prefix of every resource type.
    pub type_name: String,
    /// The provider's version.
    pub version: String,
    /// List of resource type names.
    pub resources: Vec<String>,
}
