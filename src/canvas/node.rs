use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An edge annotation: an opaque condition expression and the node it leads to.
///
/// The expression is never evaluated here; it is carried into the process
/// definition verbatim and interpreted by the execution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalContainer {
    pub condition: String,
    pub target: String,
}

impl ConditionalContainer {
    pub fn new(condition: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            target: target.into(),
        }
    }
}

/// A single workflow step.
///
/// Successors are referenced by identifier, so a node never owns its
/// neighbours and cyclic graphs need no shared ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    /// Selects the fragment generator used to render this node (e.g. `serviceTask`).
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub conditions: Vec<ConditionalContainer>,
    #[serde(default)]
    pub else_target: Option<String>,
}

/// The outgoing transitions of a node once conditional precedence is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Successors<'a> {
    /// Conditional branches plus an optional fallback.
    Branches {
        conditions: &'a [ConditionalContainer],
        else_target: Option<&'a str>,
    },
    /// A single unconditional successor.
    Next(&'a str),
    /// Nothing follows; the node flows into the end marker.
    Terminal,
}

impl FlowNode {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: None,
            properties: BTreeMap::new(),
            next: None,
            conditions: Vec::new(),
            else_target: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_next(mut self, target: impl Into<String>) -> Self {
        self.next = Some(target.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>, target: impl Into<String>) -> Self {
        self.conditions
            .push(ConditionalContainer::new(condition, target));
        self
    }

    pub fn with_else(mut self, target: impl Into<String>) -> Self {
        self.else_target = Some(target.into());
        self
    }

    /// Resolves which links of this node are live.
    ///
    /// A non-empty condition list wins over `next`, and `else_target` only
    /// counts when there is at least one condition.
    pub fn successors(&self) -> Successors<'_> {
        if !self.conditions.is_empty() {
            Successors::Branches {
                conditions: &self.conditions,
                else_target: self.else_target.as_deref(),
            }
        } else if let Some(next) = &self.next {
            Successors::Next(next)
        } else {
            Successors::Terminal
        }
    }
}
