use crate::canvas::FlowNode;
use crate::document::{Namespaces, escape_text};
use crate::error::CompileError;
use ahash::AHashMap;

/// The element a node contributes to the process document.
///
/// The renderer always writes the node's identifier as the element `id`,
/// so generators only describe the tag, the remaining attributes and an
/// optional pre-rendered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    /// Raw inner XML, inserted as-is between the start and end tag.
    pub body: Option<String>,
}

impl Fragment {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            body: None,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Defines how a specific node `kind` is rendered into a [`Fragment`].
pub trait FragmentGenerator: Send + Sync {
    fn node_kind(&self) -> &str;
    fn generate(&self, node: &FlowNode, namespaces: &Namespaces)
    -> Result<Fragment, CompileError>;
}

/// Shared rendering for the built-in activities.
///
/// `standard_keys` are BPMN attributes written without a prefix; every
/// other property becomes a vendor-prefixed attribute.
fn activity_fragment(
    tag: &str,
    node: &FlowNode,
    namespaces: &Namespaces,
    standard_keys: &[&str],
    skip_keys: &[&str],
) -> Fragment {
    let mut fragment = Fragment::new(tag);
    if let Some(name) = &node.name {
        fragment = fragment.with_attribute("name", name);
    }
    for (key, value) in &node.properties {
        if skip_keys.contains(&key.as_str()) {
            continue;
        }
        let attribute = if standard_keys.contains(&key.as_str()) {
            key.clone()
        } else {
            namespaces.vendor(key)
        };
        fragment = fragment.with_attribute(attribute, value);
    }
    fragment
}

/// Script tasks carry their source in a `<script>` child rather than an attribute.
struct ScriptTaskGenerator;

impl FragmentGenerator for ScriptTaskGenerator {
    fn node_kind(&self) -> &str {
        "scriptTask"
    }

    fn generate(
        &self,
        node: &FlowNode,
        namespaces: &Namespaces,
    ) -> Result<Fragment, CompileError> {
        let script = node
            .properties
            .get("script")
            .ok_or_else(|| CompileError::InvalidFragment {
                node_id: node.id.clone(),
                message: "scriptTask requires a 'script' property".to_string(),
            })?;
        let fragment = activity_fragment(
            "scriptTask",
            node,
            namespaces,
            &["scriptFormat"],
            &["script"],
        );
        let script = escape_text(&node.id, script)?;
        Ok(fragment.with_body(format!("<script>{}</script>", script)))
    }
}

/// Defines the standard activity generators, their registration, and their creation by name.
macro_rules! define_fragment_generators {
    ( $( ($struct_name:ident, $kind:expr, [$($standard:expr),*]) ),* $(,)? ) => {
        $(
            struct $struct_name;
            impl FragmentGenerator for $struct_name {
                fn node_kind(&self) -> &str { $kind }
                fn generate(&self, node: &FlowNode, namespaces: &Namespaces) -> Result<Fragment, CompileError> {
                    Ok(activity_fragment($kind, node, namespaces, &[$($standard),*], &[]))
                }
            }
        )*

        pub(super) fn register_default_generators(registry: &mut AHashMap<String, Box<dyn FragmentGenerator>>) {
            $( registry.insert($kind.to_string(), Box::new($struct_name)); )*
            registry.insert("scriptTask".to_string(), Box::new(ScriptTaskGenerator));
        }

        pub(super) fn create_generator_by_kind(kind: &str) -> Option<Box<dyn FragmentGenerator>> {
            match kind {
                $( $kind => Some(Box::new($struct_name)), )*
                "scriptTask" => Some(Box::new(ScriptTaskGenerator)),
                _ => None,
            }
        }
    };
}

define_fragment_generators! {
    (TaskGenerator, "task", []),
    (ServiceTaskGenerator, "serviceTask", ["implementation"]),
    (UserTaskGenerator, "userTask", ["implementation"]),
    (ManualTaskGenerator, "manualTask", []),
    (ReceiveTaskGenerator, "receiveTask", ["messageRef"]),
    (CallActivityGenerator, "callActivity", ["calledElement"]),
}
