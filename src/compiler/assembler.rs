use super::fragment::Fragment;
use crate::document::{
    END_EVENT_ID, Namespaces, START_EVENT_ID, cdata, escape_attribute, strip_empty_namespaces,
    validate_name,
};
use crate::error::{CompileError, SerializationError};
use ahash::AHashMap;
use itertools::Itertools;

const INDENT: &str = "  ";

#[derive(Debug, Clone)]
struct FlowRecord {
    id: String,
    source: String,
    target: String,
    condition: Option<String>,
}

#[derive(Debug, Clone)]
struct FragmentRecord {
    node_id: String,
    fragment: Fragment,
}

/// Accumulates typed records for one process and renders them in a single pass.
///
/// Nothing is written until [`DocumentBuilder::finish`], so the else-flow of a
/// node can be attached as its `default` attribute even though the flow is
/// registered after the node's fragment.
pub(super) struct DocumentBuilder<'n> {
    namespaces: &'n Namespaces,
    process_id: String,
    version: String,
    start_flow: FlowRecord,
    fragments: Vec<FragmentRecord>,
    flows: Vec<FlowRecord>,
    default_flows: AHashMap<String, String>,
    flow_counter: usize,
}

impl<'n> DocumentBuilder<'n> {
    pub(super) fn new(
        namespaces: &'n Namespaces,
        process_id: &str,
        version: &str,
        root: &str,
    ) -> Self {
        Self {
            namespaces,
            process_id: process_id.to_string(),
            version: version.to_string(),
            start_flow: FlowRecord {
                id: "flow_1".to_string(),
                source: START_EVENT_ID.to_string(),
                target: root.to_string(),
                condition: None,
            },
            fragments: Vec::new(),
            flows: Vec::new(),
            default_flows: AHashMap::new(),
            flow_counter: 1,
        }
    }

    pub(super) fn add_fragment(
        &mut self,
        node_id: &str,
        fragment: Fragment,
    ) -> Result<(), CompileError> {
        if let Some((name, _)) = fragment
            .attributes
            .iter()
            .find(|(name, _)| name == "id" || name == "default")
        {
            return Err(CompileError::InvalidFragment {
                node_id: node_id.to_string(),
                message: format!("attribute '{}' is managed by the compiler", name),
            });
        }
        self.fragments.push(FragmentRecord {
            node_id: node_id.to_string(),
            fragment,
        });
        Ok(())
    }

    /// Registers a sequence flow and returns its generated identifier.
    pub(super) fn add_flow(
        &mut self,
        source: &str,
        target: &str,
        condition: Option<&str>,
    ) -> String {
        self.flow_counter += 1;
        let id = format!("flow_{}", self.flow_counter);
        self.flows.push(FlowRecord {
            id: id.clone(),
            source: source.to_string(),
            target: target.to_string(),
            condition: condition.map(str::to_string),
        });
        id
    }

    /// Registers a flow into the end marker.
    pub(super) fn add_terminal_flow(&mut self, source: &str) -> String {
        self.add_flow(source, END_EVENT_ID, None)
    }

    /// Marks `flow_id` as the flow taken from `node_id` when no condition holds.
    pub(super) fn set_default_flow(&mut self, node_id: &str, flow_id: String) {
        self.default_flows.insert(node_id.to_string(), flow_id);
    }

    pub(super) fn finish(self) -> Result<String, SerializationError> {
        let ns = self.namespaces;
        validate_name(&ns.vendor_prefix)?;

        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(&format!(
            "<definitions xmlns=\"{}\" xmlns:{}=\"{}\"",
            escape_attribute("xmlns", &ns.process_uri)?,
            ns.vendor_prefix,
            escape_attribute("xmlns", &ns.vendor_uri)?,
        ));
        if let Some(target_namespace) = &ns.target_namespace {
            out.push_str(&format!(
                " targetNamespace=\"{}\"",
                escape_attribute("targetNamespace", target_namespace)?
            ));
        }
        out.push_str(">\n");
        out.push_str(&format!(
            "{}<process id=\"{}\" isExecutable=\"true\" version=\"{}\">\n",
            INDENT,
            escape_attribute("process id", &self.process_id)?,
            escape_attribute("process version", &self.version)?,
        ));

        let inner = INDENT.repeat(2);
        out.push_str(&format!("{}<startEvent id=\"{}\"/>\n", inner, START_EVENT_ID));
        render_flow(&mut out, &inner, &self.start_flow)?;

        for record in &self.fragments {
            let default_flow = self.default_flows.get(&record.node_id);
            render_fragment(&mut out, &inner, record, default_flow)?;
        }

        out.push_str(&format!("{}<endEvent id=\"{}\"/>\n", inner, END_EVENT_ID));
        for flow in &self.flows {
            render_flow(&mut out, &inner, flow)?;
        }

        out.push_str(INDENT);
        out.push_str("</process>\n");
        out.push_str("</definitions>\n");

        Ok(strip_empty_namespaces(out))
    }
}

fn render_fragment(
    out: &mut String,
    indent: &str,
    record: &FragmentRecord,
    default_flow: Option<&String>,
) -> Result<(), SerializationError> {
    let fragment = &record.fragment;
    validate_name(&fragment.tag)?;

    let mut attributes: Vec<(&str, &str)> = vec![("id", record.node_id.as_str())];
    if let Some(flow_id) = default_flow {
        attributes.push(("default", flow_id.as_str()));
    }
    attributes.extend(
        fragment
            .attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str())),
    );

    if let Some(attribute) = attributes.iter().map(|(name, _)| *name).duplicates().next() {
        return Err(SerializationError::DuplicateAttribute {
            element: record.node_id.clone(),
            attribute: attribute.to_string(),
        });
    }

    let rendered: Vec<String> = attributes
        .iter()
        .map(|(name, value)| -> Result<String, SerializationError> {
            validate_name(name)?;
            Ok(format!("{}=\"{}\"", name, escape_attribute(name, value)?))
        })
        .collect::<Result<_, _>>()?;

    out.push_str(&format!(
        "{}<{} {}",
        indent,
        fragment.tag,
        rendered.iter().join(" ")
    ));
    match &fragment.body {
        Some(body) => out.push_str(&format!(">{}</{}>\n", body, fragment.tag)),
        None => out.push_str("/>\n"),
    }
    Ok(())
}

fn render_flow(
    out: &mut String,
    indent: &str,
    flow: &FlowRecord,
) -> Result<(), SerializationError> {
    let head = format!(
        "{}<sequenceFlow id=\"{}\" sourceRef=\"{}\" targetRef=\"{}\"",
        indent,
        flow.id,
        escape_attribute(&flow.id, &flow.source)?,
        escape_attribute(&flow.id, &flow.target)?,
    );
    out.push_str(&head);

    match &flow.condition {
        Some(condition) => {
            out.push_str(">\n");
            out.push_str(&format!(
                "{}{}<conditionExpression>{}</conditionExpression>\n",
                indent,
                INDENT,
                cdata(&flow.id, condition)?
            ));
            out.push_str(&format!("{}</sequenceFlow>\n", indent));
        }
        None => out.push_str("/>\n"),
    }
    Ok(())
}
