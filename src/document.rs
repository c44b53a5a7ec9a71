//! Low-level helpers for the XML process document: namespaces, name
//! validation, escaping, and reading the process key back out of a
//! rendered document.

use crate::error::SerializationError;

/// Identifier of the single start marker in every process.
pub const START_EVENT_ID: &str = "startEvent";
/// Identifier of the single end marker in every process.
pub const END_EVENT_ID: &str = "endEvent";

const BPMN_MODEL_URI: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
const SMART_URI: &str = "http://smartengine.org/schema/process";
const FLOWABLE_URI: &str = "http://flowable.org/bpmn";
const FLOWABLE_TARGET_NAMESPACE: &str = "http://www.flowable.org/processdef";

/// The two namespaces declared on the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    /// Default namespace of every un-prefixed element.
    pub process_uri: String,
    /// Prefix used for engine-specific attributes (e.g. `smart`).
    pub vendor_prefix: String,
    pub vendor_uri: String,
    /// Written as `targetNamespace` on the root when set.
    pub target_namespace: Option<String>,
}

impl Default for Namespaces {
    /// The SmartEngine ingestion format.
    fn default() -> Self {
        Self {
            process_uri: BPMN_MODEL_URI.to_string(),
            vendor_prefix: "smart".to_string(),
            vendor_uri: SMART_URI.to_string(),
            target_namespace: None,
        }
    }
}

impl Namespaces {
    /// Namespaces for a Flowable engine.
    pub fn flowable() -> Self {
        Self {
            process_uri: BPMN_MODEL_URI.to_string(),
            vendor_prefix: "flowable".to_string(),
            vendor_uri: FLOWABLE_URI.to_string(),
            target_namespace: Some(FLOWABLE_TARGET_NAMESPACE.to_string()),
        }
    }

    /// Qualifies a local attribute name with the vendor prefix.
    pub fn vendor(&self, local_name: &str) -> String {
        format!("{}:{}", self.vendor_prefix, local_name)
    }
}

/// Checks that `name` can be used as an element or attribute name.
///
/// Accepts XML names with at most one `:` separating a prefix.
pub fn validate_name(name: &str) -> Result<(), SerializationError> {
    let invalid = || SerializationError::InvalidName(name.to_string());

    if name.matches(':').count() > 1 {
        return Err(invalid());
    }
    for part in name.split(':') {
        let mut chars = part.chars();
        match chars.next() {
            Some(c) if c.is_alphabetic() || c == '_' => {}
            _ => return Err(invalid()),
        }
        if !chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.')) {
            return Err(invalid());
        }
    }
    Ok(())
}

/// Characters allowed by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
        || ('\u{20}'..='\u{D7FF}').contains(&c)
        || ('\u{E000}'..='\u{FFFD}').contains(&c)
        || c >= '\u{10000}'
}

fn check_chars(context: &str, value: &str) -> Result<(), SerializationError> {
    match value.chars().find(|c| !is_xml_char(*c)) {
        Some(character) => Err(SerializationError::InvalidCharacter {
            context: context.to_string(),
            character,
        }),
        None => Ok(()),
    }
}

/// Escapes a value for use inside a double-quoted attribute.
pub fn escape_attribute(context: &str, value: &str) -> Result<String, SerializationError> {
    check_chars(context, value)?;
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            '\t' => out.push_str("&#x9;"),
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Escapes character data.
pub fn escape_text(context: &str, value: &str) -> Result<String, SerializationError> {
    check_chars(context, value)?;
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Wraps a condition expression in a CDATA section.
pub fn cdata(flow_id: &str, content: &str) -> Result<String, SerializationError> {
    check_chars(flow_id, content)?;
    if content.contains("]]>") {
        return Err(SerializationError::UnterminatedCdata {
            flow_id: flow_id.to_string(),
        });
    }
    Ok(format!("<![CDATA[{}]]>", content))
}

/// Removes empty default-namespace declarations from child elements.
///
/// Fragments produced by custom generators are often copied out of another
/// document by a namespace-unaware writer and arrive with `xmlns=""` on
/// every element; the declaration on the root already covers them.
pub fn strip_empty_namespaces(document: String) -> String {
    if document.contains(" xmlns=\"\"") {
        document.replace(" xmlns=\"\"", "")
    } else {
        document
    }
}

fn unescape(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#xA;", "\n")
        .replace("&#xD;", "\r")
        .replace("&#x9;", "\t")
        .replace("&amp;", "&")
}

/// Parses `name="value"` pairs out of the inside of a start tag.
fn parse_attributes(tag_body: &str) -> Vec<(&str, String)> {
    let mut attributes = Vec::new();
    let mut rest = tag_body;
    while let Some(eq) = rest.find("=\"") {
        let name = rest[..eq].trim();
        let value_start = eq + 2;
        let Some(value_len) = rest[value_start..].find('"') else {
            break;
        };
        attributes.push((name, unescape(&rest[value_start..value_start + value_len])));
        rest = &rest[value_start + value_len + 1..];
    }
    attributes
}

/// Reads the `(id, version)` key of the first `<process>` element in a document.
///
/// The key is the plain `id` and `version` attributes of the element.
pub fn process_key(document: &str) -> Option<(String, String)> {
    let mut search_from = 0;
    let tag_start = loop {
        let found = search_from + document[search_from..].find("<process")?;
        let after = found + "<process".len();
        match document[after..].chars().next() {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => break after,
            _ => search_from = after,
        }
    };
    let tag_end = tag_start + document[tag_start..].find('>')?;
    let attributes = parse_attributes(document[tag_start..tag_end].trim_end_matches('/'));

    let id = attributes
        .iter()
        .find(|(name, _)| *name == "id")
        .map(|(_, value)| value.clone())?;
    let version = attributes
        .iter()
        .find(|(name, _)| *name == "version")
        .map(|(_, value)| value.clone())?;
    Some((id, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("serviceTask").is_ok());
        assert!(validate_name("flowable:class").is_ok());
        assert!(validate_name("_node-1.a").is_ok());
        assert!(validate_name("1node").is_err());
        assert!(validate_name("a:b:c").is_err());
        assert!(validate_name("has space").is_err());
        assert!(validate_name("").is_err());
    }

    #[test]
    fn test_escape_attribute() {
        let escaped = escape_attribute("name", "a < b & \"c\"\n").unwrap();
        assert_eq!(escaped, "a &lt; b &amp; &quot;c&quot;&#xA;");
    }

    #[test]
    fn test_escape_rejects_control_characters() {
        let err = escape_text("name", "bad\u{1}value").unwrap_err();
        assert_eq!(
            err,
            SerializationError::InvalidCharacter {
                context: "name".to_string(),
                character: '\u{1}',
            }
        );
    }

    #[test]
    fn test_cdata_rejects_terminator() {
        assert_eq!(cdata("flow_1", "${a > b}").unwrap(), "<![CDATA[${a > b}]]>");
        assert!(matches!(
            cdata("flow_1", "x ]]> y"),
            Err(SerializationError::UnterminatedCdata { .. })
        ));
    }

    #[test]
    fn test_strip_empty_namespaces() {
        let doc = r#"<definitions xmlns="urn:x"><task xmlns="" id="a"/></definitions>"#;
        assert_eq!(
            strip_empty_namespaces(doc.to_string()),
            r#"<definitions xmlns="urn:x"><task id="a"/></definitions>"#
        );
    }

    #[test]
    fn test_process_key() {
        let doc = r#"<definitions><processing/><process id="wf-&amp;1" isExecutable="true" version="2.0.0"></process></definitions>"#;
        assert_eq!(
            process_key(doc),
            Some(("wf-&1".to_string(), "2.0.0".to_string()))
        );
        assert_eq!(process_key("<definitions/>"), None);

        // A prefixed attribute is an extension, not the process version.
        let prefixed = r#"<process id="wf" isExecutable="true" flowable:version="2.0.0">"#;
        assert_eq!(process_key(prefixed), None);
    }
}
