//! Structured body model and parsers.
//!
//! # Responsibilities
//! - Owned element/text tree independent of any parser
//! - Build the tree from XML (roxmltree) or JSON (serde_json)
//!
//! # Design Decisions
//! - Namespace declarations are not attributes
//! - DTDs are rejected by the XML parser
//! - JSON maps onto elements: `jsonObject` root, one element per member,
//!   `jsonElement` children for array items
//! - Every JSON element carries a `type` attribute so that `"1"`, `1`, `[1]`
//!   and `[]` stay distinct; strings are marked `xml:space="preserve"`
//! - JSON nesting is bounded by the same `max_depth` as XML
//! - No normalization happens here; canonicalization belongs to the digest

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Errors raised while turning a raw payload into a [`Document`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("body is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document nesting exceeds {0} levels")]
    TooDeep(usize),
}

/// Qualified name: optional namespace URI plus local part.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    pub fn namespaced(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// `namespace:local` when namespaced, otherwise `local`.
    pub fn expanded(&self) -> String {
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => format!("{}:{}", ns, self.local),
            _ => self.local.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::Text(text.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: Option<String>,
    },
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

/// A parsed request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parse an XML document; elements nested deeper than `max_depth` are rejected.
    pub fn parse_xml(text: &str, max_depth: usize) -> Result<Self, ParseError> {
        let doc = roxmltree::Document::parse(text)?;
        let root = convert_element(doc.root_element(), 1, max_depth)?;
        Ok(Self { root })
    }

    /// Parse a JSON payload and map it onto the element tree.
    ///
    /// The mapped tree may be at most `max_depth` elements deep. serde_json's
    /// own recursion limit is replaced by that bound.
    pub fn parse_json(text: &str, max_depth: usize) -> Result<Self, ParseError> {
        if json_nesting(text) > max_depth {
            return Err(ParseError::TooDeep(max_depth));
        }
        let mut de = serde_json::Deserializer::from_str(text);
        de.disable_recursion_limit();
        let value = Value::deserialize(&mut de)?;
        de.end()?;
        Self::from_json(&value, max_depth)
    }

    /// Map a JSON value onto the element tree.
    pub fn from_json(value: &Value, max_depth: usize) -> Result<Self, ParseError> {
        let root_name = match value {
            Value::Object(_) => "jsonObject",
            Value::Array(_) => "jsonArray",
            _ => "jsonValue",
        };
        Ok(Self {
            root: json_element(root_name, value, 1, max_depth)?,
        })
    }
}

fn convert_element(
    node: roxmltree::Node<'_, '_>,
    depth: usize,
    max_depth: usize,
) -> Result<Element, ParseError> {
    if depth > max_depth {
        return Err(ParseError::TooDeep(max_depth));
    }

    let tag = node.tag_name();
    let name = QName {
        namespace: tag.namespace().map(str::to_string),
        local: tag.name().to_string(),
    };

    let attributes = node
        .attributes()
        .map(|a| Attribute {
            name: QName {
                namespace: a.namespace().map(str::to_string),
                local: a.name().to_string(),
            },
            value: a.value().to_string(),
        })
        .collect();

    let mut children = Vec::new();
    for child in node.children() {
        if child.is_element() {
            children.push(Node::Element(convert_element(child, depth + 1, max_depth)?));
        } else if child.is_text() {
            children.push(Node::Text(child.text().unwrap_or_default().to_string()));
        } else if child.is_comment() {
            children.push(Node::Comment(child.text().unwrap_or_default().to_string()));
        } else if let Some(pi) = child.pi() {
            children.push(Node::ProcessingInstruction {
                target: pi.target.to_string(),
                data: pi.value.map(str::to_string),
            });
        }
    }

    Ok(Element {
        name,
        attributes,
        children,
    })
}

fn json_element(
    name: &str,
    value: &Value,
    depth: usize,
    max_depth: usize,
) -> Result<Element, ParseError> {
    if depth > max_depth {
        return Err(ParseError::TooDeep(max_depth));
    }

    let mut el = Element::new(QName::new(name)).with_attribute(QName::new("type"), json_type(value));
    match value {
        Value::Object(map) => {
            let mut members: Vec<_> = map.iter().collect();
            members.sort_by(|a, b| a.0.cmp(b.0));
            for (key, member) in members {
                el.children
                    .push(Node::Element(json_element(key, member, depth + 1, max_depth)?));
            }
        }
        Value::Array(items) => {
            for item in items {
                el.children.push(Node::Element(json_element(
                    "jsonElement",
                    item,
                    depth + 1,
                    max_depth,
                )?));
            }
        }
        Value::Null => {}
        Value::String(s) => {
            el = el.with_attribute(QName::namespaced(XML_NAMESPACE, "space"), "preserve");
            if !s.is_empty() {
                el.children.push(Node::Text(s.clone()));
            }
        }
        Value::Bool(_) | Value::Number(_) => el.children.push(Node::Text(value.to_string())),
    }
    Ok(el)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}

/// Deepest `{`/`[` nesting of a JSON text, ignoring brackets inside strings.
///
/// Each container becomes one element, so this never exceeds the depth of
/// the mapped tree.
fn json_nesting(text: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for b in text.bytes() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}
