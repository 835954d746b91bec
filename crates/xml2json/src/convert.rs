//! XML tree to object tree conversion
//!
//! Rules applied to every element:
//! - attributes are collected under [`ATTRIBUTES_KEY`]
//! - a child text node that is non-empty after trimming replaces the whole
//!   element with that string, discarding attributes and sibling elements
//! - whitespace-only text contributes nothing
//! - the first child with a given tag name is stored bare; a second one
//!   promotes the entry to an array in document order
//!
//! The leaf-text rule drops element children of mixed-content elements. That
//! output shape is relied on by consumers and is kept as is.

use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::{debug, instrument, warn};

use crate::annotate::annotate;
use crate::error::Result;
use crate::json::{self, FormatConfig};
use crate::value::{Object, Value};
use crate::xml::model::{Content, Document, Element};
use crate::xml::parser::{Config as XmlConfig, Parser as XmlParser};

/// Key holding an element's attribute map
pub const ATTRIBUTES_KEY: &str = "@attributes";

/// Options for the parse, convert and annotate pipeline
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConvertOptions {
    pub xml: XmlConfig,
    /// Region code merged into `metadata.countryCode`
    pub region: Option<String>,
}

impl ConvertOptions {
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_xml_config(mut self, xml: XmlConfig) -> Self {
        self.xml = xml;
        self
    }
}

/// Accumulator for one key while an element is being converted
#[derive(Debug)]
enum Slot {
    Single(Value),
    Many(Vec<Value>),
}

impl Slot {
    fn push(&mut self, value: Value) {
        match self {
            Self::Many(items) => items.push(value),
            Self::Single(first) => {
                let first = std::mem::take(first);
                *self = Self::Many(vec![first, value]);
            }
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Single(value) => value,
            Self::Many(items) => Value::from(items),
        }
    }
}

/// Convert any node: text yields its trimmed content, elements are converted
/// with [`convert_element`]
pub fn convert_node(node: &Content) -> Value {
    match node {
        Content::Text(text) => Value::String(text.trim().to_string()),
        Content::Element(element) => convert_element(element),
    }
}

/// Convert a single element into a string (leaf text) or an object
pub fn convert_element(element: &Element) -> Value {
    let mut slots: IndexMap<String, Slot> = IndexMap::new();

    if !element.attributes.is_empty() {
        let attrs: Object = element
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();
        slots.insert(ATTRIBUTES_KEY.to_string(), Slot::Single(Value::Object(attrs)));
    }

    for child in &element.children {
        match child {
            Content::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Value::String(trimmed.to_string());
                }
            }
            Content::Element(child) => {
                let value = convert_element(child);
                match slots.entry(child.name.clone()) {
                    Entry::Vacant(entry) => {
                        entry.insert(Slot::Single(value));
                    }
                    // A child literally named "@attributes" lands here too and
                    // is aggregated after the attribute map.
                    Entry::Occupied(mut entry) => entry.get_mut().push(value),
                }
            }
        }
    }

    Value::Object(
        slots
            .into_iter()
            .map(|(key, slot)| (key, slot.into_value()))
            .collect(),
    )
}

/// Convert a whole document, keyed by the root element's name
pub fn convert_document(doc: &Document) -> Object {
    let mut root = Object::with_capacity(1);
    root.insert(doc.root.name.clone(), convert_element(&doc.root));
    root
}

/// Parse markup and convert it, optionally annotating with a region code
pub fn convert_xml(input: &str, region: Option<&str>) -> Result<Object> {
    let options = ConvertOptions {
        region: region.map(str::to_string),
        ..ConvertOptions::default()
    };
    convert_xml_with_options(input, &options)
}

/// Parse markup and convert it using explicit options
#[instrument(skip_all, fields(len = input.len(), region = options.region.as_deref()))]
pub fn convert_xml_with_options(input: &str, options: &ConvertOptions) -> Result<Object> {
    let doc = XmlParser::with_config(input.as_bytes(), options.xml)
        .parse()
        .inspect_err(|err| warn!(%err, "xml parse failed"))?;
    debug!(root = %doc.root.name, "parsed xml document");

    let converted = convert_document(&doc);
    Ok(match options.region.as_deref() {
        Some(region) => annotate(&converted, Some(region)),
        None => converted,
    })
}

/// Parse, convert and serialize to JSON text in one step
pub fn xml_to_json(input: &str, options: &ConvertOptions, format: &FormatConfig) -> Result<String> {
    let object = convert_xml_with_options(input, options)?;
    let text = json::to_string(&Value::Object(object), format);
    debug!(bytes = text.len(), "serialized json");
    Ok(text)
}
