//! xml2json - XML documents as ordered JSON object trees
//!
//! # Quick Start
//!
//! ```
//! use xml2json::{convert_xml, Value};
//! # fn main() -> Result<(), xml2json::Error> {
//! let result = convert_xml("<list><item>a</item><item>b</item></list>", Some("US"))?;
//! let items = result
//!     .get("list")
//!     .and_then(Value::as_object)
//!     .and_then(|list| list.get("item"))
//!     .and_then(Value::as_array)
//!     .map(|items| items.len());
//! assert_eq!(items, Some(2));
//! assert!(result.contains_key("metadata"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod lexer;

pub mod value;
pub use value::{Array, Object, Value};

pub mod annotate;
pub use annotate::{COUNTRY_CODE_KEY, METADATA_KEY, annotate};

pub mod convert;
pub use convert::{
    ATTRIBUTES_KEY, ConvertOptions, convert_document, convert_element, convert_node, convert_xml,
    convert_xml_with_options, xml_to_json,
};

pub mod json;
pub use json::FormatConfig;

pub mod xml;
pub use xml::{
    Config as XmlConfig, Content as XmlContent, Document as XmlDocument, Element as XmlElement,
    Parser as XmlParser,
};

/// File name used when converted output is offered as a download
pub const DEFAULT_OUTPUT_FILE: &str = "converted-data.json";

/// Parse XML from string
pub fn from_xml_str(s: &str) -> Result<XmlDocument> {
    XmlParser::new(s.as_bytes()).parse()
}

/// Parse XML from bytes
pub fn from_xml_bytes(bytes: &[u8]) -> Result<XmlDocument> {
    XmlParser::new(bytes).parse()
}

/// Parse XML with custom limits
pub fn from_xml_str_with_config(s: &str, config: XmlConfig) -> Result<XmlDocument> {
    XmlParser::with_config(s.as_bytes(), config).parse()
}
