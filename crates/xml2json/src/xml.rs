//! XML node model and parser

pub mod model;
pub mod parser;

pub use model::{Content, Document, Element};
pub use parser::{Config, Parser};
