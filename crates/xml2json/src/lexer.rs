//! Low-level input navigation shared by the markup parser

pub mod cursor;

pub use cursor::Cursor;
