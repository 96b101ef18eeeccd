//! Validation modules

pub mod file;

pub use file::{parse_allowed_mime, parse_max_bytes, validate_file};
