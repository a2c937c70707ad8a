//! Local persistence for the ledger, model cache and prompt overrides

pub mod json_file;

pub use json_file::{read_json, write_json_atomic};
