//! Data model shared by the loader and the query engine.

pub mod types;

pub use types::{Column, LaunchRecord, RecordIdentity, SUCCESS_LABEL, SuccessRule, UnknownColumn};
