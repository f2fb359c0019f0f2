//! Shared utilities: slug normalization, storage paths and JSON file I/O.

pub mod file_handler;
pub mod paths;
pub mod string_utils;

pub use file_handler::FileHandler;
pub use string_utils::{slugify, MAX_AGENT_ID_LENGTH, MAX_TOOL_NAME_LENGTH};
