//! Shared helpers for HTTP clients, path handling, file classification, and text slicing.

pub mod classify;
pub mod http;
pub mod paths;
pub mod text;

pub use classify::{has_allowed_extension, is_lock_file};
pub use http::{http_client, truncate_body};
pub use paths::normalize_path;
pub use text::{char_len, split_at_char, truncate_chars};
