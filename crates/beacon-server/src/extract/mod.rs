//! Request extractors whose rejections render as structured error bodies.

mod client_info;
mod json;
mod query;
mod validated_json;

pub use client_info::{ClientInfo, UNKNOWN_IP};
pub use json::Json;
pub use query::Query;
pub use validated_json::ValidateJson;
