#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for retry operations.
pub const TRACING_TARGET_RETRY: &str = "beacon_core::retry";

mod context;
mod environment;
mod error;

pub mod retry;

pub use context::ErrorContext;
pub use environment::Environment;
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use retry::{Classify, RetryPolicy, retry};
