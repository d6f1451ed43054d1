#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Host services exposed by the integration.

mod error;
mod generate_content;
mod registry;

pub use error::ServiceError;
pub use generate_content::{
    GenerateContentData, GenerateContentReply, GenerateContentService, SERVICE_GENERATE_CONTENT,
    TEXT_MODEL, VISION_MODEL,
};
pub use registry::{ServiceHandler, ServiceRegistry};
