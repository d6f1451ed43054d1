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

//! Gemini models on Google Cloud Vertex AI.

mod credentials;
mod error;
mod types;
mod vertex;

pub use credentials::ServiceAccountKey;
pub use error::SetupError;
pub use vertex::VertexProvider;
