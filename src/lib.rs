//! Time-until-next-charge prediction from a single telemetry snapshot.
//!
//! ```text
//! TelemetrySample -> encode_time + build_features -> ModelInvoker -> decode_minutes
//! ```

pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod server;
#[cfg(feature = "torch")]
pub mod torch;
pub mod types;

pub use engine::{Engine, ModelArtifact, ModelDescriptor, StubEngine, Tensor};
pub use error::PipelineError;
pub use pipeline::{Pipeline, PipelineRun, Stage};
pub use report::{HealthStatus, Report};
pub use types::{CyclicalTimeEncoding, FeatureVector, PredictionResult, TelemetrySample};
