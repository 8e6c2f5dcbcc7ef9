use crate::decode::decode_minutes;
use crate::engine::Engine;
use crate::error::{PipelineError, Result};
use crate::features::{build_features, encode_time, FEATURE_ORDER};
use crate::model::ModelInvoker;
use crate::types::{PredictionResult, TelemetrySample};

/// Where a single run got to. Transitions are strictly forward; any error
/// jumps straight to `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Idle,
    FeaturesBuilt,
    Inferred,
    Decoded,
    Done,
    Failed(&'static str),
}

#[derive(Debug)]
pub struct PipelineRun {
    pub stage: Stage,
    pub outcome: Result<PredictionResult>,
}

/// Telemetry in, time-until-next-charge out. Holds nothing between calls
/// except the loaded model.
#[derive(Debug)]
pub struct Pipeline {
    invoker: ModelInvoker,
    log_features: bool,
}

impl Pipeline {
    pub fn new(engine: impl Engine + 'static) -> Result<Self> {
        Ok(Self::from_invoker(ModelInvoker::new(engine)?))
    }

    pub fn from_invoker(invoker: ModelInvoker) -> Self {
        Self {
            invoker,
            log_features: false,
        }
    }

    /// Log every feature vector at info level.
    pub fn with_feature_logging(mut self, on: bool) -> Self {
        self.log_features = on;
        self
    }

    pub fn invoker(&self) -> &ModelInvoker {
        &self.invoker
    }

    pub fn predict(&self, sample: &TelemetrySample) -> Result<PredictionResult> {
        self.run(sample).outcome
    }

    pub fn run(&self, sample: &TelemetrySample) -> PipelineRun {
        let mut stage = Stage::Idle;
        let outcome = self.advance(sample, &mut stage);
        match &outcome {
            Ok(_) => tracing::debug!("pipeline done"),
            Err(e) => {
                tracing::warn!(reached = ?stage, kind = e.kind(), "pipeline failed: {e}");
                stage = Stage::from(e);
            }
        }
        PipelineRun { stage, outcome }
    }

    fn advance(&self, sample: &TelemetrySample, stage: &mut Stage) -> Result<PredictionResult> {
        let time = encode_time(sample.hour, sample.minute);
        let features = build_features(sample, &time)?;
        *stage = Stage::FeaturesBuilt;
        if self.log_features {
            let named: Vec<String> = FEATURE_ORDER
                .iter()
                .zip(features.as_slice())
                .map(|(name, v)| format!("{name}={v:.3}"))
                .collect();
            tracing::info!("features [{}]", named.join(", "));
        }

        let raw = self.invoker.predict(&features)?;
        *stage = Stage::Inferred;
        tracing::debug!(raw_minutes = raw, "inferred");

        let result = decode_minutes(raw)?;
        *stage = Stage::Decoded;
        tracing::debug!(hours = result.hours, minutes = result.remaining_minutes, "decoded");

        *stage = Stage::Done;
        Ok(result)
    }
}

impl From<&PipelineError> for Stage {
    fn from(e: &PipelineError) -> Self {
        Stage::Failed(e.kind())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::StubEngine;

    fn sample() -> TelemetrySample {
        TelemetrySample {
            state_of_charge: 0.55,
            temperature_celsius: 28.0,
            current_amperes: -30.0,
            hour: 14,
            minute: 30,
        }
    }

    #[test]
    fn runs_to_done() {
        let pipeline = Pipeline::new(StubEngine::constant(95.4)).unwrap();
        let run = pipeline.run(&sample());
        assert_eq!(run.stage, Stage::Done);
        let r = run.outcome.unwrap();
        assert_eq!(r.raw_minutes, 95.4);
        assert_eq!((r.hours, r.remaining_minutes), (1, 35));
    }

    #[test]
    fn invalid_telemetry_never_reaches_the_model() {
        let stub = Arc::new(StubEngine::constant(95.4));
        let pipeline = Pipeline::new(stub.clone()).unwrap();
        let run = pipeline.run(&TelemetrySample {
            state_of_charge: 1.4,
            ..sample()
        });
        assert_eq!(run.stage, Stage::Failed("invalid_telemetry"));
        assert!(matches!(run.outcome, Err(PipelineError::InvalidTelemetry(_))));
        assert_eq!(stub.call_count(), 0);
    }

    #[test]
    fn decode_failures_surface_after_inference() {
        let stub = Arc::new(StubEngine::constant(-5.0));
        let pipeline = Pipeline::new(stub.clone()).unwrap();
        let run = pipeline.run(&sample());
        assert_eq!(run.stage, Stage::Failed("negative_output"));
        assert_eq!(stub.call_count(), 1);

        let pipeline = Pipeline::new(StubEngine::constant(f32::NAN)).unwrap();
        assert!(matches!(
            pipeline.predict(&sample()),
            Err(PipelineError::NonFiniteOutput(_))
        ));
    }

    #[test]
    fn engine_errors_are_not_retried() {
        let stub = Arc::new(StubEngine::failing("boom"));
        let pipeline = Pipeline::new(stub.clone()).unwrap().with_feature_logging(true);
        let err = pipeline.predict(&sample()).unwrap_err();
        assert_eq!(Stage::from(&err), Stage::Failed("inference_error"));
        assert_eq!(stub.call_count(), 1);
    }

    #[test]
    fn identical_inputs_give_identical_results() {
        let stub = Arc::new(StubEngine::constant(95.4));
        let pipeline = Pipeline::new(stub.clone()).unwrap();
        let a = pipeline.predict(&sample()).unwrap();
        let b = pipeline.predict(&sample()).unwrap();
        assert_eq!(a.raw_minutes.to_bits(), b.raw_minutes.to_bits());
        assert_eq!(a, b);

        let calls = stub.calls();
        assert_eq!(calls[0].input, calls[1].input);
    }
}
