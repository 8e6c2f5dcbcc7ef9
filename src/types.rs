use serde::{Deserialize, Serialize};

/// One snapshot of device telemetry, as handed to the pipeline by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct TelemetrySample {
    pub state_of_charge: f32,     // fraction in [0, 1]
    pub temperature_celsius: f32,
    pub current_amperes: f32,     // negative = discharging
    pub hour: u32,                // 0..=23
    pub minute: u32,              // 0..=59
}

/// Time of day as a point on the unit circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyclicalTimeEncoding {
    pub sine_component: f32,
    pub cosine_component: f32,
}

/// The five model inputs, already in the order the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub(crate) [f32; crate::features::FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub raw_minutes: f32,
    pub hours: u64,
    pub remaining_minutes: u32, // 0..=59
}
