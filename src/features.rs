use std::f64::consts::PI;

use crate::error::{PipelineError, Result};
use crate::types::{CyclicalTimeEncoding, FeatureVector, TelemetrySample};

/// Feature names in the exact order the model consumes them.
pub const FEATURE_ORDER: [&str; 5] = [
    "Battery_Level",
    "Battery_Temperature",
    "Time_sin",
    "Time_cos",
    "Battery_Current",
];

pub const FEATURE_COUNT: usize = 5;

const _: () = assert!(FEATURE_ORDER.len() == FEATURE_COUNT);

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Encode a wall-clock time as (sin, cos) of the fraction of the day elapsed,
/// so that 23:59 and 00:00 land next to each other.
pub fn encode_time(hour: u32, minute: u32) -> CyclicalTimeEncoding {
    let total_minutes_from_midnight = f64::from(hour) * 60.0 + f64::from(minute);
    let angle = 2.0 * PI * total_minutes_from_midnight / MINUTES_PER_DAY;
    CyclicalTimeEncoding {
        sine_component: angle.sin() as f32,
        cosine_component: angle.cos() as f32,
    }
}

pub fn build_features(
    sample: &TelemetrySample,
    time: &CyclicalTimeEncoding,
) -> Result<FeatureVector> {
    if !(0.0..=1.0).contains(&sample.state_of_charge) {
        return Err(PipelineError::InvalidTelemetry(format!(
            "state_of_charge {} outside [0, 1]",
            sample.state_of_charge
        )));
    }
    if sample.hour > 23 {
        return Err(PipelineError::InvalidTelemetry(format!(
            "hour {} outside 0..=23",
            sample.hour
        )));
    }
    if sample.minute > 59 {
        return Err(PipelineError::InvalidTelemetry(format!(
            "minute {} outside 0..=59",
            sample.minute
        )));
    }

    // Must line up with FEATURE_ORDER.
    Ok(FeatureVector([
        sample.state_of_charge,
        sample.temperature_celsius,
        time.sine_component,
        time.cosine_component,
        sample.current_amperes,
    ]))
}
