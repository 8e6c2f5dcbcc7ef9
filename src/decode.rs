use crate::error::{PipelineError, Result};
use crate::types::PredictionResult;

/// Turn the model's raw minutes into whole hours and minutes.
///
/// The model is untrusted: non-finite and negative values are errors, never
/// clamped. Large values are accepted as-is.
pub fn decode_minutes(raw_minutes: f32) -> Result<PredictionResult> {
    if !raw_minutes.is_finite() {
        return Err(PipelineError::NonFiniteOutput(raw_minutes));
    }
    if raw_minutes < 0.0 {
        return Err(PipelineError::NegativeOutput(raw_minutes));
    }

    // f32::round is half-away-from-zero; the cast saturates on absurd values.
    let total_minutes = raw_minutes.round() as u64;
    Ok(PredictionResult {
        raw_minutes,
        hours: total_minutes / 60,
        remaining_minutes: (total_minutes % 60) as u32,
    })
}
