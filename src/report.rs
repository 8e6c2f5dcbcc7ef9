use std::fmt;

use serde::Serialize;

use crate::types::{PredictionResult, TelemetrySample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Excellent,
    Good,
    AttentionRequired,
    Critical,
    NotConnected,
}

impl HealthStatus {
    /// Bucket a charge level (whole percent, truncated).
    pub fn from_state_of_charge(state_of_charge: f32) -> Self {
        let level = (state_of_charge * 100.0) as i32;
        match level {
            80..=100 => HealthStatus::Excellent,
            50..=79 => HealthStatus::Good,
            20..=49 => HealthStatus::AttentionRequired,
            1..=19 => HealthStatus::Critical,
            _ => HealthStatus::NotConnected,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Excellent => "Excellent",
            HealthStatus::Good => "Good",
            HealthStatus::AttentionRequired => "Attention Required",
            HealthStatus::Critical => "Critical",
            HealthStatus::NotConnected => "Not Connected",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Console readout of one prediction and the conditions it was made under.
pub struct Report<'a> {
    pub sample: &'a TelemetrySample,
    pub prediction: &'a PredictionResult,
}

impl<'a> Report<'a> {
    pub fn new(sample: &'a TelemetrySample, prediction: &'a PredictionResult) -> Self {
        Self { sample, prediction }
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus::from_state_of_charge(self.sample.state_of_charge)
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.sample;
        let p = self.prediction;
        writeln!(f, "--- Battery Charge Prediction ---")?;
        writeln!(f, "Based on the following conditions:")?;
        writeln!(f, "  - Battery Level: {}%", (s.state_of_charge * 100.0) as i32)?;
        writeln!(f, "  - Battery Temperature: {}°C", s.temperature_celsius)?;
        writeln!(f, "  - Current Time: {:02}:{:02}", s.hour, s.minute)?;
        writeln!(
            f,
            "  - Battery Current: {} Amperes (negative means discharging)",
            s.current_amperes
        )?;
        writeln!(f, "  - Battery Status: {}", self.health())?;
        writeln!(f)?;
        write!(f, "Predicted Time to Next Charge: ")?;
        if p.hours > 0 {
            write!(f, "{} hour(s) and ", p.hours)?;
        }
        writeln!(f, "{} minute(s)", p.remaining_minutes)?;
        write!(f, "(Raw prediction: {} minutes)", p.raw_minutes)
    }
}
