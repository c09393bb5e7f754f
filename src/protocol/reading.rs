//! Typed sensor readings produced by the line codec.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pest state recorded for a `Pest Detected` line.
pub const PEST_DETECTED: &str = "Pest Detected";

/// Pest state recorded for every other pest line.
pub const NO_PESTS_DETECTED: &str = "No Pests Detected";

/// One classified line from a sensor client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reading {
    /// Ultrasonic water level reading
    WaterLevel(WaterLevel),
    /// Motion sensor edge: a pest was (or was not) just detected
    PestEvent { occurred: bool },
    /// Cumulative pest count as reported by the client
    PestTotal { total: u64 },
    /// DHT temperature and humidity pair
    Climate {
        temperature_c: f64,
        humidity_pct: f64,
    },
    /// Anything the codec could not classify
    Unrecognized { raw: String },
}

impl Reading {
    /// Short name of the reading type, used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Reading::WaterLevel(_) => "water_level",
            Reading::PestEvent { .. } => "pest_event",
            Reading::PestTotal { .. } => "pest_total",
            Reading::Climate { .. } => "climate",
            Reading::Unrecognized { .. } => "unrecognized",
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Reading::Unrecognized { .. })
    }
}

/// How the water level moved relative to the previous reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterChange {
    /// First reading after the sensor started
    Initial,
    /// Within the sensor's tolerance band
    NoChange,
    Added,
    Evaporated,
}

/// A water level reading in centimetres.
///
/// `delta_cm` is present exactly when `change` is [`WaterChange::Added`] or
/// [`WaterChange::Evaporated`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterLevel {
    pub level_cm: f64,
    pub change: WaterChange,
    pub delta_cm: Option<f64>,
}

impl WaterLevel {
    pub fn initial(level_cm: f64) -> Self {
        Self {
            level_cm,
            change: WaterChange::Initial,
            delta_cm: None,
        }
    }

    pub fn no_change(level_cm: f64) -> Self {
        Self {
            level_cm,
            change: WaterChange::NoChange,
            delta_cm: None,
        }
    }

    pub fn added(level_cm: f64, delta_cm: f64) -> Self {
        Self {
            level_cm,
            change: WaterChange::Added,
            delta_cm: Some(delta_cm),
        }
    }

    pub fn evaporated(level_cm: f64, delta_cm: f64) -> Self {
        Self {
            level_cm,
            change: WaterChange::Evaporated,
            delta_cm: Some(delta_cm),
        }
    }
}

/// Renders the reading back into the sensor's wire format, two decimals.
impl fmt::Display for WaterLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Water level: {:.2} cm.", self.level_cm)?;
        let delta = self.delta_cm.unwrap_or_default();
        match self.change {
            WaterChange::Initial => write!(f, " (Initial reading)"),
            WaterChange::NoChange => write!(f, " (No significant change)"),
            WaterChange::Added => write!(f, " Water added: {:.2} cm.", delta),
            WaterChange::Evaporated => write!(f, " Water evaporated: {:.2} cm.", delta),
        }
    }
}

/// Pest state string for a pest event.
pub fn pest_state(occurred: bool) -> &'static str {
    if occurred {
        PEST_DETECTED
    } else {
        NO_PESTS_DETECTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_level_display() {
        assert_eq!(
            WaterLevel::initial(5.4).to_string(),
            "Water level: 5.40 cm. (Initial reading)"
        );
        assert_eq!(
            WaterLevel::no_change(5.25).to_string(),
            "Water level: 5.25 cm. (No significant change)"
        );
        assert_eq!(
            WaterLevel::added(6.1, 0.7).to_string(),
            "Water level: 6.10 cm. Water added: 0.70 cm."
        );
        assert_eq!(
            WaterLevel::evaporated(4.0, 1.25).to_string(),
            "Water level: 4.00 cm. Water evaporated: 1.25 cm."
        );
    }

    #[test]
    fn test_reading_serialization_is_tagged() {
        let json = serde_json::to_value(Reading::PestTotal { total: 4 }).unwrap();
        assert_eq!(json["type"], "pest_total");
        assert_eq!(json["total"], 4);

        let json = serde_json::to_value(Reading::WaterLevel(WaterLevel::added(3.0, 0.5))).unwrap();
        assert_eq!(json["type"], "water_level");
        assert_eq!(json["change"], "added");
    }

    #[test]
    fn test_pest_state() {
        assert_eq!(pest_state(true), "Pest Detected");
        assert_eq!(pest_state(false), "No Pests Detected");
    }
}
