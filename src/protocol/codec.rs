//! Line classifier for the sensor wire protocol.
//!
//! Rules are checked in the order the sensors emit them and the first match
//! wins. Malformed numeric content never raises; the line degrades to
//! [`Reading::Unrecognized`] and nothing in the store changes.

use super::reading::{Reading, WaterLevel, NO_PESTS_DETECTED, PEST_DETECTED};

const WATER_PREFIX: &str = "Water level";
const WATER_LABEL: &str = "Water level:";
const PEST_TOTAL_PREFIX: &str = "Total Pests Detected";
const PEST_PREFIX: &str = "Pest";
const TEMPERATURE_LABEL: &str = "Temperature:";
const HUMIDITY_LABEL: &str = "Humidity:";

/// Classify one raw line. Leading and trailing whitespace is ignored.
pub fn classify(raw: &str) -> Reading {
    let line = raw.trim();

    let parsed = if line.starts_with(WATER_PREFIX) {
        parse_water_level(line).map(Reading::WaterLevel)
    } else if line.starts_with(PEST_TOTAL_PREFIX) {
        parse_pest_total(line).map(|total| Reading::PestTotal { total })
    } else if line.starts_with(PEST_PREFIX) || line == NO_PESTS_DETECTED {
        Some(Reading::PestEvent {
            occurred: line.starts_with(PEST_DETECTED),
        })
    } else if line.starts_with(TEMPERATURE_LABEL) {
        parse_climate(line)
    } else {
        None
    };

    parsed.unwrap_or_else(|| Reading::Unrecognized {
        raw: line.to_string(),
    })
}

fn parse_water_level(line: &str) -> Option<WaterLevel> {
    let level_cm = number_before(line.strip_prefix(WATER_LABEL)?, "cm")?;

    if line.contains("Initial reading") {
        Some(WaterLevel::initial(level_cm))
    } else if line.contains("No significant change") {
        Some(WaterLevel::no_change(level_cm))
    } else if let Some((_, rest)) = line.split_once("Water added:") {
        Some(WaterLevel::added(level_cm, number_before(rest, "cm")?))
    } else if let Some((_, rest)) = line.split_once("Water evaporated:") {
        Some(WaterLevel::evaporated(level_cm, number_before(rest, "cm")?))
    } else {
        None
    }
}

fn parse_pest_total(line: &str) -> Option<u64> {
    let (_, count) = line.split_once(':')?;
    count.trim().parse().ok()
}

fn parse_climate(line: &str) -> Option<Reading> {
    let temperature_c = number_before(line.strip_prefix(TEMPERATURE_LABEL)?, "°C")?;
    let (_, humidity) = line.split_once(HUMIDITY_LABEL)?;
    let humidity_pct = number_before(humidity, "%")?;

    Some(Reading::Climate {
        temperature_c,
        humidity_pct,
    })
}

/// Parse the float that precedes the first occurrence of `unit`.
fn number_before(text: &str, unit: &str) -> Option<f64> {
    let (number, _) = text.split_once(unit)?;
    parse_finite(number.trim())
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}
