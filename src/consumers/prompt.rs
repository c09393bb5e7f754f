//! Assistant prompt builder.
//!
//! Turns a snapshot into the context block handed to the farming assistant.
//! Running the language model itself is someone else's job.

use crate::consumers::TIMESTAMP_FORMAT;
use crate::store::StoreView;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::str::FromStr;

/// How many climate samples the temperature and humidity prompt includes.
pub const CLIMATE_PROMPT_SAMPLES: usize = 100;

const PREAMBLE: &str = "You are an AI agronomist.\n";
const GROWTH_ADVICE: &str = "Explain implications for crop growth and irrigation.\n";

/// Which sensor data the question is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptContext {
    General,
    WaterLevel,
    PestDetection,
    TemperatureHumidity,
}

impl PromptContext {
    /// Menu label for this context.
    pub fn label(&self) -> &'static str {
        match self {
            PromptContext::General => "General",
            PromptContext::WaterLevel => "Water Level",
            PromptContext::PestDetection => "Pest Detection",
            PromptContext::TemperatureHumidity => "Temperature and Humidity",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown prompt context: {0}")]
pub struct UnknownContext(pub String);

impl FromStr for PromptContext {
    type Err = UnknownContext;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(PromptContext::General),
            "water" | "water level" | "water_level" => Ok(PromptContext::WaterLevel),
            "pest" | "pests" | "pest detection" | "pest_detection" => {
                Ok(PromptContext::PestDetection)
            }
            "climate" | "temperature and humidity" | "temperature_humidity" => {
                Ok(PromptContext::TemperatureHumidity)
            }
            _ => Err(UnknownContext(s.to_string())),
        }
    }
}

/// Build the full prompt for `question` using the data in `view`.
///
/// The general context passes the question through untouched.
pub fn build_prompt(context: PromptContext, question: &str, view: &StoreView) -> String {
    let mut prompt = String::new();
    match context {
        PromptContext::General => return question.to_string(),
        PromptContext::WaterLevel => {
            prompt.push_str(PREAMBLE);
            prompt.push_str("Water-level readings:\n");
            let lines = view
                .water_history
                .iter()
                .map(|e| format!("- {}: {}", e.at.format(TIMESTAMP_FORMAT), e.value));
            push_lines(&mut prompt, lines);
            let _ = write!(prompt, "\n\nLatest: {}\n", view.current_water);
            prompt.push_str(GROWTH_ADVICE);
        }
        PromptContext::PestDetection => {
            prompt.push_str(PREAMBLE);
            prompt.push_str("Pest-detection events:\n");
            let lines = view
                .pest_history
                .iter()
                .map(|e| format!("- {}: {}", e.at.format(TIMESTAMP_FORMAT), e.value));
            push_lines(&mut prompt, lines);
            let _ = write!(prompt, "\n\nTotal pests so far: {}\n", view.pest_count);
            prompt.push_str("Assess pest pressure and actions.\n");
        }
        PromptContext::TemperatureHumidity => {
            prompt.push_str(PREAMBLE);
            prompt.push_str("Temperature and humidity readings:\n");
            let skip = view
                .climate_history
                .len()
                .saturating_sub(CLIMATE_PROMPT_SAMPLES);
            let lines = view.climate_history.iter().skip(skip).map(|e| {
                format!(
                    "- {}: {:.1}°C, {:.1}%",
                    e.at.format(TIMESTAMP_FORMAT),
                    e.value.temperature_c,
                    e.value.humidity_pct
                )
            });
            push_lines(&mut prompt, lines);
            let _ = write!(
                prompt,
                "\n\nLatest: {}, {}\n",
                view.current_temp, view.current_hum
            );
            prompt.push_str(GROWTH_ADVICE);
        }
    }
    prompt.push_str(question);
    prompt
}

fn push_lines(prompt: &mut String, lines: impl Iterator<Item = String>) {
    for (i, line) in lines.enumerate() {
        if i > 0 {
            prompt.push('\n');
        }
        prompt.push_str(&line);
    }
}
