use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Kharif,
    Rabi,
    Zaid,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RainfallLevel {
    Insufficient,
    Low,
    Moderate,
    Adequate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropSuggestion {
    Rice,
    Wheat,
    Pulses,
    MilletsMaize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoilType {
    Loamy,
    Sandy,
    Clay,
    Silty,
}

impl FromStr for SoilType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loamy" => Ok(SoilType::Loamy),
            "sandy" => Ok(SoilType::Sandy),
            "clay" => Ok(SoilType::Clay),
            "silty" => Ok(SoilType::Silty),
            other => anyhow::bail!("unknown soil type {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    English,
    Hindi,
}

impl Language {
    /// Speech provider language code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "hi" | "hindi" => Ok(Language::Hindi),
            other => anyhow::bail!("unsupported language {other:?} (expected en or hi)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub season: Season,
    pub average_temperature: Option<f64>,
    pub average_rainfall: Option<f64>,
    /// Column the rainfall average was taken from.
    pub precipitation_variable: Option<String>,
    pub rainfall_level: RainfallLevel,
    pub crop: CropSuggestion,
    pub crop_suggestion: String,
    pub soil_note: String,
    pub narrative_text: String,
    pub sms_text: String,
    pub spoken_text: String,
    pub language: Language,
}

impl Advisory {
    pub fn insufficient_data(&self) -> bool {
        self.average_temperature.is_none() && self.average_rainfall.is_none()
    }
}
