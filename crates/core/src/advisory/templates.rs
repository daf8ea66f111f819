//! Fixed English and Hindi templates. No translation happens here; each
//! message has one hand-written string per language.

use crate::domain::advisory::{CropSuggestion, Language, RainfallLevel, Season, SoilType};
use crate::domain::location::Coordinate;

pub const SMS_MAX_CHARS: usize = 160;

pub fn season_label(season: Season, lang: Language) -> &'static str {
    match (season, lang) {
        (Season::Kharif, Language::English) => {
            "Kharif (Rice, Maize, Millets, Cotton, Soybean, Groundnut)"
        }
        (Season::Rabi, Language::English) => "Rabi (Wheat, Barley, Mustard, Gram, Peas)",
        (Season::Zaid, Language::English) => "Zaid (Watermelon, Muskmelon, Vegetables, Fodder)",
        (Season::Unknown, Language::English) => "Season info not available",
        (Season::Kharif, Language::Hindi) => "खरीफ (धान, मक्का, बाजरा, कपास, सोयाबीन, मूंगफली)",
        (Season::Rabi, Language::Hindi) => "रबी (गेहूं, जौ, सरसों, चना, मटर)",
        (Season::Zaid, Language::Hindi) => "जायद (तरबूज, खरबूजा, सब्जियां, चारा)",
        (Season::Unknown, Language::Hindi) => "मौसम सत्र की जानकारी उपलब्ध नहीं",
    }
}

pub fn rainfall_message(level: RainfallLevel, lang: Language) -> &'static str {
    match (level, lang) {
        (RainfallLevel::Insufficient, Language::English) => {
            "Insufficient rainfall data: use local guidance."
        }
        (RainfallLevel::Low, Language::English) => "Rainfall low: consider irrigation.",
        (RainfallLevel::Moderate, Language::English) => "Moderate rainfall: good for sowing.",
        (RainfallLevel::Adequate, Language::English) => {
            "Adequate rainfall: good for water-loving crops."
        }
        (RainfallLevel::Insufficient, Language::Hindi) => {
            "वर्षा का पर्याप्त डेटा उपलब्ध नहीं: स्थानीय सलाह लें।"
        }
        (RainfallLevel::Low, Language::Hindi) => "वर्षा कम है: सिंचाई पर विचार करें।",
        (RainfallLevel::Moderate, Language::Hindi) => "मध्यम वर्षा: बुवाई के लिए अच्छा समय।",
        (RainfallLevel::Adequate, Language::Hindi) => {
            "पर्याप्त वर्षा: पानी पसंद करने वाली फसलों के लिए अच्छा।"
        }
    }
}

pub fn crop_message(crop: CropSuggestion, lang: Language) -> &'static str {
    match (crop, lang) {
        (CropSuggestion::Rice, Language::English) => {
            "Rice recommended: rainfall and temperature favorable."
        }
        (CropSuggestion::Wheat, Language::English) => {
            "Wheat suitable: moderate rain and cooler temperatures."
        }
        (CropSuggestion::Pulses, Language::English) => {
            "Pulses (lentils/gram) ideal for dry conditions."
        }
        (CropSuggestion::MilletsMaize, Language::English) => {
            "Consider climate-resilient crops: millets/maize."
        }
        (CropSuggestion::Rice, Language::Hindi) => "धान की सिफारिश: वर्षा और तापमान अनुकूल हैं।",
        (CropSuggestion::Wheat, Language::Hindi) => "गेहूं उपयुक्त: मध्यम वर्षा और ठंडा तापमान।",
        (CropSuggestion::Pulses, Language::Hindi) => "दालें (मसूर/चना) सूखी परिस्थितियों के लिए आदर्श।",
        (CropSuggestion::MilletsMaize, Language::Hindi) => {
            "जलवायु-सहनशील फसलें अपनाएं: बाजरा/मक्का।"
        }
    }
}

pub fn soil_note(soil: SoilType, lang: Language) -> &'static str {
    match (soil, lang) {
        (SoilType::Sandy, Language::English) => {
            "Sandy soil: quick drainage, irrigate more frequently."
        }
        (SoilType::Clay, Language::English) => {
            "Clay soil: high water retention, avoid waterlogging."
        }
        (SoilType::Loamy, Language::English) => "Loamy soil: generally ideal for many crops.",
        (SoilType::Silty, Language::English) => {
            "Silty soil: generally favorable for most crops."
        }
        (SoilType::Sandy, Language::Hindi) => {
            "बलुई मिट्टी: पानी जल्दी निकल जाता है, अधिक बार सिंचाई करें।"
        }
        (SoilType::Clay, Language::Hindi) => "चिकनी मिट्टी: पानी अधिक रुकता है, जलभराव से बचें।",
        (SoilType::Loamy, Language::Hindi) => {
            "दोमट मिट्टी: अधिकांश फसलों के लिए सामान्यतः अनुकूल।"
        }
        (SoilType::Silty, Language::Hindi) => {
            "गादयुक्त मिट्टी: अधिकांश फसलों के लिए सामान्यतः अनुकूल।"
        }
    }
}

pub struct NarrativeInput<'a> {
    pub season: Season,
    pub average_temperature: Option<f64>,
    pub average_rainfall: Option<f64>,
    pub rainfall: RainfallLevel,
    pub crop: &'a str,
    pub soil: &'a str,
    pub language: Language,
}

pub fn narrative(input: &NarrativeInput<'_>) -> String {
    let season = season_label(input.season, input.language);
    let rain = fmt_opt(input.average_rainfall, 2);
    let temp = fmt_opt(input.average_temperature, 2);
    let rain_msg = rainfall_message(input.rainfall, input.language);
    match input.language {
        Language::English => format!(
            "Season: {season}\n\nAvg Rain: {rain} mm\nAvg Temp: {temp} °C\n{rain_msg}\n\n\
             Recommendation: {}\n\nSoil note: {}",
            input.crop, input.soil
        ),
        Language::Hindi => format!(
            "मौसम सत्र: {season}\n\nऔसत वर्षा: {rain} mm\nऔसत ताप: {temp} °C\n{rain_msg}\n\n\
             सिफारिश: {}\n\nमिट्टी: {}",
            input.crop, input.soil
        ),
    }
}

/// One line, truncated to [`SMS_MAX_CHARS`].
pub fn sms(
    coordinate: Coordinate,
    average_temperature: Option<f64>,
    average_rainfall: Option<f64>,
    advice: &str,
    lang: Language,
) -> String {
    let lat = coordinate.latitude();
    let lon = coordinate.longitude();
    let temp = fmt_opt(average_temperature, 1);
    let rain = fmt_opt(average_rainfall, 1);
    let advice = advice.replace(['\n', '\r'], " ");
    let line = match lang {
        Language::English => {
            format!("Farm @ ({lat:.2},{lon:.2}) | Temp: {temp}°C | Rain: {rain}mm | Advice: {advice}")
        }
        Language::Hindi => {
            format!("खेत @ ({lat:.2},{lon:.2}) | ताप: {temp}°C | वर्षा: {rain}mm | सलाह: {advice}")
        }
    };
    truncate_chars(&line, SMS_MAX_CHARS)
}

pub fn spoken(crop: &str, soil: &str, lang: Language) -> String {
    match lang {
        Language::English => format!("Hello. Recommendation for your farm: {crop} {soil}"),
        Language::Hindi => format!("नमस्ते। आपके खेत के लिए सिफारिश: {crop} {soil}"),
    }
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(v) => format!("{v:.decimals$}"),
        None => "N/A".to_string(),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sms_is_single_bounded_line() {
        let coord = Coordinate::try_new(23.18123, 79.95456).unwrap();
        let msg = sms(coord, Some(26.04), Some(3.26), "line one\nline two", Language::English);
        assert!(!msg.contains('\n'));
        assert!(msg.starts_with("Farm @ (23.18,79.95) | Temp: 26.0°C | Rain: 3.3mm"));

        let long = "x".repeat(400);
        let msg = sms(coord, None, None, &long, Language::Hindi);
        assert_eq!(msg.chars().count(), SMS_MAX_CHARS);
        assert!(msg.ends_with("..."));
        assert!(msg.contains("ताप: N/A°C"));
    }

    #[test]
    fn narrative_uses_language_template() {
        let input = NarrativeInput {
            season: Season::Rabi,
            average_temperature: Some(18.456),
            average_rainfall: None,
            rainfall: RainfallLevel::Insufficient,
            crop: crop_message(CropSuggestion::MilletsMaize, Language::Hindi),
            soil: soil_note(SoilType::Clay, Language::Hindi),
            language: Language::Hindi,
        };
        let text = narrative(&input);
        assert!(text.starts_with("मौसम सत्र: रबी"));
        assert!(text.contains("औसत वर्षा: N/A mm"));
        assert!(text.contains("औसत ताप: 18.46 °C"));
        assert!(text.contains("चिकनी मिट्टी"));
    }

    #[test]
    fn every_soil_note_names_its_own_soil() {
        assert!(soil_note(SoilType::Silty, Language::English).starts_with("Silty soil"));
        assert!(!soil_note(SoilType::Silty, Language::English).contains("Loamy"));
        assert!(soil_note(SoilType::Silty, Language::Hindi).starts_with("गादयुक्त"));
        assert_ne!(
            soil_note(SoilType::Silty, Language::Hindi),
            soil_note(SoilType::Loamy, Language::Hindi)
        );
    }
}
