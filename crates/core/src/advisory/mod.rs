pub mod rules;
pub mod templates;

use crate::domain::advisory::{Advisory, Language, SoilType};
use crate::domain::climate::{ClimateTable, TEMPERATURE_VARIABLE};
use crate::domain::location::Coordinate;
use templates::NarrativeInput;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvisoryInput {
    pub coordinate: Coordinate,
    pub soil: SoilType,
    pub language: Language,
    /// Calendar month (1-12) the season is derived from.
    pub month: u32,
}

/// Build the advisory for one table. An empty table yields the insufficient-data advisory.
pub fn advise(table: &ClimateTable, input: AdvisoryInput) -> Advisory {
    let average_temperature = table.mean(TEMPERATURE_VARIABLE);
    let precipitation_variable = table.precipitation_variable();
    let average_rainfall = precipitation_variable.and_then(|k| table.mean(k));

    let season = rules::season_for_month(input.month);
    let rainfall_level = rules::rainfall_level(average_rainfall);
    let crop = rules::crop_suggestion(average_rainfall, average_temperature);

    let crop_text = templates::crop_message(crop, input.language);
    let soil_text = templates::soil_note(input.soil, input.language);

    let narrative_text = templates::narrative(&NarrativeInput {
        season,
        average_temperature,
        average_rainfall,
        rainfall: rainfall_level,
        crop: crop_text,
        soil: soil_text,
        language: input.language,
    });
    let sms_text = templates::sms(
        input.coordinate,
        average_temperature,
        average_rainfall,
        crop_text,
        input.language,
    );
    let spoken_text = templates::spoken(crop_text, soil_text, input.language);

    if table.is_empty() {
        tracing::info!("empty climate table; issuing insufficient-data advisory");
    }

    Advisory {
        season,
        average_temperature,
        average_rainfall,
        precipitation_variable: precipitation_variable.map(str::to_string),
        rainfall_level,
        crop,
        crop_suggestion: crop_text.to_string(),
        soil_note: soil_text.to_string(),
        narrative_text,
        sms_text,
        spoken_text,
        language: input.language,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::advisory::{CropSuggestion, RainfallLevel, Season};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn input(language: Language) -> AdvisoryInput {
        AdvisoryInput {
            coordinate: Coordinate::try_new(23.18, 79.95).unwrap(),
            soil: SoilType::Sandy,
            language,
            month: 7,
        }
    }

    fn table(columns: Vec<(&str, Vec<Option<f64>>)>) -> ClimateTable {
        let series = columns
            .into_iter()
            .map(|(name, values)| {
                let by_date = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (NaiveDate::from_ymd_opt(2026, 7, 1 + i as u32).unwrap(), *v))
                    .collect::<BTreeMap<_, _>>();
                (name.to_string(), by_date)
            })
            .collect();
        ClimateTable::from_series(series)
    }

    #[test]
    fn empty_table_is_insufficient_data() {
        let adv = advise(&ClimateTable::default(), input(Language::English));
        assert!(adv.insufficient_data());
        assert_eq!(adv.rainfall_level, RainfallLevel::Insufficient);
        assert_eq!(adv.crop, CropSuggestion::MilletsMaize);
        assert_eq!(adv.season, Season::Kharif);
        assert!(adv.narrative_text.contains("Avg Rain: N/A mm"));
        assert!(adv.narrative_text.contains("Insufficient rainfall data"));
    }

    #[test]
    fn wet_warm_period_suggests_rice() {
        let t = table(vec![
            ("T2M", vec![Some(25.0), Some(27.0)]),
            ("PRECTOTCORR", vec![Some(30.0), Some(20.0)]),
        ]);
        let adv = advise(&t, input(Language::English));
        assert_eq!(adv.average_rainfall, Some(25.0));
        assert_eq!(adv.average_temperature, Some(26.0));
        assert_eq!(adv.crop, CropSuggestion::Rice);
        assert_eq!(adv.rainfall_level, RainfallLevel::Adequate);
        assert_eq!(adv.precipitation_variable.as_deref(), Some("PRECTOTCORR"));
        assert!(adv.sms_text.contains("Rice recommended"));
        assert!(adv.spoken_text.starts_with("Hello."));
        assert!(adv.spoken_text.contains("Sandy soil"));
    }

    #[test]
    fn prefers_prectot_over_corrected_column() {
        let t = table(vec![
            ("T2M", vec![Some(18.0)]),
            ("PRECTOT", vec![Some(12.0)]),
            ("PRECTOTCORR", vec![Some(1.0)]),
        ]);
        let adv = advise(&t, input(Language::English));
        assert_eq!(adv.precipitation_variable.as_deref(), Some("PRECTOT"));
        assert_eq!(adv.crop, CropSuggestion::Wheat);
    }

    #[test]
    fn temperature_only_table_has_missing_rainfall() {
        let t = table(vec![("T2M", vec![Some(20.0), Some(22.0)])]);
        let adv = advise(&t, input(Language::Hindi));
        assert_eq!(adv.average_rainfall, None);
        assert_eq!(adv.average_temperature, Some(21.0));
        assert_eq!(adv.rainfall_level, RainfallLevel::Insufficient);
        assert_eq!(adv.crop, CropSuggestion::MilletsMaize);
        assert!(!adv.insufficient_data());
        assert!(adv.spoken_text.starts_with("नमस्ते।"));
    }

    #[test]
    fn dry_mild_period_suggests_pulses() {
        let t = table(vec![
            ("T2M", vec![Some(19.0), Some(21.0)]),
            ("PRECTOTCORR", vec![Some(0.0), Some(4.0), None]),
        ]);
        let adv = advise(&t, input(Language::English));
        assert_eq!(adv.average_rainfall, Some(2.0));
        assert_eq!(adv.crop, CropSuggestion::Pulses);
        assert_eq!(adv.rainfall_level, RainfallLevel::Low);
    }
}
