use crate::domain::advisory::{CropSuggestion, RainfallLevel, Season};

pub const LOW_RAIN_MM: f64 = 5.0;
pub const HIGH_RAIN_MM: f64 = 20.0;

pub fn season_for_month(month: u32) -> Season {
    match month {
        6..=10 => Season::Kharif,
        11 | 12 | 1..=3 => Season::Rabi,
        4 | 5 => Season::Zaid,
        _ => Season::Unknown,
    }
}

/// Bands: [0,5) low, [5,20] moderate, (20,inf) adequate.
pub fn rainfall_level(average_rainfall: Option<f64>) -> RainfallLevel {
    match average_rainfall {
        None => RainfallLevel::Insufficient,
        Some(r) if r < LOW_RAIN_MM => RainfallLevel::Low,
        Some(r) if r <= HIGH_RAIN_MM => RainfallLevel::Moderate,
        Some(_) => RainfallLevel::Adequate,
    }
}

pub fn crop_suggestion(
    average_rainfall: Option<f64>,
    average_temperature: Option<f64>,
) -> CropSuggestion {
    let (Some(rain), Some(temp)) = (average_rainfall, average_temperature) else {
        return CropSuggestion::MilletsMaize;
    };

    if rain > HIGH_RAIN_MM && temp > 24.0 {
        CropSuggestion::Rice
    } else if (LOW_RAIN_MM..=HIGH_RAIN_MM).contains(&rain) && (15.0..=22.0).contains(&temp) {
        CropSuggestion::Wheat
    } else if rain < LOW_RAIN_MM && (18.0..=28.0).contains(&temp) {
        CropSuggestion::Pulses
    } else {
        CropSuggestion::MilletsMaize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_covers_every_month() {
        for m in 6..=10 {
            assert_eq!(season_for_month(m), Season::Kharif, "month {m}");
        }
        for m in [11, 12, 1, 2, 3] {
            assert_eq!(season_for_month(m), Season::Rabi, "month {m}");
        }
        for m in [4, 5] {
            assert_eq!(season_for_month(m), Season::Zaid, "month {m}");
        }
        assert_eq!(season_for_month(0), Season::Unknown);
        assert_eq!(season_for_month(13), Season::Unknown);
    }

    #[test]
    fn rainfall_band_edges() {
        assert_eq!(rainfall_level(None), RainfallLevel::Insufficient);
        assert_eq!(rainfall_level(Some(0.0)), RainfallLevel::Low);
        assert_eq!(rainfall_level(Some(4.99)), RainfallLevel::Low);
        assert_eq!(rainfall_level(Some(5.0)), RainfallLevel::Moderate);
        assert_eq!(rainfall_level(Some(20.0)), RainfallLevel::Moderate);
        assert_eq!(rainfall_level(Some(20.01)), RainfallLevel::Adequate);
    }

    #[test]
    fn crop_rules() {
        assert_eq!(crop_suggestion(Some(25.0), Some(26.0)), CropSuggestion::Rice);
        assert_eq!(crop_suggestion(Some(12.0), Some(18.0)), CropSuggestion::Wheat);
        assert_eq!(crop_suggestion(Some(2.0), Some(20.0)), CropSuggestion::Pulses);
        assert_eq!(crop_suggestion(Some(25.0), Some(20.0)), CropSuggestion::MilletsMaize);
        assert_eq!(crop_suggestion(Some(2.0), Some(35.0)), CropSuggestion::MilletsMaize);
        assert_eq!(crop_suggestion(Some(5.0), Some(15.0)), CropSuggestion::Wheat);
        assert_eq!(crop_suggestion(Some(20.0), Some(22.0)), CropSuggestion::Wheat);
    }

    #[test]
    fn missing_average_falls_back_to_generic_crop() {
        for temp in [None, Some(10.0), Some(20.0), Some(26.0), Some(40.0)] {
            assert_eq!(crop_suggestion(None, temp), CropSuggestion::MilletsMaize);
        }
        assert_eq!(crop_suggestion(Some(25.0), None), CropSuggestion::MilletsMaize);
    }
}
