pub mod nominatim;

use crate::domain::location::{Coordinate, LocationError, LocationQuery, ResolvedLocation};

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeMatch {
    pub coordinate: Coordinate,
    pub display_name: Option<String>,
}

#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// `Ok(None)` means the provider had no match for `place`.
    async fn geocode(&self, place: &str) -> anyhow::Result<Option<GeocodeMatch>>;
}

/// Turn user input into a coordinate. Explicit coordinates never touch the geocoder.
pub async fn resolve(
    geocoder: &dyn Geocoder,
    query: &LocationQuery,
) -> Result<ResolvedLocation, LocationError> {
    match query {
        LocationQuery::Coordinates {
            latitude,
            longitude,
        } => Ok(ResolvedLocation {
            coordinate: Coordinate::try_new(*latitude, *longitude)?,
            label: None,
        }),
        LocationQuery::Place(place) => {
            let place = place.trim();
            if place.is_empty() {
                return Err(LocationError::EmptyPlace);
            }

            let found = geocoder.geocode(place).await.map_err(|err| {
                tracing::warn!(
                    provider = geocoder.provider_name(),
                    %place,
                    error = %err,
                    "geocoding failed"
                );
                LocationError::Service(err)
            })?;

            let Some(found) = found else {
                return Err(LocationError::NotFound(place.to_string()));
            };

            tracing::info!(
                provider = geocoder.provider_name(),
                %place,
                coordinate = %found.coordinate,
                display_name = found.display_name.as_deref().unwrap_or(""),
                "place resolved"
            );

            Ok(ResolvedLocation {
                coordinate: found.coordinate,
                label: Some(place.to_string()),
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers every lookup with the same canned result.
    pub struct FixedGeocoder {
        pub result: Option<(f64, f64)>,
        pub fail: bool,
        pub calls: AtomicUsize,
    }

    impl FixedGeocoder {
        pub fn found(latitude: f64, longitude: f64) -> Self {
            Self {
                result: Some((latitude, longitude)),
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn not_found() -> Self {
            Self {
                result: None,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                result: None,
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Geocoder for FixedGeocoder {
        fn provider_name(&self) -> &'static str {
            "fixed"
        }

        async fn geocode(&self, place: &str) -> anyhow::Result<Option<GeocodeMatch>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("geocoder timed out");
            }
            Ok(match self.result {
                Some((lat, lon)) => Some(GeocodeMatch {
                    coordinate: Coordinate::try_new(lat, lon)?,
                    display_name: Some(format!("{place}, somewhere")),
                }),
                None => None,
            })
        }
    }
}
