use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Provider body after shape validation: variable -> date key -> raw value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeriesResponse {
    pub parameters: BTreeMap<String, Value>,
    pub raw: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum ResponseShapeError {
    #[error("response body is not JSON")]
    NotJson(#[from] serde_json::Error),
    #[error("response has no properties.parameter block")]
    MissingParameterBlock,
    #[error("properties.parameter is not an object")]
    ParameterBlockNotObject,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    properties: Option<Properties>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    parameter: Option<Value>,
}

impl RawSeriesResponse {
    pub fn parse(body: &str) -> Result<Self, ResponseShapeError> {
        let raw = serde_json::from_str::<Value>(body)?;
        Self::from_value(raw)
    }

    pub fn from_value(raw: Value) -> Result<Self, ResponseShapeError> {
        // Error payloads ({"messages": [..]}, {"detail": ..}) fail here rather than later.
        let envelope = Envelope::deserialize(&raw)
            .map_err(|_| ResponseShapeError::MissingParameterBlock)?;
        let parameter = envelope
            .properties
            .and_then(|p| p.parameter)
            .ok_or(ResponseShapeError::MissingParameterBlock)?;

        let parameters: Map<String, Value> = match parameter {
            Value::Object(obj) => obj,
            _ => return Err(ResponseShapeError::ParameterBlockNotObject),
        };

        Ok(Self {
            parameters: parameters.into_iter().collect(),
            raw,
        })
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_power_point_shape() {
        let body = json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [79.95, 23.18, 400.0]},
            "properties": {"parameter": {"T2M": {"20260101": 18.5}}},
            "header": {"fill_value": -999.0}
        })
        .to_string();
        let parsed = RawSeriesResponse::parse(&body).unwrap();
        assert_eq!(parsed.variables().collect::<Vec<_>>(), vec!["T2M"]);
    }

    #[test]
    fn rejects_error_payloads() {
        let body = json!({"messages": ["Invalid parameter PRECTOT"], "header": {}}).to_string();
        assert!(matches!(
            RawSeriesResponse::parse(&body),
            Err(ResponseShapeError::MissingParameterBlock)
        ));

        let body = json!({"properties": {"parameter": [1, 2]}}).to_string();
        assert!(matches!(
            RawSeriesResponse::parse(&body),
            Err(ResponseShapeError::ParameterBlockNotObject)
        ));

        assert!(matches!(
            RawSeriesResponse::parse("<html>502</html>"),
            Err(ResponseShapeError::NotJson(_))
        ));

        assert!(matches!(
            RawSeriesResponse::parse("[]"),
            Err(ResponseShapeError::MissingParameterBlock)
        ));
    }
}
