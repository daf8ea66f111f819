pub mod error;
pub mod http;
pub mod schema;

use crate::domain::climate::{Community, DateRange, PARAMETER_SETS};
use crate::domain::location::Coordinate;
use crate::power::error::{AttemptDiagnostic, AttemptFailure, FetchFailure};
use crate::power::schema::RawSeriesResponse;

const EXCERPT_CHARS: usize = 1500;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerRequest {
    pub coordinate: Coordinate,
    pub range: DateRange,
    pub community: Community,
    pub parameters: &'static [&'static str],
}

impl PowerRequest {
    pub fn parameter_list(&self) -> String {
        self.parameters.join(",")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceReply {
    pub status: u16,
    pub body: String,
}

impl SourceReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One round trip to the daily point endpoint. Status handling is the caller's job.
#[async_trait::async_trait]
pub trait ClimateSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Request target for diagnostics.
    fn target(&self, req: &PowerRequest) -> String;

    async fn send(&self, req: &PowerRequest) -> anyhow::Result<SourceReply>;
}

#[derive(Debug, Clone)]
pub struct FetchSuccess {
    pub community: Community,
    pub parameters: &'static [&'static str],
    pub attempts: usize,
    pub response: RawSeriesResponse,
}

/// Walk the parameter sets richest-first until one yields a usable body.
pub async fn fetch_with_fallback(
    source: &dyn ClimateSource,
    coordinate: Coordinate,
    range: DateRange,
    community: Community,
) -> Result<FetchSuccess, FetchFailure> {
    let mut last: Option<AttemptDiagnostic> = None;

    for (idx, parameters) in PARAMETER_SETS.iter().copied().enumerate() {
        let attempt = idx + 1;
        let req = PowerRequest {
            coordinate,
            range,
            community,
            parameters,
        };
        let target = source.target(&req);

        let diagnostic = match source.send(&req).await {
            Err(err) => AttemptDiagnostic {
                target,
                parameters: req.parameter_list(),
                status: None,
                excerpt: excerpt(&format!("{err:#}")),
                failure: AttemptFailure::Transport(format!("{err:#}")),
            },
            Ok(reply) if !reply.is_success() => AttemptDiagnostic {
                target,
                parameters: req.parameter_list(),
                status: Some(reply.status),
                excerpt: excerpt(&reply.body),
                failure: AttemptFailure::Status(reply.status),
            },
            Ok(reply) => match RawSeriesResponse::parse(&reply.body) {
                Ok(response) => {
                    tracing::info!(
                        source = source.source_name(),
                        %community,
                        attempt,
                        parameters = %req.parameter_list(),
                        "climate series fetched"
                    );
                    return Ok(FetchSuccess {
                        community,
                        parameters,
                        attempts: attempt,
                        response,
                    });
                }
                Err(err) => AttemptDiagnostic {
                    target,
                    parameters: req.parameter_list(),
                    status: Some(reply.status),
                    excerpt: excerpt(&reply.body),
                    failure: AttemptFailure::InvalidBody(err.to_string()),
                },
            },
        };

        tracing::warn!(
            source = source.source_name(),
            %community,
            attempt,
            parameters = %diagnostic.parameters,
            status = ?diagnostic.status,
            failure = %diagnostic.failure,
            "climate fetch attempt failed; trying next parameter set"
        );
        last = Some(diagnostic);
    }

    let last = last.unwrap_or_else(|| AttemptDiagnostic {
        target: String::new(),
        parameters: String::new(),
        status: None,
        excerpt: String::new(),
        failure: AttemptFailure::Transport("no parameter sets configured".to_string()),
    });

    Err(FetchFailure {
        community,
        attempts: PARAMETER_SETS.len(),
        last,
    })
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}
