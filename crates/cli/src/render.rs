use farmnav_core::domain::climate::SeriesMetric;
use farmnav_core::pipeline::{AdvisoryReport, CommunityOutcome, FetchedSeries, SeriesDetails};
use std::fmt::Write;

/// Plain-text report for the terminal.
pub fn report(report: &AdvisoryReport) -> String {
    let mut out = String::new();
    let place = report.location.label.as_deref().unwrap_or("coordinates");
    let _ = writeln!(
        out,
        "Location: {place} {}  ({} to {}, {} days)",
        report.location.coordinate,
        report.range.start(),
        report.range.end(),
        report.range.days()
    );

    for community in &report.communities {
        let _ = writeln!(out, "\n== {} ==", community.community);
        match &community.outcome {
            CommunityOutcome::Fetched(series) => fetched(&mut out, series),
            CommunityOutcome::Failed { failure } => {
                let _ = writeln!(out, "Fetch failed after {} attempts", failure.attempts);
                let _ = writeln!(out, "  target: {}", failure.last.target);
                if let Some(status) = failure.last.status {
                    let _ = writeln!(out, "  status: {status}");
                }
                let _ = writeln!(out, "  reason: {}", failure.last.failure);
                if !failure.last.excerpt.is_empty() {
                    let _ = writeln!(out, "  response: {}", failure.last.excerpt);
                }
            }
        }
    }

    if !report.comparison.is_empty() {
        let _ = writeln!(out, "\nCommunity comparison");
        let _ = writeln!(out, "{:<10}{:>14}{:>14}", "community", "rain (mm)", "temp (C)");
        for row in &report.comparison {
            let _ = writeln!(
                out,
                "{:<10}{:>14}{:>14}",
                row.community.as_str(),
                fixed(row.average_rainfall),
                fixed(row.average_temperature)
            );
        }
    }
    out
}

fn fetched(out: &mut String, series: &FetchedSeries) {
    let advisory = &series.advisory;
    let _ = writeln!(out, "Parameters: {}", series.parameters.join(","));
    if series.table.is_empty() {
        let _ = writeln!(out, "No numeric data was returned for this period.");
    }
    let _ = writeln!(out, "\n{}", advisory.narrative_text);
    let _ = writeln!(out, "\nSMS: {}", advisory.sms_text);

    if let Some(details) = &series.details {
        details_block(out, series, details);
    }
    if !series.artifacts.is_empty() {
        let _ = writeln!(out, "\nSaved:");
        for path in &series.artifacts {
            let _ = writeln!(out, "  {}", path.display());
        }
    }
}

fn details_block(out: &mut String, series: &FetchedSeries, details: &SeriesDetails) {
    let _ = writeln!(out, "\nData quality (non-missing values):");
    for (variable, count) in &details.quality {
        let _ = writeln!(out, "  {variable}: {count}/{}", series.table.len());
    }

    for metric in [&details.temperature, &details.precipitation].into_iter().flatten() {
        let _ = writeln!(out, "Latest {}", metric_line(metric));
    }

    if !details.recent.is_empty() {
        let variables: Vec<&str> = series.table.variables().collect();
        let _ = write!(out, "\n{:<12}", "date");
        for v in &variables {
            let _ = write!(out, "{v:>20}");
        }
        let _ = writeln!(out);
        for (date, values) in &details.recent {
            let _ = write!(out, "{:<12}", date.format("%Y-%m-%d").to_string());
            for v in values {
                let _ = write!(out, "{:>20}", fixed(*v));
            }
            let _ = writeln!(out);
        }
    }

    if series.audio_available {
        let _ = writeln!(out, "\nAudio preview: available");
    }
}

fn metric_line(metric: &SeriesMetric) -> String {
    match metric.delta {
        Some(delta) => format!("{}: {} ({delta:+.2})", metric.variable, fixed(metric.latest)),
        None => format!("{}: {}", metric.variable, fixed(metric.latest)),
    }
}

fn fixed(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_render_as_na() {
        assert_eq!(fixed(None), "N/A");
        assert_eq!(fixed(Some(3.14159)), "3.14");
    }

    #[test]
    fn metric_shows_signed_delta() {
        let metric = SeriesMetric {
            variable: "T2M".to_string(),
            latest: Some(26.0),
            delta: Some(-1.0),
        };
        assert_eq!(metric_line(&metric), "T2M: 26.00 (-1.00)");
    }
}
