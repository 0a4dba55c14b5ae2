use crate::config::FeedSource;
use crate::sanitize::sanitize;
use crate::types::{Dataset, Record};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Terminator, Trim};
use std::path::Path;
use tracing::{debug, info};

/// Outcome of parsing a feed body.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub records: Dataset,
    // Rows whose field count didn't match the header
    pub dropped: usize,
}

pub async fn load_dataset(source: &FeedSource) -> Result<Dataset> {
    let text = match source {
        FeedSource::Url(url) => fetch_csv(url).await?,
        FeedSource::File(path) => read_csv_file(path)?,
    };
    info!("Loaded {} bytes of CSV from {:?}", text.len(), source);

    let report = parse_csv(&text);
    info!(
        "Parsed {} records ({} malformed rows dropped)",
        report.records.len(),
        report.dropped
    );
    Ok(report.records)
}

/// Single GET of the published feed. No retries.
pub async fn fetch_csv(url: &str) -> Result<String> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to fetch CSV feed: {}", url))?
        .error_for_status()
        .with_context(|| format!("CSV feed returned an error status: {}", url))?;
    let text = response
        .text()
        .await
        .context("Failed to read CSV feed body")?;
    Ok(text)
}

pub fn read_csv_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))
}

/// Plain comma splitting on `\n`-separated lines: no quoted fields, so a
/// value containing a comma misaligns its row and the row is dropped. A stray
/// `\r` stays inside its field and is stripped by the sanitizer.
pub fn parse_csv(text: &str) -> ParseReport {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .quoting(false)
        .flexible(true)
        .trim(Trim::All)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match rdr.headers() {
        Ok(h) => h.iter().map(|h| h.trim().to_string()).collect(),
        Err(e) => {
            debug!("Unreadable CSV header: {}", e);
            return ParseReport::default();
        }
    };

    let mut report = ParseReport::default();
    if headers.is_empty() {
        return report;
    }

    for result in rdr.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                debug!("Skipping unreadable row: {}", e);
                report.dropped += 1;
                continue;
            }
        };

        if row.len() != headers.len() {
            debug!(
                "Dropping row with {} fields (expected {})",
                row.len(),
                headers.len()
            );
            report.dropped += 1;
            continue;
        }

        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.clone(), sanitize(Some(v))))
            .collect();
        report.records.push(record);
    }

    report
}
