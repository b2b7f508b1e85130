//! Per-file content extraction.
//!
//! Notebooks are parsed and flattened to their cell sources; other files pass through
//! the classifier and are fetched verbatim. Every failure is recorded on the returned
//! [`Fragment`]; only cancellation is reported as an error.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::classify::{classify, Classification};
use crate::contract::RepositoryEntry;
use crate::corpus::Fragment;
use crate::retry::FetchError;
use crate::walk::{CrawlContext, CrawlError};

#[derive(Debug, Deserialize)]
struct Notebook {
    cells: Vec<NotebookCell>,
}

#[derive(Debug, Deserialize)]
struct NotebookCell {
    source: CellSource,
}

/// nbformat allows a cell source to be a list of lines or one multi-line string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CellSource {
    Lines(Vec<String>),
    Text(String),
}

/// Concatenate every source line of every cell, in document order.
pub fn parse_notebook(raw: &str) -> Result<String, serde_json::Error> {
    let notebook: Notebook = serde_json::from_str(raw)?;
    let mut text = String::new();
    for cell in &notebook.cells {
        match &cell.source {
            CellSource::Lines(lines) => lines.iter().for_each(|line| text.push_str(line)),
            CellSource::Text(source) => text.push_str(source),
        }
    }
    Ok(text)
}

/// Extract the text contribution of one file entry.
pub async fn extract_file(
    ctx: &CrawlContext<'_>,
    entry: &RepositoryEntry,
) -> Result<Fragment, CrawlError> {
    let route = classify(&entry.name, ctx.settings);
    if let Classification::Skip(reason) = route {
        debug!(path = %entry.path, ?reason, "Skipping file");
        return Ok(Fragment::Skipped {
            path: entry.path.clone(),
            reason,
        });
    }

    let Some(content_ref) = entry.content_ref() else {
        warn!(path = %entry.path, "File entry has no content reference");
        return Ok(Fragment::Failed {
            path: entry.path.clone(),
            reason: "file entry has no download_url".to_string(),
        });
    };

    let raw = match ctx.fetch_raw(content_ref).await {
        Ok(raw) => raw,
        Err(FetchError::Cancelled) => return Err(CrawlError::Cancelled),
        Err(FetchError::Host(e)) => {
            warn!(path = %entry.path, error = %e, "Failed to fetch file content");
            return Ok(Fragment::Failed {
                path: entry.path.clone(),
                reason: e.to_string(),
            });
        }
    };

    let fragment = match route {
        Classification::Notebook => match parse_notebook(&raw) {
            Ok(text) => Fragment::Text {
                path: entry.path.clone(),
                text,
            },
            Err(e) => {
                warn!(path = %entry.path, error = %e, "Malformed notebook, contributing nothing");
                Fragment::Failed {
                    path: entry.path.clone(),
                    reason: format!("malformed notebook: {e}"),
                }
            }
        },
        _ => Fragment::Text {
            path: entry.path.clone(),
            text: raw,
        },
    };
    debug!(path = %entry.path, bytes = fragment.text().len(), "Extracted file");
    Ok(fragment)
}
