//! Source file parsing and text extraction.
//!
//! A source becomes one or more documents: a CSV registry yields one
//! document per row, every other format yields a single document.

use meridian_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Pdf,
    Csv,
    Markdown,
    Html,
    PlainText,
    Unknown,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("csv") => Self::Csv,
            Some("md") | Some("markdown") => Self::Markdown,
            Some("html") | Some("htm") => Self::Html,
            Some("txt") => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::PlainText => "text",
            Self::Unknown => "unknown",
        }
    }

    /// Whether directory walks pick this type up.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Parse a source file into cleaned text documents.
pub fn parse_file(path: &Path) -> AppResult<Vec<String>> {
    let content_type = ContentType::from_path(path);

    let documents = match content_type {
        ContentType::Pdf => vec![parse_pdf(path)?],
        ContentType::Csv => parse_csv(&read_text(path)?)?,
        ContentType::Markdown => vec![clean_markdown(&read_text(path)?)],
        ContentType::Html => vec![clean_html(&read_text(path)?)],
        ContentType::PlainText => vec![read_text(path)?],
        ContentType::Unknown => {
            let raw = read_text(path)?;
            if !is_likely_text(&raw) {
                tracing::warn!("Skipping likely binary file: {:?}", path);
                return Err(AppError::Knowledge("Binary file not supported".to_string()));
            }
            vec![raw]
        }
    };

    Ok(documents
        .into_iter()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect())
}

fn read_text(path: &Path) -> AppResult<String> {
    fs::read_to_string(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))
}

/// Extract the text layer of a PDF, collapsing runs of blank lines.
fn parse_pdf(path: &Path) -> AppResult<String> {
    let raw = pdf_extract::extract_text(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to extract text from {:?}: {}", path, e)))?;

    let mut result = String::with_capacity(raw.len());
    let mut blank_run = 0;
    for line in raw.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        result.push_str(line);
        result.push('\n');
    }

    Ok(result)
}

/// Render each CSV row as `Header: value` lines, skipping empty cells.
fn parse_csv(text: &str) -> AppResult<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::Knowledge(format!("Failed to read CSV header: {}", e)))?
        .clone();

    let mut documents = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            AppError::Knowledge(format!("Failed to read CSV row {}: {}", row_idx + 1, e))
        })?;

        let lines: Vec<String> = record
            .iter()
            .enumerate()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(i, value)| {
                let header = headers.get(i).unwrap_or("");
                if header.is_empty() {
                    format!("Column {}: {}", i + 1, value.trim())
                } else {
                    format!("{}: {}", header.trim(), value.trim())
                }
            })
            .collect();

        if !lines.is_empty() {
            documents.push(lines.join("\n"));
        }
    }

    Ok(documents)
}

/// Clean markdown by removing excess formatting.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = line.trim_start_matches('#').trim();

        // Horizontal rules and code fences
        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        if !trimmed.is_empty() {
            result.push_str(trimmed);
            result.push('\n');
        }
    }

    result.trim().to_string()
}

/// Clean HTML by stripping tags, scripts and styles.
fn clean_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    let mut skip_until: Option<&str> = None;

    let lower = text.to_ascii_lowercase();

    for (i, ch) in text.char_indices() {
        let rest = &lower[i..];

        if let Some(end_tag) = skip_until {
            if rest.starts_with(end_tag) {
                skip_until = None;
                in_tag = true;
            }
            continue;
        }

        match ch {
            '<' => {
                in_tag = true;
                if rest.starts_with("<script") {
                    skip_until = Some("</script");
                } else if rest.starts_with("<style") {
                    skip_until = Some("</style");
                }
                result.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check if text is likely UTF-8 text (not binary).
fn is_likely_text(data: &str) -> bool {
    !data.contains('\0')
}
