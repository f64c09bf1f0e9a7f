//! Best-effort text extraction from uploaded files.
//!
//! The filename only picks the strategy:
//! - `.pdf` → per-page text via lopdf, failing pages skipped
//! - `.eml` → subject + body via mail-parser
//! - anything else → UTF-8, then Windows-1252
//!
//! Nothing here returns an error. Unreadable input becomes an empty string,
//! which the classifier then rejects as empty input.

use std::panic::{self, AssertUnwindSafe};

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use mail_parser::MessageParser;
use tracing::debug;

/// Extract plain text from `bytes`, using `filename` to choose how.
pub fn extract_text(bytes: &[u8], filename: &str) -> String {
    let name = filename.to_ascii_lowercase();
    if name.ends_with(".pdf") {
        extract_pdf(bytes)
    } else if name.ends_with(".eml") {
        extract_eml(bytes).unwrap_or_else(|| decode_text(bytes))
    } else {
        decode_text(bytes)
    }
}

/// Decode with the first encoding that accepts the bytes without errors.
///
/// Windows-1252 maps every byte, so the loop only falls through for an
/// empty candidate list.
pub fn decode_text(bytes: &[u8]) -> String {
    let candidates: [&'static Encoding; 2] = [UTF_8, WINDOWS_1252];
    for encoding in candidates {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            debug!(encoding = encoding.name(), bytes = bytes.len(), "Decoded upload");
            return text.into_owned();
        }
    }
    String::new()
}

/// Join per-page results in order, dropping pages that failed.
pub fn join_pages<I, E>(pages: I) -> String
where
    I: IntoIterator<Item = Result<String, E>>,
    E: std::fmt::Display,
{
    pages
        .into_iter()
        .enumerate()
        .filter_map(|(index, page)| match page {
            Ok(text) => Some(text),
            Err(e) => {
                debug!(page = index + 1, error = %e, "Skipping unreadable PDF page");
                None
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_pdf(bytes: &[u8]) -> String {
    // lopdf can panic on malformed streams; treat that like any other failure.
    // The process-wide panic hook still runs first, so such a panic also
    // prints its message to stderr. The hook is global and shared with
    // concurrent requests, so it is left alone here.
    let document = match panic::catch_unwind(|| lopdf::Document::load_mem(bytes)) {
        Ok(Ok(document)) => document,
        Ok(Err(e)) => {
            debug!(error = %e, "Failed to load PDF");
            return String::new();
        }
        Err(_) => {
            debug!("PDF loader panicked");
            return String::new();
        }
    };

    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    let pages = page_numbers.into_iter().map(|number| {
        match panic::catch_unwind(AssertUnwindSafe(|| document.extract_text(&[number]))) {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(_) => Err(format!("page {number} extraction panicked")),
        }
    });

    join_pages(pages)
}

fn extract_eml(bytes: &[u8]) -> Option<String> {
    let message = MessageParser::default().parse(bytes)?;

    let body = message
        .body_text(0)
        .map(|text| text.trim().to_string())
        .or_else(|| message.body_html(0).map(|html| strip_html(&html)))
        .unwrap_or_default();

    match message.subject().map(str::trim).filter(|s| !s.is_empty()) {
        Some(subject) => Some(format!("Assunto: {subject}\n\n{body}")),
        None => Some(body),
    }
}

/// Drop tags and collapse whitespace.
fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}
