//! PDF text extraction
//!
//! Extracts plain text from an uploaded PDF using lopdf. A document from
//! which no text can be recovered is reported as corrupted input; no session
//! is created for it.

use crate::errors::AppError;
use tracing::{debug, warn};

/// Extract the full text content from in-memory PDF bytes
pub fn extract_text(bytes: &[u8]) -> Result<String, AppError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| AppError::ExtractionFailed {
        message: format!("Failed to load PDF: {}", e),
    })?;

    let mut text = String::new();
    let pages = doc.get_pages();

    debug!(page_count = pages.len(), "Extracting text from PDF");

    for (page_num, _) in pages.iter() {
        match extract_page_text(&doc, *page_num) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => {
                warn!(page = page_num, error = %e, "Failed to extract text from page, skipping");
            }
        }
    }

    if text.trim().is_empty() {
        return Err(AppError::ExtractionFailed {
            message: "No text content extracted from PDF".to_string(),
        });
    }

    let cleaned = clean_text(&text);

    debug!(
        original_len = text.len(),
        cleaned_len = cleaned.len(),
        "Text extraction complete"
    );

    Ok(cleaned)
}

/// Extract text from a single page
fn extract_page_text(doc: &lopdf::Document, page_num: u32) -> Result<String, String> {
    let page_id = doc
        .page_iter()
        .nth((page_num - 1) as usize)
        .ok_or_else(|| format!("Page {} not found", page_num))?;

    let content = doc.get_page_content(page_id).map_err(|e| e.to_string())?;

    Ok(extract_text_from_content(&content))
}

/// Extract text from a PDF content stream
fn extract_text_from_content(content: &[u8]) -> String {
    // Text lives between BT and ET operators
    let content_str = String::from_utf8_lossy(content);
    let mut text = String::new();
    let mut in_text_block = false;
    let mut current_text = String::new();

    for line in content_str.lines() {
        let trimmed = line.trim();

        if trimmed == "BT" {
            in_text_block = true;
            continue;
        }

        if trimmed == "ET" {
            in_text_block = false;
            if !current_text.is_empty() {
                text.push_str(&current_text);
                text.push(' ');
                current_text.clear();
            }
            continue;
        }

        if in_text_block {
            // Text showing operators: Tj, TJ, ', "
            if let Some(text_content) = extract_text_from_operator(trimmed) {
                current_text.push_str(&text_content);
            }
        }
    }

    text
}

/// Extract text from a PDF text operator
fn extract_text_from_operator(line: &str) -> Option<String> {
    // (text) Tj
    if line.ends_with("Tj") || line.ends_with("'") || line.ends_with("\"") {
        if let Some(start) = line.find('(') {
            if let Some(end) = line.rfind(')') {
                let text = &line[start + 1..end];
                return Some(decode_pdf_string(text));
            }
        }
    }

    // [(text) num (text) num] TJ
    if line.ends_with("TJ") {
        let mut result = String::new();
        let mut in_paren = false;
        let mut current = String::new();

        for ch in line.chars() {
            match ch {
                '(' => {
                    in_paren = true;
                }
                ')' => {
                    in_paren = false;
                    result.push_str(&decode_pdf_string(&current));
                    current.clear();
                }
                _ if in_paren => {
                    current.push(ch);
                }
                _ => {}
            }
        }

        if !result.is_empty() {
            return Some(result);
        }
    }

    None
}

/// Decode PDF string escapes
fn decode_pdf_string(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('(') => result.push('('),
                Some(')') => result.push(')'),
                Some(c) => result.push(c),
                None => {}
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Clean extracted text
fn clean_text(text: &str) -> String {
    text
        // Collapse runs of whitespace
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{FEFF}', "")
        // Normalize typographic quotes
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
}
