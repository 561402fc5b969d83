//! Canonical HCL formatting
//!
//! Parses draft text with `hcl-rs` and prints it back in its canonical layout.
//! Unparseable drafts are an error carrying the draft and, when the parser
//! reports it, the failing location.

use crate::error::FormatError;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default)]
pub struct Canonicalizer;

fn location_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"line (\d+), column (\d+)|(\d+):(\d+)").expect("static regex")
    })
}

/// Best-effort line/column extraction from a parser message
fn locate(message: &str) -> (Option<usize>, Option<usize>) {
    let Some(cap) = location_regex().captures(message) else {
        return (None, None);
    };

    let line = cap.get(1).or_else(|| cap.get(3)).and_then(|m| m.as_str().parse().ok());
    let column = cap.get(2).or_else(|| cap.get(4)).and_then(|m| m.as_str().parse().ok());
    (line, column)
}

impl Canonicalizer {
    pub fn new() -> Self {
        Self
    }

    /// Re-emit `draft` in canonical layout. Idempotent on its own output.
    pub fn canonicalize(&self, draft: &str) -> Result<String, FormatError> {
        let body: hcl::Body = hcl::parse(draft).map_err(|e| {
            let message = e.to_string();
            let (line, column) = locate(&message);
            tracing::error!("generated HCL does not parse: {}", message);
            FormatError {
                message,
                line,
                column,
                draft: draft.to_string(),
            }
        })?;

        hcl::format::to_string(&body).map_err(|e| FormatError {
            message: e.to_string(),
            line: None,
            column: None,
            draft: draft.to_string(),
        })
    }
}
