//! Recover a JSON object from a free-form model reply
//!
//! Models wrap their answer in reasoning, markdown fences, or trailing
//! commentary, and occasionally emit trailing commas or stop before the
//! final brace. This module finds the most likely JSON candidate, applies a
//! small set of syntax repairs, and reports exactly where a candidate that
//! still fails to parse went wrong.

use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// Bytes of context captured either side of a parse defect
pub const DEFECT_CONTEXT_BYTES: usize = 40;

const FENCE: &str = "```";

/// A syntax repair applied to a candidate before parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    /// Commas removed immediately before `}` or `]`
    TrailingCommas(usize),

    /// An unterminated string literal was closed
    ClosedString,

    /// Closing characters appended to balance the openers
    AppendedClosers(String),
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repair::TrailingCommas(n) => write!(f, "removed {} trailing comma(s)", n),
            Repair::ClosedString => write!(f, "closed unterminated string"),
            Repair::AppendedClosers(s) => write!(f, "appended '{}'", s),
        }
    }
}

/// Where and why a candidate failed strict parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDefect {
    /// Parser message
    pub message: String,

    /// Byte offset into the repaired candidate
    pub offset: usize,

    /// Up to 40 bytes either side of `offset`
    pub context: String,

    /// The repaired candidate that was handed to the parser
    pub candidate: String,
}

impl fmt::Display for ParseDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at byte {} near `{}`",
            self.message, self.offset, self.context
        )
    }
}

/// Result of parsing a model reply
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// A JSON object was recovered
    Parsed {
        /// The top-level object, key order preserved
        object: Map<String, Value>,
        /// Repairs that were needed to get there
        repairs: Vec<Repair>,
    },

    /// A candidate was found but is not a valid JSON object
    Malformed(ParseDefect),

    /// Nothing resembling a JSON object was found
    NoJson,
}

impl ParseOutcome {
    /// Consume the outcome, keeping only a parsed object
    pub fn into_object(self) -> Option<Map<String, Value>> {
        match self {
            ParseOutcome::Parsed { object, .. } => Some(object),
            _ => None,
        }
    }

    /// Whether an object was recovered
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed { .. })
    }
}

/// Parse a model reply into a JSON object
///
/// Never panics; every input maps to one of the three outcomes.
///
/// # Examples
///
/// ```
/// use intake_extractor::{parse_response, ParseOutcome};
///
/// let reply = "<think>easy</think>\n```json\n{\"Gender\": \"Female\",}\n```";
/// match parse_response(reply) {
///     ParseOutcome::Parsed { object, .. } => assert_eq!(object["Gender"], "Female"),
///     other => panic!("unexpected outcome: {:?}", other),
/// }
/// ```
pub fn parse_response(text: &str) -> ParseOutcome {
    let Some(candidate) = find_candidate(text) else {
        return ParseOutcome::NoJson;
    };

    let mut repairs = Vec::new();

    let (without_commas, removed) = remove_trailing_commas(candidate);
    if removed > 0 {
        repairs.push(Repair::TrailingCommas(removed));
    }

    let repaired = match close_openers(&without_commas) {
        Some(closed) => {
            repairs.extend(closed.repairs);
            closed.text
        }
        None => without_commas,
    };

    if !repairs.is_empty() {
        debug!(repairs = ?repairs, "repaired JSON candidate");
    }

    match serde_json::from_str::<Value>(&repaired) {
        Ok(Value::Object(object)) => ParseOutcome::Parsed { object, repairs },
        Ok(other) => ParseOutcome::Malformed(ParseDefect {
            message: format!("top-level value is {}, expected an object", kind_of(&other)),
            offset: 0,
            context: context_window(&repaired, 0),
            candidate: repaired,
        }),
        Err(e) => {
            let offset = byte_offset(&repaired, e.line(), e.column());
            ParseOutcome::Malformed(ParseDefect {
                message: e.to_string(),
                offset,
                context: context_window(&repaired, offset),
                candidate: repaired,
            })
        }
    }
}

/// Locate the JSON candidate: a fenced block first, then a brace scan
pub(crate) fn find_candidate(text: &str) -> Option<&str> {
    fenced_candidate(text).or_else(|| scanned_candidate(text))
}

/// Content of the first ```json fence, or of a bare fence holding an object
fn fenced_candidate(text: &str) -> Option<&str> {
    let mut search_from = 0;

    while let Some(found) = text[search_from..].find(FENCE) {
        let after_fence = search_from + found + FENCE.len();
        let rest = &text[after_fence..];

        let lang_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        let lang = &rest[..lang_len];
        let body_start = after_fence + lang_len;

        let (body, next) = match text[body_start..].find(FENCE) {
            Some(end) => (
                &text[body_start..body_start + end],
                body_start + end + FENCE.len(),
            ),
            None => (&text[body_start..], text.len()),
        };

        let body = body.trim();
        if lang.eq_ignore_ascii_case("json") || (lang.is_empty() && body.starts_with('{')) {
            return Some(body);
        }

        if next >= text.len() {
            break;
        }
        search_from = next;
    }

    None
}

/// From the first `{`, scan until depth returns to zero (or take the rest)
fn scanned_candidate(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    Some(&text[start..])
}

/// Drop commas that sit directly (modulo whitespace) before `}` or `]`
fn remove_trailing_commas(candidate: &str) -> (String, usize) {
    let chars: Vec<char> = candidate.chars().collect();
    let mut out = String::with_capacity(candidate.len());
    let mut removed = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            out.push(c);
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
                if matches!(next, Some('}') | Some(']')) {
                    removed += 1;
                } else {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    (out, removed)
}

struct Closed {
    text: String,
    repairs: Vec<Repair>,
}

/// Append the closers needed to balance unclosed `{` and `[`
///
/// Returns `None` when the candidate has a mismatched or extra closer;
/// those are left for the parser to report.
fn close_openers(candidate: &str) -> Option<Closed> {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in candidate.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.pop() != Some(c) {
                    return None;
                }
            }
            _ => {}
        }
    }

    let mut text = candidate.to_string();
    let mut repairs = Vec::new();

    if in_string && !escaped {
        text.push('"');
        repairs.push(Repair::ClosedString);
    }

    if !stack.is_empty() {
        let closers: String = stack.iter().rev().collect();
        text.push_str(&closers);
        repairs.push(Repair::AppendedClosers(closers));
    }

    Some(Closed { text, repairs })
}

/// Convert serde_json's 1-based line/column into a byte offset
fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

fn context_window(text: &str, offset: usize) -> String {
    let mut start = offset.saturating_sub(DEFECT_CONTEXT_BYTES);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (offset + DEFECT_CONTEXT_BYTES).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }
    text[start..end].to_string()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
