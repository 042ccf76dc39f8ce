//! Route matching for proxy paths.
//!
//! # Path Grammar
//!
//! ```text
//! /{signature}?/?{resize}?/?{gravity}?/?{upstream}
//!
//! signature  exactly 10 of [a-z0-9]
//! resize     :?[0-9]*x+[0-9]*
//! gravity    nw | n | ne | w | c | e | sw | s | se
//! upstream   remainder, starting at the first http: / https: marker
//!            (percent-escaped http%3A / https%3A also recognized)
//! ```
//!
//! The option segments are disambiguated by character class, not by position:
//! every combination of present and absent segments is tried, longest forms
//! first, and the first combination that consumes the whole option prefix wins.

use std::ops::Range;

use super::gravity::{Gravity, GRAVITY_CODES};
use crate::error::RetrievalError;

/// Length of a signature segment.
pub const SIGNATURE_LEN: usize = 10;

const SCHEME_MARKERS: [&str; 4] = ["http:", "https:", "http%3a", "https%3a"];

/// Outcome of matching a path against the proxy grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    Matched(RequestDescriptor),
    Miss,
}

/// Fields decoded from a matching request path. Built once per request and
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    signature_token: Option<String>,
    resize_spec: Option<String>,
    gravity_code: Option<String>,
    escaped_url: String,
}

impl RequestDescriptor {
    /// Signature segment, if present.
    pub fn signature_token(&self) -> Option<&str> {
        self.signature_token.as_deref()
    }

    /// Raw resize token, if present and non-empty.
    pub fn resize_spec(&self) -> Option<&str> {
        self.resize_spec.as_deref()
    }

    /// Raw gravity shorthand, if present.
    pub fn gravity_code(&self) -> Option<&str> {
        self.gravity_code.as_deref()
    }

    /// Resolved gravity, `Center` when absent.
    pub fn gravity(&self) -> Gravity {
        Gravity::from_code(self.gravity_code())
    }

    /// Upstream URL exactly as it appeared in the path.
    pub fn escaped_url(&self) -> &str {
        &self.escaped_url
    }

    /// Percent-decoded upstream URL.
    ///
    /// This departs from form decoding (`application/x-www-form-urlencoded`):
    /// `+` is kept literally instead of becoming a space, since it is a
    /// legal path character in the embedded URL. Spaces must be sent as
    /// `%20`.
    pub fn upstream_url(&self) -> Result<String, RetrievalError> {
        urlencoding::decode(&self.escaped_url)
            .map(|url| url.into_owned())
            .map_err(|e| RetrievalError::InvalidUrl {
                url: self.escaped_url.clone(),
                reason: e.to_string(),
            })
    }
}

/// Match a normalized path against the proxy grammar.
pub fn match_route(path: &str) -> RouteMatch {
    let Some(rest) = path.strip_prefix('/') else {
        return RouteMatch::Miss;
    };
    let Some(url_start) = find_scheme_marker(rest) else {
        return RouteMatch::Miss;
    };
    let (options, escaped_url) = rest.split_at(url_start);

    match parse_options(options.as_bytes()) {
        Some(segments) => RouteMatch::Matched(RequestDescriptor {
            signature_token: segments.signature.map(|r| options[r].to_string()),
            resize_spec: segments.resize.map(|r| options[r].to_string()),
            gravity_code: segments.gravity.map(|r| options[r].to_string()),
            escaped_url: escaped_url.to_string(),
        }),
        None => RouteMatch::Miss,
    }
}

/// Byte offset of the first scheme marker in `rest`.
fn find_scheme_marker(rest: &str) -> Option<usize> {
    let lower = rest.to_ascii_lowercase();
    (0..lower.len()).find(|&start| {
        rest.is_char_boundary(start)
            && SCHEME_MARKERS
                .iter()
                .any(|marker| lower[start..].starts_with(marker))
            && rest[start..].starts_with("http")
    })
}

#[derive(Debug)]
struct Segments {
    signature: Option<Range<usize>>,
    resize: Option<Range<usize>>,
    gravity: Option<Range<usize>>,
}

fn parse_options(options: &[u8]) -> Option<Segments> {
    for (signature, pos) in signature_candidates(options) {
        for pos in optional_slash(options, pos) {
            for (resize, pos) in resize_candidates(options, pos) {
                for pos in optional_slash(options, pos) {
                    for (gravity, pos) in gravity_candidates(options, pos) {
                        if optional_slash(options, pos).contains(&options.len()) {
                            return Some(Segments {
                                signature,
                                resize,
                                gravity,
                            });
                        }
                    }
                }
            }
        }
    }
    None
}

type Candidate = (Option<Range<usize>>, usize);

fn signature_candidates(options: &[u8]) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(2);
    let is_signature = options.len() >= SIGNATURE_LEN
        && options[..SIGNATURE_LEN]
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    if is_signature {
        candidates.push((Some(0..SIGNATURE_LEN), SIGNATURE_LEN));
    }
    candidates.push((None, 0));
    candidates
}

fn optional_slash(options: &[u8], pos: usize) -> Vec<usize> {
    if options.get(pos) == Some(&b'/') {
        vec![pos + 1, pos]
    } else {
        vec![pos]
    }
}

/// Greedy `:?[0-9]*x+[0-9]*`. Shorter matches never help: the leftover
/// digits or `x` could not start a gravity code or a slash.
fn resize_candidates(options: &[u8], start: usize) -> Vec<Candidate> {
    let mut pos = start;
    if options.get(pos) == Some(&b':') {
        pos += 1;
    }
    pos += count_while(&options[pos..], |b| b.is_ascii_digit());
    let separators = count_while(&options[pos..], |b| b == b'x');

    let mut candidates = Vec::with_capacity(2);
    if separators > 0 {
        pos += separators;
        pos += count_while(&options[pos..], |b| b.is_ascii_digit());
        candidates.push((Some(start..pos), pos));
    }
    candidates.push((None, start));
    candidates
}

fn gravity_candidates(options: &[u8], start: usize) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = GRAVITY_CODES
        .iter()
        .filter(|code| options[start..].starts_with(code.as_bytes()))
        .map(|code| (Some(start..start + code.len()), start + code.len()))
        .collect();
    candidates.push((None, start));
    candidates
}

fn count_while(bytes: &[u8], predicate: impl Fn(u8) -> bool) -> usize {
    bytes.iter().take_while(|&&b| predicate(b)).count()
}
