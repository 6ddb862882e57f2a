//! Static route path patterns.
//!
//! # Responsibilities
//! - Parse a configured path into literal, capture and catch-all segments
//! - Match a normalized segment list against a pattern
//!
//! # Design Decisions
//! - Segment-wise matching, no regex
//! - `{name}` binds exactly one segment, `{*name}` binds the remaining
//!   segments (zero or more) and must come last
//! - Captured values are returned raw; decoding is left to the descriptor

use thiserror::Error;

/// Errors raised while parsing a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern '{0}' must start with '/'")]
    MissingLeadingSlash(String),
    #[error("pattern '{0}' has a capture without a name")]
    UnnamedCapture(String),
    #[error("pattern '{0}' has a segment mixing literal text and a capture")]
    MixedSegment(String),
    #[error("pattern '{0}' has a catch-all that is not the last segment")]
    CatchAllNotLast(String),
    #[error("pattern '{pattern}' binds '{name}' more than once")]
    DuplicateCapture { pattern: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(String),
    CatchAll(String),
}

/// Values bound by a successful pattern match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternMatch {
    /// `(name, raw value)` for each `{name}` segment.
    pub captures: Vec<(String, String)>,
    /// Raw segments consumed by a trailing `{*name}`.
    pub rest: Vec<String>,
}

/// A parsed static route path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a pattern such as `/posts/{slug}` or `/files/{*path}`.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        }

        let mut segments = Vec::new();
        let mut names: Vec<&str> = Vec::new();
        let raw: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();

        for (i, token) in raw.iter().enumerate() {
            let segment = match (token.find('{'), token.ends_with('}')) {
                (None, false) if !token.contains('}') => Segment::Literal(token.to_string()),
                (Some(0), true) => {
                    let inner = &token[1..token.len() - 1];
                    let (name, catch_all) = match inner.strip_prefix('*') {
                        Some(name) => (name, true),
                        None => (inner, false),
                    };
                    if name.is_empty() {
                        return Err(PatternError::UnnamedCapture(pattern.to_string()));
                    }
                    if name.contains(['{', '}']) {
                        return Err(PatternError::MixedSegment(pattern.to_string()));
                    }
                    if names.contains(&name) {
                        return Err(PatternError::DuplicateCapture {
                            pattern: pattern.to_string(),
                            name: name.to_string(),
                        });
                    }
                    names.push(name);
                    if catch_all {
                        if i + 1 != raw.len() {
                            return Err(PatternError::CatchAllNotLast(pattern.to_string()));
                        }
                        Segment::CatchAll(name.to_string())
                    } else {
                        Segment::Capture(name.to_string())
                    }
                }
                _ => return Err(PatternError::MixedSegment(pattern.to_string())),
            };
            segments.push(segment);
        }

        Ok(Self { segments })
    }

    /// True when the pattern has no captures.
    pub fn is_literal(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Normalized form: `/` followed by the segments joined with `/`.
    pub fn normalized(&self) -> String {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.clone(),
                Segment::Capture(name) => format!("{{{}}}", name),
                Segment::CatchAll(name) => format!("{{*{}}}", name),
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    /// Match already-split path segments against this pattern.
    pub fn matches(&self, path: &[&str]) -> Option<PatternMatch> {
        let mut found = PatternMatch::default();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::CatchAll(_) => {
                    found.rest = path
                        .get(i..)
                        .unwrap_or_default()
                        .iter()
                        .map(|s| s.to_string())
                        .collect();
                    return Some(found);
                }
                Segment::Literal(text) => {
                    if path.get(i) != Some(&text.as_str()) {
                        return None;
                    }
                }
                Segment::Capture(name) => {
                    let value = path.get(i)?;
                    found.captures.push((name.clone(), value.to_string()));
                }
            }
        }

        if path.len() == self.segments.len() {
            Some(found)
        } else {
            None
        }
    }
}
