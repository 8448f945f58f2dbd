//! Route patterns: `/literal/{name}/literal2`.
//!
//! A pattern is split on `/` into segments; a segment that is exactly `{name}` is a
//! parameter placeholder, everything else is a literal. Matching is pairwise and
//! left to right: literals must be equal, placeholders capture the incoming segment
//! unconditionally (the empty string included). No regex, no backtracking.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::str::{FromStr, Utf8Error};

use percent_encoding::percent_decode_str;

use crate::RouterError;

/// Split a path exactly like the route table does: on every `/`, keeping empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').collect()
}

/// Percent-decode a whole request path before it is split, so `%2F` becomes a separator.
/// Escapes that are not two hex digits are kept as written; decoded bytes must be UTF-8.
pub fn decode_path(path: &str) -> Result<Cow<'_, str>, Utf8Error> {
    percent_decode_str(path).decode_utf8()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// Parameters captured from `{name}` segments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn insert(&mut self, name: String, value: String) {
        self.values.insert(name, value);
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Params {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        }
    }
}

/// A validated route pattern.
#[derive(Clone, Debug)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse and validate. Unbalanced or nested braces, a placeholder that does not span
    /// its whole segment, an empty name, or a name used twice are all `MalformedPattern`.
    pub fn parse(raw: &str) -> Result<Self, RouterError> {
        let mut seen = HashSet::new();
        let mut segments = Vec::new();
        for part in split_path(raw) {
            let segment = parse_segment(raw, part)?;
            if let Segment::Param(name) = &segment {
                if !seen.insert(name.clone()) {
                    return Err(malformed(raw, format!("duplicate parameter name {:?}", name)));
                }
            }
            segments.push(segment);
        }
        Ok(Self {
            raw: raw.to_owned(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of literal segments; used to rank routes by specificity.
    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Match already-split incoming segments. Captures go into a map owned by this
    /// call, so a failed attempt leaves nothing behind.
    pub fn matches(&self, incoming: &[&str]) -> Option<Params> {
        if self.segments.len() != incoming.len() {
            return None;
        }
        let mut params = Params::default();
        for (segment, part) in self.segments.iter().zip(incoming) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.insert(name.clone(), (*part).to_owned()),
            }
        }
        Some(params)
    }

    /// Convenience for callers holding an unsplit path.
    pub fn matches_path(&self, path: &str) -> Option<Params> {
        self.matches(&split_path(path))
    }
}

impl FromStr for Pattern {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_segment(pattern: &str, part: &str) -> Result<Segment, RouterError> {
    if !part.contains(['{', '}']) {
        return Ok(Segment::Literal(part.to_owned()));
    }
    let mut level = 0i32;
    for c in part.chars() {
        match c {
            '{' => {
                level += 1;
                if level > 1 {
                    return Err(malformed(pattern, format!("nested braces in segment {:?}", part)));
                }
            }
            '}' => {
                level -= 1;
                if level < 0 {
                    return Err(malformed(pattern, format!("unbalanced braces in segment {:?}", part)));
                }
            }
            _ => {}
        }
    }
    if level != 0 {
        return Err(malformed(pattern, format!("unbalanced braces in segment {:?}", part)));
    }
    let name = part
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|name| !name.contains(['{', '}']))
        .ok_or_else(|| {
            malformed(pattern, format!("placeholder must span the whole segment in {:?}", part))
        })?;
    if name.is_empty() {
        return Err(malformed(pattern, "empty parameter name".to_owned()));
    }
    Ok(Segment::Param(name.to_owned()))
}

fn malformed(pattern: &str, reason: String) -> RouterError {
    RouterError::MalformedPattern {
        pattern: pattern.to_owned(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(raw: &str) -> Pattern {
        Pattern::parse(raw).unwrap()
    }

    #[test]
    fn parses_literals_and_params() {
        let p = pattern("/activities/{activityId}");
        assert_eq!(
            p.segments(),
            &[
                Segment::Literal(String::new()),
                Segment::Literal("activities".into()),
                Segment::Param("activityId".into()),
            ]
        );
        assert_eq!(p.literal_count(), 2);
        assert_eq!(p.to_string(), "/activities/{activityId}");
    }

    #[test]
    fn literal_match_captures_nothing() {
        let params = pattern("/accounts").matches_path("/accounts").unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn param_segment_captures_value() {
        let params = pattern("/activities/types/{typeId}")
            .matches_path("/activities/types/3")
            .unwrap();
        assert_eq!(params.get("typeId"), Some("3"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn captures_every_parameter_regardless_of_content() {
        let p = pattern("/{a}/x/{b}");
        let params = p.matches_path("/hello world/x/%2F..").unwrap();
        assert_eq!(params.get("a"), Some("hello world"));
        assert_eq!(params.get("b"), Some("%2F.."));
    }

    // Empty captures are accepted here on purpose; handlers reject them if they care.
    #[test]
    fn param_matches_empty_segment() {
        let params = pattern("/activities/{activityId}")
            .matches_path("/activities/")
            .unwrap();
        assert_eq!(params.get("activityId"), Some(""));
    }

    #[test]
    fn segment_count_mismatch_is_no_match() {
        let p = pattern("/activities/{id}");
        assert!(p.matches_path("/activities").is_none());
        assert!(p.matches_path("/activities/1/2").is_none());
        assert!(pattern("/activities").matches_path("/activities/42").is_none());
    }

    #[test]
    fn literal_mismatch_is_no_match() {
        assert!(pattern("/accounts/{id}").matches_path("/activities/1").is_none());
        assert!(pattern("/accounts").matches_path("/Accounts").is_none());
    }

    #[test]
    fn root_pattern_matches_only_root() {
        let p = pattern("/");
        assert!(p.matches_path("/").is_some());
        assert!(p.matches_path("/x").is_none());
        assert!(p.matches_path("").is_none());
    }

    #[test]
    fn rejects_malformed_patterns() {
        for raw in [
            "/x/{a",
            "/x/a}",
            "/x/{}",
            "/x/{{a}}",
            "/x/a{b}",
            "/x/{a}b",
            "/x/}{",
            "/x/{a}/{a}",
            "/{a/b}",
        ] {
            let err = Pattern::parse(raw).unwrap_err();
            let RouterError::MalformedPattern { pattern, .. } = err;
            assert_eq!(pattern, raw);
        }
    }

    #[test]
    fn from_str_parses() {
        let p: Pattern = "/accounts/{accountId}".parse().unwrap();
        assert_eq!(p.as_str(), "/accounts/{accountId}");
    }

    #[test]
    fn params_collect_from_pairs() {
        let params: Params = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(params.get("b"), Some("2"));
        assert_eq!(params.iter().count(), 2);
    }
}
