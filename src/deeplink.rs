//! Deep-link decomposition
//!
//! Splits a raw deep-link string into its attribution-bearing parts: the
//! query parameters and the fragment parameters. The two halves deliberately
//! behave differently, and callers rely on the asymmetry:
//!
//! - **Query** parameters are standard `key=value&key=value` pairs,
//!   percent-decoded but nothing more (a literal `+` stays a `+`). Lookup is
//!   case-insensitive on the key and the first matching pair wins, repeated
//!   keys included.
//! - **Fragment** parameters use a simplified custom split, not URL
//!   semantics: the fragment is split on `&`, each piece split on `=` with
//!   the first component as key and the last as value (a bare token maps to
//!   itself). Keys are lower-cased during parsing, so lookup is an exact
//!   match against a lower-case key, and a later duplicate overwrites an
//!   earlier one.
//!
//! Parsing never fails: a string that is not a well-formed URL produces an
//! empty [`DeeplinkParams`], indistinguishable from a deep link carrying no
//! parameters. A fragment pair whose percent-encoding is malformed is
//! dropped on its own; the rest of the fragment still parses.

use std::collections::HashMap;

use tracing::debug;
use url::Url;

use crate::error::{AttributionError, Result};

/// Query and fragment parameters extracted from one deep link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeeplinkParams {
    /// Query pairs in document order, percent-decoded.
    query: Vec<(String, String)>,
    /// Fragment pairs, percent-decoded, keys lower-cased, last duplicate wins.
    fragment: HashMap<String, String>,
}

impl DeeplinkParams {
    /// Parses a raw deep-link string.
    ///
    /// Leading and trailing whitespace (including newlines) is trimmed before
    /// parsing. A malformed URL yields an empty result rather than an error.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        let url = match Url::parse(trimmed) {
            Ok(url) => url,
            Err(e) => {
                let err = AttributionError::MalformedDeeplink(e.to_string());
                debug!("ignoring deeplink: {}", err);
                return DeeplinkParams::default();
            }
        };

        let query = url.query().map(parse_query).unwrap_or_default();

        let fragment = url
            .fragment()
            .map(parse_fragment)
            .unwrap_or_default();

        DeeplinkParams { query, fragment }
    }

    /// Looks up a query parameter, case-insensitively. The first matching
    /// pair wins when a key repeats.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Looks up a fragment parameter by exact match. Fragment keys were
    /// lower-cased during parsing, so callers must pass a lower-case key.
    pub fn fragment_value(&self, key: &str) -> Option<&str> {
        self.fragment.get(key).map(String::as_str)
    }

    /// True when neither query nor fragment yielded any parameter.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.fragment.is_empty()
    }
}

/// Splits a raw query string into ordered key/value pairs.
///
/// Values are percent-decoded only — a literal `+` stays a `+`, there is no
/// form-urlencoded handling. The value is everything after the first `=` of
/// a pair; a pair without `=` carries an empty value. A pair whose key or
/// value fails strict percent-decoding is dropped on its own.
fn parse_query(query: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();

    for pair in query.split('&') {
        let (raw_key, raw_value) = match pair.split_once('=') {
            Some((key, value)) => (key, value),
            None => (pair, ""),
        };

        match (unescape_component(raw_key), unescape_component(raw_value)) {
            (Ok(key), Ok(value)) => out.push((key, value)),
            (Err(e), _) | (_, Err(e)) => {
                debug!("dropping query pair {:?}: {}", pair, e);
            }
        }
    }

    out
}

/// Splits a raw (still percent-encoded) fragment into a key/value map.
///
/// Each `&`-separated piece is split on `=`; the first component is the key,
/// the last is the value, so a piece without `=` maps the token to itself.
/// A pair whose key or value fails strict percent-decoding is dropped.
fn parse_fragment(fragment: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();

    for pair in fragment.split('&') {
        let components: Vec<&str> = pair.split('=').collect();
        // split always yields at least one component
        let raw_key = components.first().copied().unwrap_or_default();
        let raw_value = components.last().copied().unwrap_or_default();

        match (unescape_component(raw_key), unescape_component(raw_value)) {
            (Ok(key), Ok(value)) => {
                out.insert(key.to_lowercase(), value);
            }
            (Err(e), _) | (_, Err(e)) => {
                debug!("dropping fragment pair {:?}: {}", pair, e);
            }
        }
    }

    out
}

/// Decodes percent-encoding (%HH) within a string, strictly.
///
/// Unlike lenient decoders that pass malformed escapes through, this rejects
/// truncated escapes, non-hex digits and byte sequences that are not valid
/// UTF-8 after decoding, so the caller can discard the offending pair.
fn unescape_component(input: &str) -> Result<String> {
    let bytes = input.as_bytes();
    let mut unescaped: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                if i + 2 < bytes.len() {
                    let h1 = bytes[i + 1];
                    let h2 = bytes[i + 2];
                    if let (Some(v1), Some(v2)) = (hex_val(h1), hex_val(h2)) {
                        unescaped.push((v1 << 4) | v2);
                        i += 3;
                    } else {
                        return Err(AttributionError::InvalidEncoding(format!(
                            "invalid hex sequence: %{}{}",
                            h1 as char, h2 as char
                        )));
                    }
                } else {
                    return Err(AttributionError::InvalidEncoding(
                        "incomplete escape sequence at end of input".to_string(),
                    ));
                }
            }
            b => {
                unescaped.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(unescaped)
        .map_err(|e| AttributionError::InvalidEncoding(format!("UTF-8 error after unescaping: {}", e)))
}

// Helper to convert a hex character (byte) to its value (0-15)
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_component() {
        assert_eq!(unescape_component("simple").unwrap(), "simple");
        assert_eq!(unescape_component("%20").unwrap(), " ");
        assert_eq!(unescape_component("a%20b%20c").unwrap(), "a b c");
        assert_eq!(unescape_component("%41%42%43").unwrap(), "ABC");
        assert_eq!(unescape_component("%c3%a9").unwrap(), "é"); // UTF-8
        assert_eq!(unescape_component("%25").unwrap(), "%"); // Escaped percent
        assert_eq!(unescape_component("%5Bbatchsdk%5D").unwrap(), "[batchsdk]");
    }

    #[test]
    fn test_unescape_component_invalid() {
        assert!(unescape_component("%").is_err()); // Incomplete
        assert!(unescape_component("%2").is_err()); // Incomplete
        assert!(unescape_component("%G0").is_err()); // Invalid hex
        assert!(unescape_component("%2G").is_err()); // Invalid hex
        assert!(unescape_component("%AF%").is_err()); // Incomplete at end
        assert!(unescape_component("%C0%80").is_err()); // Invalid UTF-8 after decoding
    }

    #[test]
    fn parses_query_and_fragment() {
        let params =
            DeeplinkParams::parse("https://batch.com/landing?utm_source=sdk&x=1#utm_content=n1&b=2");

        assert_eq!(params.query_value("utm_source"), Some("sdk"));
        assert_eq!(params.query_value("x"), Some("1"));
        assert_eq!(params.fragment_value("utm_content"), Some("n1"));
        assert_eq!(params.fragment_value("b"), Some("2"));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let params = DeeplinkParams::parse("    \n   https://batch.com?utm_source=sdk   \n  ");
        assert_eq!(params.query_value("utm_source"), Some("sdk"));
    }

    #[test]
    fn malformed_url_yields_empty_params() {
        assert!(DeeplinkParams::parse("not a url at all").is_empty());
        assert!(DeeplinkParams::parse("").is_empty());
    }

    #[test]
    fn query_lookup_is_case_insensitive_first_wins() {
        let params = DeeplinkParams::parse("https://batch.com?UtM_coNTEnt=first&utm_content=second");
        assert_eq!(params.query_value("utm_content"), Some("first"));
    }

    #[test]
    fn query_values_are_percent_decoded() {
        let params = DeeplinkParams::parse("https://batch.com?utm_source=%5Bbatchsdk%5D");
        assert_eq!(params.query_value("utm_source"), Some("[batchsdk]"));
    }

    #[test]
    fn query_plus_sign_stays_literal() {
        let params =
            DeeplinkParams::parse("https://batch.com?utm_campaign=summer+sale&utm_content=a%20b");
        assert_eq!(params.query_value("utm_campaign"), Some("summer+sale"));
        assert_eq!(params.query_value("utm_content"), Some("a b"));
    }

    #[test]
    fn query_value_is_tail_after_first_equals() {
        let params = DeeplinkParams::parse("https://batch.com?k=a=b");
        assert_eq!(params.query_value("k"), Some("a=b"));
    }

    #[test]
    fn query_pair_with_bad_escape_is_dropped_alone() {
        let params = DeeplinkParams::parse("https://batch.com?bad=%GG&good=kept");
        assert_eq!(params.query_value("bad"), None);
        assert_eq!(params.query_value("good"), Some("kept"));
    }

    #[test]
    fn fragment_keys_are_lowercased_last_wins() {
        let params = DeeplinkParams::parse("https://batch.com#uTm_CoNtEnT=first&UTM_CONTENT=second");
        assert_eq!(params.fragment_value("utm_content"), Some("second"));
        // lookup is exact, not case-insensitive
        assert_eq!(params.fragment_value("UTM_CONTENT"), None);
    }

    #[test]
    fn fragment_bare_token_maps_to_itself() {
        let params = DeeplinkParams::parse("https://batch.com#standalone");
        assert_eq!(params.fragment_value("standalone"), Some("standalone"));
    }

    #[test]
    fn fragment_value_takes_last_component() {
        // split on '=', key is the first component and value the last
        let params = DeeplinkParams::parse("https://batch.com#k=a=b");
        assert_eq!(params.fragment_value("k"), Some("b"));
    }

    #[test]
    fn fragment_pair_with_bad_escape_is_dropped_alone() {
        let params = DeeplinkParams::parse("https://batch.com#bad=%GG&good=kept");
        assert_eq!(params.fragment_value("bad"), None);
        assert_eq!(params.fragment_value("good"), Some("kept"));
    }

    #[test]
    fn no_query_no_fragment() {
        let params = DeeplinkParams::parse("https://batch.com/plain");
        assert!(params.is_empty());
        assert_eq!(params.query_value("utm_source"), None);
        assert_eq!(params.fragment_value("utm_source"), None);
    }
}
