//! Percent-encoding for the free-text fields the platform stores verbatim.

use std::collections::BTreeMap;

/// Left unescaped by `encodeURIComponent` but escaped by `urlencoding`.
const COMPONENT_SAFE: [(&str, &str); 5] = [("%21", "!"), ("%27", "'"), ("%28", "("), ("%29", ")"), ("%2A", "*")];

/// Same output as the storefront's `encodeURIComponent`: unreserved
/// characters and `!'()*` pass through, everything else is UTF-8 `%XX`.
pub(crate) fn percent_encode(value: &str) -> String {
    let encoded = urlencoding::encode(value);
    // A literal `%` is already `%25`, so these triples only come from the escaped characters.
    COMPONENT_SAFE
        .iter()
        .fold(encoded.into_owned(), |acc, (escaped, raw)| acc.replace(escaped, raw))
}

/// Encode both keys and values of a string map.
pub(crate) fn percent_encode_map(map: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    map.iter()
        .map(|(key, value)| (percent_encode(key), percent_encode(value)))
        .collect()
}
