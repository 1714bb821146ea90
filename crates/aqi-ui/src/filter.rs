//! Prefix filter applied to the candidate list at render time.

use aqi_client::Place;

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Candidates whose name starts with the capitalized query.
pub fn filter_by_prefix<'a>(places: &'a [Place], query: &str) -> Vec<&'a Place> {
    let prefix = capitalize_first(query);
    places
        .iter()
        .filter(|place| place.name.starts_with(&prefix))
        .collect()
}
