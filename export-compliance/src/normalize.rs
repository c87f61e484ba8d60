//! Search corpus construction

/// Join the free-text product fields into one lowercase corpus.
///
/// Empty fields are skipped so that all-empty input yields an empty corpus.
pub fn normalize(spec_text: &str, item_name: &str, params_text: &str) -> String {
    [spec_text, item_name, params_text]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
