/// Canonical form used for entity identity: lowercased, stripped of common
/// punctuation, whitespace collapsed to single spaces.
///
/// Two mentions refer to the same entity exactly when their normalized forms
/// are equal. Degenerate inputs (all punctuation) normalize to the empty
/// string and must be dropped by the caller.
pub fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | '!' | '?' | ';' | ':' | '\''))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a batch of raw names, dropping empties and keeping the first
/// occurrence of each canonical form in order.
pub fn normalize_all<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for name in names {
        let normalized = normalize(name.as_ref());
        if !normalized.is_empty() && seen.insert(normalized.clone()) {
            out.push(normalized);
        }
    }
    out
}
