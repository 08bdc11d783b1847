//! Namespace resolution for raw keys coming from env vars and flags.
//!
//! `POSTGRES_HOST` becomes `POSTGRES.HOST` only when `postgres` is a
//! configured namespace; keys outside every namespace keep their original
//! separators.

fn is_separator(c: char) -> bool {
    matches!(c, '-' | '_' | ':')
}

/// Lowercase, drop empties and duplicates, keep order.
pub fn normalize_namespaces<I, S>(namespaces: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>
{
    let mut normalized: Vec<String> = Vec::new();
    for ns in namespaces {
        let lowered = ns.as_ref().trim().to_lowercase();
        if !lowered.is_empty() && !normalized.contains(&lowered) {
            normalized.push(lowered);
        }
    }
    normalized
}

/// Rewrite `raw` into dotted form if it falls inside one of `namespaces`.
///
/// `namespaces` must already be lowercased (see `normalize_namespaces`).
/// The suffix keeps its original casing.
pub fn resolve(raw: &str, namespaces: &[String]) -> String {
    let candidate: String = raw
        .chars()
        .map(|c| if is_separator(c) { '.' } else { c })
        .collect();
    let lowered = candidate.to_lowercase();

    let inside = namespaces.iter().any(|ns| {
        lowered
            .strip_prefix(ns.as_str())
            .is_some_and(|rest| rest.starts_with('.'))
    });

    if inside { candidate } else { raw.to_string() }
}

/// Remove a literal leading `prefix` from `raw` when present.
pub fn strip_prefix<'a>(raw: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return raw;
    }
    raw.strip_prefix(prefix).unwrap_or(raw)
}

/// Whether `key` is nested below `scope`, i.e. starts with `scope.`
/// (case-insensitively).
pub fn is_within(key: &str, scope: &str) -> bool {
    scope_suffix(key, scope).is_some()
}

/// The part of `key` after `scope.`, if `key` is nested below `scope`.
pub fn scope_suffix<'a>(key: &'a str, scope: &str) -> Option<&'a str> {
    let head = key.get(..scope.len())?;
    if head.to_lowercase() != scope.to_lowercase() {
        return None;
    }
    key[scope.len()..].strip_prefix('.').filter(|rest| !rest.is_empty())
}
