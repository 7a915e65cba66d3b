//! Helpers over presentation-form domain names.

/// Returns `name` with a trailing dot. The empty name is the root, `"."`.
pub fn fqdn(name: &str) -> String {
    if is_fqdn(name) {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

/// A name is fully qualified when it ends in an unescaped dot.
pub fn is_fqdn(name: &str) -> bool {
    let Some(stripped) = name.strip_suffix('.') else {
        return false;
    };
    let backslashes = stripped.bytes().rev().take_while(|b| *b == b'\\').count();
    backslashes % 2 == 0
}

/// Number of labels in `name`, not counting the root.
pub fn count_labels(name: &str) -> usize {
    let trimmed = name.trim_end_matches('.');
    if trimmed.is_empty() {
        return 0;
    }
    trimmed.split('.').filter(|label| !label.is_empty()).count()
}

/// Compares two names the way DNS does: ASCII case-insensitively, ignoring
/// a trailing root dot.
pub fn names_equal(a: &str, b: &str) -> bool {
    let a = a.strip_suffix('.').unwrap_or(a);
    let b = b.strip_suffix('.').unwrap_or(b);
    a.eq_ignore_ascii_case(b)
}

/// Expands `partial` into the fully qualified names a stub resolver would try,
/// in order.
///
/// A name that is already fully qualified yields only itself. Otherwise a name
/// with more than `ndots` labels is tried as-is first, then with every search
/// domain appended, and last as-is when it has `ndots` labels or fewer.
pub fn search_candidates(partial: &str, ndots: usize, search: &[String]) -> Vec<String> {
    if is_fqdn(partial) {
        return vec![partial.to_string()];
    }

    let fq = fqdn(partial);
    let labels = count_labels(partial);
    let mut candidates = Vec::with_capacity(search.len() + 1);

    if labels > ndots {
        candidates.push(fq.clone());
    }
    for domain in search {
        candidates.push(fqdn(&format!("{}{}", fq, domain.trim_start_matches('.'))));
    }
    if labels <= ndots {
        candidates.push(fq);
    }
    candidates
}
