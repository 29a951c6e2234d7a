//! Username derivation from the email local part.

use std::collections::HashSet;

/// Local part of `email`, or the whole string when there is no `@`.
pub fn user_name_base(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// `base` itself when free, else `base` followed by the smallest positive
/// integer suffix not in `taken`.
pub fn derive_user_name(email: &str, taken: &HashSet<String>) -> String {
    let base = user_name_base(email);
    if !taken.contains(base) {
        return base.to_string();
    }
    (1u64..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}
