//! Email address syntax check.

/// Returns whether `candidate` looks like an email address.
///
/// The check is deliberately loose: exactly one `@` with a non-empty
/// local part before it and a non-empty domain after it, and no
/// whitespace anywhere. Deliverability is not checked.
///
/// # Example
///
/// ```
/// use friendnet_core::email::is_email;
///
/// assert!(is_email("andy@example.com"));
/// assert!(!is_email("haha.haha.com"));
/// assert!(!is_email("@example.com"));
/// ```
#[must_use]
pub fn is_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }

    match candidate.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
