//! Free/nonfree classification of SPDX license expressions.
//!
//! This is a token scan, not a full SPDX parser: the expression is split
//! into tokens, operators and grammar are skipped, and the whole license is
//! considered free until a nonfree token is found. Anything that does not
//! look like an SPDX identifier degrades to nonfree.

fn is_operator(token: &str) -> bool {
    matches!(
        token,
        "AND" | "OR" | "WITH" | "and" | "or" | "with" | "&" | "|" | "+"
    )
}

fn looks_like_spdx_id(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+'))
}

fn token_is_nonfree(token: &str) -> bool {
    // explicitly marked proprietary
    if token.starts_with("LicenseRef-proprietary") {
        return true;
    }
    // custom license refs without a known classification
    if token.starts_with("LicenseRef-") {
        return false;
    }
    !looks_like_spdx_id(token)
}

/// Returns true if every token of the SPDX expression is a free license.
pub(crate) fn license_is_free(license: &str) -> bool {
    license
        .split([' ', '(', ')'])
        .filter(|t| !t.is_empty() && !is_operator(t))
        .all(|t| !token_is_nonfree(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spdx_expressions_are_free() {
        assert!(license_is_free("GPL-3.0-or-later"));
        assert!(license_is_free("GPL-2.0+ AND LGPL-2.1+"));
        assert!(license_is_free("(MIT OR Apache-2.0) AND CC0-1.0"));
    }

    #[test]
    fn proprietary_ref_is_nonfree() {
        assert!(!license_is_free("LicenseRef-proprietary"));
        assert!(!license_is_free("GPL-2.0 AND LicenseRef-proprietary=Example"));
    }

    #[test]
    fn junk_degrades_to_nonfree() {
        assert!(!license_is_free("Some random license text"));
    }
}
