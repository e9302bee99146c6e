//! The five-segment unique-id used for de-duplication and lookup.
//!
//! The format is `scope/bundle_kind/origin/id/branch` where any unset
//! segment renders as the literal `*`, which also acts as a wildcard when
//! matching two unique-ids against each other.

/// Where the app is visible once installed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord)]
pub enum Scope {
    #[default]
    Unknown,
    User,
    System,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Unknown => "*",
            Scope::User => "user",
            Scope::System => "system",
        }
    }

    pub fn from_str(value: &str) -> Scope {
        match value {
            "user" => Scope::User,
            "system" => Scope::System,
            _ => Scope::Unknown,
        }
    }
}

/// The packaging technology that delivers the app.
///
/// Declaration order doubles as the de-duplication tie-break order: when two
/// apps have equal priority the lower bundle kind wins.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord)]
pub enum BundleKind {
    #[default]
    Unknown,
    Flatpak,
    Snap,
    Package,
    AppImage,
    Tarball,
}

impl BundleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BundleKind::Unknown => "*",
            BundleKind::Flatpak => "flatpak",
            BundleKind::Snap => "snap",
            BundleKind::Package => "package",
            BundleKind::AppImage => "appimage",
            BundleKind::Tarball => "tarball",
        }
    }

    pub fn from_str(value: &str) -> BundleKind {
        match value {
            "flatpak" => BundleKind::Flatpak,
            "snap" => BundleKind::Snap,
            "package" => BundleKind::Package,
            "appimage" => BundleKind::AppImage,
            "tarball" => BundleKind::Tarball,
            _ => BundleKind::Unknown,
        }
    }
}

fn segment(value: Option<&str>) -> &str {
    match value {
        Some(s) if !s.is_empty() => s,
        _ => "*",
    }
}

/// Compose the canonical unique-id string.
pub(crate) fn build_unique_id(
    scope: Scope,
    bundle_kind: BundleKind,
    origin: Option<&str>,
    id: Option<&str>,
    branch: Option<&str>,
) -> String {
    format!(
        "{}/{}/{}/{}/{}",
        scope.as_str(),
        bundle_kind.as_str(),
        segment(origin),
        segment(id),
        segment(branch)
    )
}

/// The fields recovered from parsing a unique-id string.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ParsedUniqueId {
    pub scope: Scope,
    pub bundle_kind: BundleKind,
    pub origin: Option<String>,
    pub id: Option<String>,
    pub branch: Option<String>,
}

/// Parse a unique-id string, returning `None` on a wrong segment count.
/// `*` segments parse as unset.
pub(crate) fn parse_unique_id(unique_id: &str) -> Option<ParsedUniqueId> {
    let split: Vec<&str> = unique_id.split('/').collect();
    if split.len() != 5 {
        return None;
    }
    let part = |s: &str| {
        if s == "*" {
            None
        } else {
            Some(s.to_string())
        }
    };
    Some(ParsedUniqueId {
        scope: Scope::from_str(split[0]),
        bundle_kind: BundleKind::from_str(split[1]),
        origin: part(split[2]),
        id: part(split[3]),
        branch: part(split[4]),
    })
}

/// Compare two unique-ids using the usual wildcard rules: segments match if
/// equal or if either side is `*`. Malformed ids only match byte-for-byte.
pub fn unique_id_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let sa: Vec<&str> = a.split('/').collect();
    let sb: Vec<&str> = b.split('/').collect();
    if sa.len() != 5 || sb.len() != 5 {
        return false;
    }
    sa.iter()
        .zip(sb.iter())
        .all(|(x, y)| x == y || *x == "*" || *y == "*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_renders_wildcards() {
        assert_eq!(
            build_unique_id(Scope::Unknown, BundleKind::Unknown, None, None, None),
            "*/*/*/*/*"
        );
        assert_eq!(
            build_unique_id(
                Scope::System,
                BundleKind::Flatpak,
                Some("flathub"),
                Some("org.gnome.Calculator"),
                Some("stable")
            ),
            "system/flatpak/flathub/org.gnome.Calculator/stable"
        );
    }

    #[test]
    fn parse_rejects_wrong_segment_count() {
        assert!(parse_unique_id("a/b/c/d").is_none());
        assert!(parse_unique_id("a/b/c/d/e/f").is_none());
        let parsed = parse_unique_id("user/package/*/gimp.desktop/*").unwrap();
        assert_eq!(parsed.scope, Scope::User);
        assert_eq!(parsed.bundle_kind, BundleKind::Package);
        assert_eq!(parsed.origin, None);
        assert_eq!(parsed.id.as_deref(), Some("gimp.desktop"));
        assert_eq!(parsed.branch, None);
    }

    #[test]
    fn wildcard_matching() {
        assert!(unique_id_match(
            "*/*/*/gimp.desktop/*",
            "system/package/fedora/gimp.desktop/master"
        ));
        assert!(!unique_id_match(
            "*/*/*/gimp.desktop/*",
            "system/package/fedora/inkscape.desktop/master"
        ));
        // malformed ids only match exactly
        assert!(unique_id_match("not-an-id", "not-an-id"));
        assert!(!unique_id_match("not-an-id", "*/*/*/*/*"));
    }
}
