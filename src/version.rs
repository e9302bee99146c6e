//! Derivation of user-visible version strings.
//!
//! Raw package versions carry epochs, distro tags and release suffixes that
//! mean nothing to users. The UI strings are produced by trying progressively
//! weaker sets of fixups until the version and update-version strings differ
//! from each other; if no pass manages that, the raw strings are used.

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub(crate) struct VersionFixup: u32 {
        const RELEASE = 1 << 0;
        const DISTRO_SUFFIX = 1 << 1;
        const GIT_SUFFIX = 1 << 2;
    }
}

fn ui_version(version: &str, flags: VersionFixup) -> String {
    // remove any epoch, e.g. "2:1.6.2" -> "1.6.2"
    let mut version = version;
    for (i, c) in version.char_indices() {
        if c == ':' {
            version = &version[i + 1..];
            break;
        }
        if !c.is_ascii_digit() {
            break;
        }
    }
    let mut new = version.to_string();

    // remove any distro suffix, e.g. "1.6.2-7.fc17" -> "1.6.2-7"
    if flags.contains(VersionFixup::DISTRO_SUFFIX) {
        if let Some(pos) = new.find(".fc") {
            new.truncate(pos);
        }
        if let Some(pos) = new.find(".el") {
            new.truncate(pos);
        }
    }

    // remove any release, e.g. "1.6.2-7" -> "1.6.2"
    if flags.contains(VersionFixup::RELEASE) {
        if let Some(pos) = new.rfind('-') {
            new.truncate(pos);
        }
    }

    // remove any date-like git suffix, e.g. "3.9.1.2013.02.17" -> "3.9.1"
    if flags.contains(VersionFixup::GIT_SUFFIX) {
        for marker in [".2012", ".2013"] {
            if let Some(pos) = new.rfind(marker) {
                new.truncate(pos);
            }
        }
    }

    new
}

/// Work out both UI strings together, trying each fixup set in order and
/// stopping at the first one where the two results differ. Falls back to the
/// raw strings verbatim when every pass produces identical output.
pub(crate) fn populate_ui_versions(
    version: Option<&str>,
    update_version: Option<&str>,
) -> (Option<String>, Option<String>) {
    let passes = [
        VersionFixup::RELEASE | VersionFixup::DISTRO_SUFFIX | VersionFixup::GIT_SUFFIX,
        VersionFixup::DISTRO_SUFFIX | VersionFixup::GIT_SUFFIX,
        VersionFixup::DISTRO_SUFFIX,
    ];
    for flags in passes {
        let version_ui = version.map(|v| ui_version(v, flags));
        let update_version_ui = update_version.map(|v| ui_version(v, flags));
        if version_ui != update_version_ui {
            return (version_ui, update_version_ui);
        }
    }

    // we tried, but failed
    (
        version.map(str::to_string),
        update_version.map(str::to_string),
    )
}
