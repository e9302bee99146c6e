use std::cmp::Ordering;
use std::fmt;

use crate::App;

/// The plugin that can run install and remove operations for an app.
///
/// The catalog never owns the plugin; apps hold a weak reference and only
/// ask it for a display name and a priority value. A dropped referent reads
/// as "no management plugin".
pub trait ManagementPlugin: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Priority used when several apps match the same dedup key; higher wins.
    fn priority(&self) -> u32;
}

/// Order two apps for de-duplication: effective priority first (higher is
/// better), then bundle kind (lower is better). `Ordering::Less` means `a`
/// should be preferred.
pub fn compare_priority(a: &App, b: &App) -> Ordering {
    match b.priority().cmp(&a.priority()) {
        Ordering::Equal => a.bundle_kind().cmp(&b.bundle_kind()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BundleKind;

    #[test]
    fn higher_priority_wins() {
        let a = App::new(Some("a.desktop"));
        let b = App::new(Some("b.desktop"));
        a.set_priority(10);
        b.set_priority(5);
        assert_eq!(compare_priority(&a, &b), Ordering::Less);
        assert_eq!(compare_priority(&b, &a), Ordering::Greater);
    }

    #[test]
    fn bundle_kind_breaks_ties() {
        let a = App::new(Some("a.desktop"));
        let b = App::new(Some("b.desktop"));
        a.set_bundle_kind(BundleKind::Flatpak);
        b.set_bundle_kind(BundleKind::Package);
        assert_eq!(compare_priority(&a, &b), Ordering::Less);
    }
}
