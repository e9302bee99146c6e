use std::fmt;

/// A size that may not be known, or may be impossible to know.
///
/// `Unknown` means nothing has determined the size yet; `Unknowable` means a
/// backend determined that no meaningful byte count exists (for example a
/// web app). Byte counts are only meaningful in the `Valid` case.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Size {
    #[default]
    Unknown,
    Unknowable,
    Valid(u64),
}

impl Size {
    pub fn is_valid(self) -> bool {
        matches!(self, Size::Valid(_))
    }

    /// Combine two sizes when aggregating over dependencies.
    ///
    /// Valid sizes add with saturation; anything else degrades the total to
    /// the worse of the two states, with `Unknowable` beating `Unknown`.
    pub fn add(self, other: Size) -> Size {
        match (self, other) {
            (Size::Valid(a), Size::Valid(b)) => Size::Valid(a.saturating_add(b)),
            (Size::Unknowable, _) | (_, Size::Unknowable) => Size::Unknowable,
            _ => Size::Unknown,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Size::Unknown => write!(f, "unknown"),
            Size::Unknowable => write!(f, "unknowable"),
            Size::Valid(bytes) => write!(f, "{}", format_size(*bytes)),
        }
    }
}

/// Humanize a byte count for log output, e.g. "4.2 MB".
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["kB", "MB", "GB", "TB", "PB"];
    if bytes < 1000 {
        return format!("{} bytes", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_valid_saturates() {
        assert_eq!(
            Size::Valid(u64::MAX).add(Size::Valid(1)),
            Size::Valid(u64::MAX)
        );
        assert_eq!(Size::Valid(2).add(Size::Valid(3)), Size::Valid(5));
    }

    #[test]
    fn unknowable_wins_over_unknown() {
        assert_eq!(Size::Unknown.add(Size::Unknowable), Size::Unknowable);
        assert_eq!(Size::Unknowable.add(Size::Valid(10)), Size::Unknowable);
        assert_eq!(Size::Unknown.add(Size::Valid(10)), Size::Unknown);
    }

    #[test]
    fn display() {
        assert_eq!(Size::Valid(999).to_string(), "999 bytes");
        assert_eq!(Size::Valid(1_500_000).to_string(), "1.5 MB");
        assert_eq!(Size::Unknowable.to_string(), "unknowable");
    }
}
