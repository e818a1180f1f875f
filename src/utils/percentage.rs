use std::{fmt::Display, ops::Deref};

/// Whole percentage as shown on every surface. Always between 0 and 100 when built through
/// [Percentage::of].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percentage(u32);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Percentage {
    /// Share of `part` in `whole`, rounded to the nearest percent. There is no meaningful share of
    /// nothing, so a zero `whole` gives `None`.
    pub fn of(part: u64, whole: u64) -> Option<Percentage> {
        if whole == 0 {
            return None;
        }
        let value = (part as f64 / whole as f64 * 100.).round();
        Some(Percentage(value.clamp(0., 100.) as u32))
    }

    /// What is left up to 100%.
    pub fn complement(self) -> Percentage {
        Percentage(100u32.saturating_sub(self.0))
    }
}

impl Deref for Percentage {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Productive share of the tracked time.
pub fn productive_percentage(productive: u64, unproductive: u64) -> Option<Percentage> {
    match productive.checked_add(unproductive) {
        Some(whole) => Percentage::of(productive, whole),
        // Both halves are huge, halving keeps the ratio without overflowing.
        None => Percentage::of(productive / 2, productive / 2 + unproductive / 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_total_has_no_percentage() {
        assert_eq!(productive_percentage(0, 0), None);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(productive_percentage(1, 2).map(|v| *v), Some(33));
        assert_eq!(productive_percentage(2, 1).map(|v| *v), Some(67));
        assert_eq!(productive_percentage(1, 1).map(|v| *v), Some(50));
        assert_eq!(productive_percentage(5, 0).map(|v| *v), Some(100));
        assert_eq!(productive_percentage(u64::MAX, u64::MAX).map(|v| *v), Some(50));
    }

    #[test]
    fn test_complement_and_display() {
        let value = productive_percentage(3, 1).unwrap();
        assert_eq!(value.to_string(), "75%");
        assert_eq!(value.complement().to_string(), "25%");
    }
}
