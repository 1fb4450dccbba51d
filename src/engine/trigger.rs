//! Input trait scanning (cheap pre-classification of a turn).
//!
//! Before the registry scan, the normalized text is inspected once for a few
//! coarse traits. A pattern may declare traits it requires; when the input
//! lacks one of them the router skips the pattern without running its regex.
//!
//! This is a pre-filter only. A required trait must be implied by the
//! pattern's own regex, or be a documented extra condition of the rule (the
//! bare-password rule requires a digit), otherwise the filter changes which
//! rule wins.

bitflags::bitflags! {
    /// Coarse features of a normalized input.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputTraits: u8 {
        /// At least one ASCII digit.
        const HAS_DIGITS   = 1 << 0;
        /// Non-empty and contains no space.
        const SINGLE_TOKEN = 1 << 1;
        /// At least one character that is neither alphanumeric nor whitespace.
        const HAS_SYMBOL   = 1 << 2;
    }
}

impl InputTraits {
    /// Scan an already normalized input.
    pub fn scan(normalized: &str) -> Self {
        let mut traits = InputTraits::empty();

        if normalized.bytes().any(|b| b.is_ascii_digit()) {
            traits |= InputTraits::HAS_DIGITS;
        }

        if !normalized.is_empty() && !normalized.contains(' ') {
            traits |= InputTraits::SINGLE_TOKEN;
        }

        if normalized.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
            traits |= InputTraits::HAS_SYMBOL;
        }

        traits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_detects_traits() {
        assert_eq!(InputTraits::scan(""), InputTraits::empty());
        assert_eq!(InputTraits::scan("cerrar sesion"), InputTraits::empty());
        assert_eq!(InputTraits::scan("asdkjasd"), InputTraits::SINGLE_TOKEN);
        assert_eq!(InputTraits::scan("2023631234"), InputTraits::HAS_DIGITS | InputTraits::SINGLE_TOKEN);
        assert_eq!(InputTraits::scan("pa$$2025"), InputTraits::all());
        assert_eq!(InputTraits::scan("mi usuario es ana.perez"), InputTraits::HAS_SYMBOL);
    }
}
