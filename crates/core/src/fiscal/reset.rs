//! Reset confirmation and result types.
//!
//! A reset deletes every transactional record dated inside a financial
//! year. The caller must echo back a phrase derived from the year label.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Returns the phrase a caller must type to reset the year labelled `label`.
#[must_use]
pub fn reset_confirmation_phrase(label: &str) -> String {
    format!("RESET {label}")
}

/// Compares a supplied confirmation against the expected phrase in constant time.
///
/// Lengths are compared first; a length mismatch is rejected without
/// touching the contents.
#[must_use]
pub fn confirmation_matches(expected: &str, provided: &str) -> bool {
    let expected = expected.as_bytes();
    let provided = provided.as_bytes();

    if expected.len() != provided.len() {
        return false;
    }

    expected.ct_eq(provided).into()
}

/// Per-table record counts inside a financial-year window.
///
/// Used both for the reset preview and for the deletion result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetCounts {
    /// Transactions dated inside the window.
    pub transactions: u64,
    /// Payments dated inside the window.
    pub payments: u64,
    /// Upload batches uploaded inside the window.
    pub uploads: u64,
}

impl ResetCounts {
    /// Total number of records across all three tables.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.transactions + self.payments + self.uploads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_phrase_embeds_label() {
        assert_eq!(reset_confirmation_phrase("2024-2025"), "RESET 2024-2025");
    }

    #[test]
    fn test_exact_phrase_matches() {
        let expected = reset_confirmation_phrase("2024-2025");
        assert!(confirmation_matches(&expected, "RESET 2024-2025"));
    }

    #[test]
    fn test_empty_confirmation_rejected() {
        assert!(!confirmation_matches("RESET 2024-2025", ""));
    }

    #[test]
    fn test_last_byte_difference_rejected() {
        assert!(!confirmation_matches("RESET 2024-2025", "RESET 2024-2026"));
    }

    #[test]
    fn test_case_and_whitespace_are_significant() {
        assert!(!confirmation_matches("RESET 2024-2025", "reset 2024-2025"));
        assert!(!confirmation_matches("RESET 2024-2025", "RESET 2024-2025 "));
        assert!(!confirmation_matches("RESET 2024-2025", " RESET 2024-2025"));
    }

    #[test]
    fn test_counts_total() {
        let counts = ResetCounts {
            transactions: 17,
            payments: 42,
            uploads: 3,
        };
        assert_eq!(counts.total(), 62);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Only a byte-identical string is accepted.
        #[test]
        fn prop_matches_iff_equal(label in "[0-9]{4}-[0-9]{4}", provided in ".{0,24}") {
            let expected = reset_confirmation_phrase(&label);
            prop_assert_eq!(confirmation_matches(&expected, &provided), expected == provided);
        }

        /// Flipping any single byte of the phrase causes a mismatch.
        #[test]
        fn prop_single_byte_change_rejected(label in "[0-9]{4}-[0-9]{4}", index in 0usize..15) {
            let expected = reset_confirmation_phrase(&label);
            let mut bytes = expected.clone().into_bytes();
            bytes[index] = if bytes[index] == b'X' { b'Y' } else { b'X' };
            let tampered = String::from_utf8(bytes).unwrap();

            prop_assert!(!confirmation_matches(&expected, &tampered));
        }
    }
}
