//! Bisulfite-aware substitution scoring.
//!
//! Bisulfite treatment converts unmethylated cytosine to thymine, so a
//! read T under a reference C is an expected event and must not be
//! penalized like a genuine mismatch.

pub const MATCH: i32 = 2;
pub const CONVERSION: i32 = -1;
pub const MISMATCH: i32 = -4;
pub const GAP_OPEN: i32 = -6;
pub const GAP_EXTEND: i32 = -1;

/// Score one read base against one reference base.
///
/// `N` on either side matches any base and contributes nothing to the
/// score. The table is asymmetric: only reference C / read T is treated
/// as a conversion.
pub fn score(read: u8, reference: u8) -> i32 {
    match (reference, read) {
        (b'N', _) | (_, b'N') => 0,
        (r, q) if r == q => MATCH,
        (b'C', b'T') => CONVERSION,
        _ => MISMATCH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bases_score_match() {
        assert_eq!(score(b'A', b'A'), MATCH);
        assert_eq!(score(b'C', b'C'), MATCH);
    }

    #[test]
    fn conversion_scores_soft_mismatch() {
        assert_eq!(score(b'T', b'C'), CONVERSION);
    }

    #[test]
    fn reverse_pairing_is_not_a_conversion() {
        // read C under reference T is a real mismatch
        assert_eq!(score(b'C', b'T'), MISMATCH);
    }

    #[test]
    fn other_substitutions_score_hard_mismatch() {
        assert_eq!(score(b'A', b'C'), MISMATCH);
        assert_eq!(score(b'G', b'C'), MISMATCH);
        assert_eq!(score(b'G', b'T'), MISMATCH);
    }

    #[test]
    fn n_is_never_penalized() {
        assert_eq!(score(b'N', b'A'), 0);
        assert_eq!(score(b'C', b'N'), 0);
        assert_eq!(score(b'N', b'N'), 0);
    }
}
