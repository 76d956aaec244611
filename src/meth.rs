//! Methylation calling over reference-anchored alignments.

use crate::align::{AlignOp, AlignedPair};
use itertools::Itertools;
use std::fmt;

/// Dinucleotide context of a reference cytosine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// C followed by G.
    Cpg,
    /// C followed by A, C, or T.
    Cph,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Cpg => write!(f, "CpG"),
            Context::Cph => write!(f, "CpH"),
        }
    }
}

/// Which cytosine contexts produce site calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallMode {
    #[default]
    CpgOnly,
    CphOnly,
    All,
}

impl CallMode {
    pub fn includes(self, context: Context) -> bool {
        match self {
            CallMode::CpgOnly => context == Context::Cpg,
            CallMode::CphOnly => context == Context::Cph,
            CallMode::All => true,
        }
    }
}

/// Per-site classification of the read evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Methylated,
    Unmethylated,
    Gap,
    Mismatch,
    /// Site not covered by the alignment, or read base is N.
    NotApplicable,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Call::Methylated => "methylated",
            Call::Unmethylated => "unmethylated",
            Call::Gap => "gap",
            Call::Mismatch => "mismatch",
            Call::NotApplicable => "n/a",
        };
        write!(f, "{label}")
    }
}

/// One methylation call at a reference position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteCall {
    pub pos: usize,
    pub context: Context,
    pub call: Call,
}

/// Per-read summary counts. Methylation counts cover the sites selected by
/// the calling mode; conversion counts always come from CpH cytosines,
/// which estimate bisulfite conversion efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MethStats {
    pub methylated: u32,
    pub unmethylated: u32,
    pub converted: u32,
    pub unconverted: u32,
}

impl MethStats {
    /// Percent methylation over definitive calls; `None` when the read has
    /// no definitive call at any qualifying site.
    pub fn percent_meth(&self) -> Option<f32> {
        let total = self.methylated + self.unmethylated;
        (total > 0).then(|| 100.0 * self.methylated as f32 / total as f32)
    }

    /// Percent bisulfite conversion over CpH cytosines; `None` when the
    /// alignment covers no CpH site with definitive evidence.
    pub fn percent_conversion(&self) -> Option<f32> {
        let total = self.converted + self.unconverted;
        (total > 0).then(|| 100.0 * self.converted as f32 / total as f32)
    }
}

/// Read evidence at one reference position inside the aligned window.
enum Column {
    Base(u8),
    Gap,
}

/// Call every qualifying cytosine site of the reference against one
/// aligned read. Calls are emitted in ascending reference position order,
/// one per site, including sites outside the aligned window.
pub fn call_sites(reference: &str, pair: &AlignedPair, mode: CallMode) -> (Vec<SiteCall>, MethStats) {
    let columns = read_columns(pair);
    let mut sites = Vec::new();
    let mut stats = MethStats::default();

    for (pos, context) in cytosine_sites(reference.as_bytes()) {
        let column = if pos >= pair.ref_start && pos < pair.ref_end {
            Some(&columns[pos - pair.ref_start])
        } else {
            None
        };
        let call = classify(column);

        if context == Context::Cph {
            match call {
                Call::Unmethylated => stats.converted += 1,
                Call::Methylated => stats.unconverted += 1,
                _ => {}
            }
        }

        if !mode.includes(context) {
            continue;
        }
        match call {
            Call::Methylated => stats.methylated += 1,
            Call::Unmethylated => stats.unmethylated += 1,
            _ => {}
        }
        sites.push(SiteCall { pos, context, call });
    }

    (sites, stats)
}

/// Enumerate reference cytosines with a defined dinucleotide context.
/// A terminal C, or a C followed by N, has no context and is skipped.
fn cytosine_sites(reference: &[u8]) -> Vec<(usize, Context)> {
    reference
        .iter()
        .tuple_windows()
        .enumerate()
        .filter_map(|(pos, (&first, &second))| {
            if first != b'C' {
                return None;
            }
            match second {
                b'G' => Some((pos, Context::Cpg)),
                b'A' | b'C' | b'T' => Some((pos, Context::Cph)),
                _ => None,
            }
        })
        .collect()
}

/// Project the read onto reference coordinates: one column per reference
/// position in `[ref_start, ref_end)`.
fn read_columns(pair: &AlignedPair) -> Vec<Column> {
    let read = pair.read_seq.as_bytes();
    let mut columns = Vec::with_capacity(pair.ref_end - pair.ref_start);
    let mut read_pos = 0;

    for op in &pair.ops {
        match op {
            AlignOp::Match | AlignOp::Subst => {
                columns.push(Column::Base(read[read_pos]));
                read_pos += 1;
            }
            AlignOp::Del => columns.push(Column::Gap),
            AlignOp::Ins => read_pos += 1,
        }
    }
    columns
}

fn classify(column: Option<&Column>) -> Call {
    match column {
        None => Call::NotApplicable,
        Some(Column::Gap) => Call::Gap,
        Some(Column::Base(b'C')) => Call::Methylated,
        Some(Column::Base(b'T')) => Call::Unmethylated,
        Some(Column::Base(b'N')) => Call::NotApplicable,
        Some(Column::Base(_)) => Call::Mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align_read;

    const MAX: usize = 20_000;

    fn call(reference: &str, read: &str, mode: CallMode) -> (Vec<SiteCall>, MethStats) {
        let pair = align_read(reference, read, MAX).unwrap();
        call_sites(reference, &pair, mode)
    }

    #[test]
    fn cytosine_sites_classify_contexts() {
        //                              0123456789
        let sites = cytosine_sites(b"ACGACTCCNC");
        // C before N (index 7) and the terminal C have no context
        assert_eq!(
            sites,
            vec![(1, Context::Cpg), (4, Context::Cph), (6, Context::Cph)]
        );
    }

    #[test]
    fn identical_read_calls_all_cpgs_methylated() {
        let (sites, stats) = call("ATCGTAGTCGA", "ATCGTAGTCGA", CallMode::CpgOnly);
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].pos, 2);
        assert_eq!(sites[1].pos, 8);
        assert!(sites.iter().all(|s| s.call == Call::Methylated));
        assert_eq!(stats.percent_meth(), Some(100.0));
    }

    #[test]
    fn fully_converted_read_calls_all_cpgs_unmethylated() {
        let (sites, stats) = call("ATCGTAGTCGA", "ATTGTAGTTGA", CallMode::CpgOnly);
        assert_eq!(sites.len(), 2);
        assert!(sites.iter().all(|s| s.call == Call::Unmethylated));
        assert_eq!(stats.percent_meth(), Some(0.0));
    }

    #[test]
    fn read_gap_over_cpg_calls_gap() {
        let (sites, _) = call("AACGAA", "AAAA", CallMode::CpgOnly);
        assert_eq!(sites, vec![SiteCall { pos: 2, context: Context::Cpg, call: Call::Gap }]);
    }

    #[test]
    fn non_conversion_mismatch_calls_mismatch() {
        let (sites, stats) = call("TTCGTT", "TTAGTT", CallMode::CpgOnly);
        assert_eq!(sites[0].call, Call::Mismatch);
        assert_eq!(stats.percent_meth(), None);
    }

    #[test]
    fn uncovered_site_calls_not_applicable() {
        let (sites, _) = call("TTAACGTT", "TTAA", CallMode::CpgOnly);
        assert_eq!(
            sites,
            vec![SiteCall { pos: 4, context: Context::Cpg, call: Call::NotApplicable }]
        );
    }

    #[test]
    fn read_n_over_cpg_calls_not_applicable() {
        let (sites, _) = call("TTAACGTT", "TTAANGTT", CallMode::CpgOnly);
        assert_eq!(sites[0].call, Call::NotApplicable);
    }

    #[test]
    fn cph_mode_calls_only_cph_sites() {
        // C at 1 is CpH, C at 4 is CpG
        let (sites, stats) = call("ACAACGAA", "ATAATGAA", CallMode::CphOnly);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].pos, 1);
        assert_eq!(sites[0].context, Context::Cph);
        assert_eq!(sites[0].call, Call::Unmethylated);
        assert_eq!(stats.unmethylated, 1);
    }

    #[test]
    fn all_mode_calls_both_contexts() {
        let (sites, _) = call("ACAACGAA", "ACAACGAA", CallMode::All);
        let contexts: Vec<Context> = sites.iter().map(|s| s.context).collect();
        assert_eq!(contexts, vec![Context::Cph, Context::Cpg]);
    }

    #[test]
    fn conversion_stats_come_from_cph_sites() {
        // CpH at 1 converted, CpG at 4 methylated
        let (_, stats) = call("ACAACGAA", "ATAACGAA", CallMode::CpgOnly);
        assert_eq!(stats.converted, 1);
        assert_eq!(stats.unconverted, 0);
        assert_eq!(stats.percent_conversion(), Some(100.0));
        assert_eq!(stats.methylated, 1);
    }

    #[test]
    fn unconverted_cph_counts_against_conversion() {
        let (_, stats) = call("ACAACGAA", "ACAACGAA", CallMode::CpgOnly);
        assert_eq!(stats.unconverted, 1);
        assert_eq!(stats.percent_conversion(), Some(0.0));
    }

    #[test]
    fn no_definitive_calls_reports_undefined_percentages() {
        let stats = MethStats::default();
        assert_eq!(stats.percent_meth(), None);
        assert_eq!(stats.percent_conversion(), None);
    }
}
