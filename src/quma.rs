//! Batch orchestration: parse both inputs, align and call every read,
//! assemble the ordered result collection.

use crate::align::{self, AlignedPair};
use crate::errors::{AlignmentError, QumaError};
use crate::fasta::{parse_fasta, Record};
use crate::meth::{call_sites, Call, CallMode, Context, MethStats, SiteCall};
use itertools::Itertools;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

/// Engine options. Defaults follow the QUMA CLI conventions: CpG-only
/// calling, 90% identity and 95% bisulfite conversion thresholds.
#[derive(Debug, Clone, Copy)]
pub struct QumaOpts {
    pub mode: CallMode,
    pub max_seq_len: usize,
    pub min_identity: f32,
    pub min_conversion: f32,
    /// Align reads on a rayon worker pool; results keep input order.
    pub parallel: bool,
}

impl Default for QumaOpts {
    fn default() -> Self {
        QumaOpts {
            mode: CallMode::default(),
            max_seq_len: 20_000,
            min_identity: 90.0,
            min_conversion: 95.0,
            parallel: false,
        }
    }
}

/// Alignment, site calls, and summary statistics for one read.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadAnalysis {
    pub alignment: AlignedPair,
    pub sites: Vec<SiteCall>,
    pub stats: MethStats,
    /// Read failed the identity or conversion quality thresholds.
    pub excluded: bool,
}

/// Per-read result; a failed alignment is attached here instead of
/// aborting the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct QumaResult {
    pub id: String,
    pub analysis: Result<ReadAnalysis, AlignmentError>,
}

/// One row of the tabular aggregate view: one site call of one read.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRow {
    pub read_id: String,
    pub pos: usize,
    pub context: Context,
    pub call: Call,
}

/// Methylation analysis of a set of bisulfite reads against a single
/// reference, both supplied as FASTA-formatted text.
#[derive(Debug, Clone)]
pub struct Quma {
    reference: Record,
    results: Vec<QumaResult>,
}

impl Quma {
    /// Run the engine with default options.
    pub fn new(reference_fasta: &str, reads_fasta: &str) -> Result<Self, QumaError> {
        Self::with_opts(reference_fasta, reads_fasta, QumaOpts::default())
    }

    /// Run the engine. The reference text must contain exactly one record;
    /// the reads text may contain any number of records, and their input
    /// order is preserved in the results.
    pub fn with_opts(
        reference_fasta: &str,
        reads_fasta: &str,
        opts: QumaOpts,
    ) -> Result<Self, QumaError> {
        let mut references = parse_fasta(reference_fasta)?;
        if references.len() != 1 {
            return Err(QumaError::InputShape {
                records: references.len(),
            });
        }
        let reference = references.swap_remove(0);
        let reads = parse_fasta(reads_fasta)?;

        let analyze = |read: &Record| analyze_read(&reference, read, &opts);
        let results: Vec<QumaResult> = if opts.parallel {
            reads.par_iter().map(&analyze).collect()
        } else {
            reads.iter().map(&analyze).collect()
        };

        Ok(Quma { reference, results })
    }

    pub fn reference(&self) -> &Record {
        &self.reference
    }

    /// Per-read results in input order.
    pub fn results(&self) -> &[QumaResult] {
        &self.results
    }

    /// Flatten the results into one row per site call, in input order.
    /// Reads whose alignment failed contribute no rows.
    pub fn rows(&self) -> Vec<SiteRow> {
        let mut rows = Vec::new();
        for result in &self.results {
            if let Ok(analysis) = &result.analysis {
                for site in &analysis.sites {
                    rows.push(SiteRow {
                        read_id: result.id.clone(),
                        pos: site.pos,
                        context: site.context,
                        call: site.call,
                    });
                }
            }
        }
        rows
    }

    /// Tab-separated rendering of [`Quma::rows`], one line per site call.
    pub fn values(&self) -> String {
        let header = "read\tposition\tcontext\tcall";
        let body = self
            .rows()
            .iter()
            .map(|row| format!("{}\t{}\t{}\t{}", row.read_id, row.pos, row.context, row.call))
            .join("\n");
        if body.is_empty() {
            format!("{header}\n")
        } else {
            format!("{header}\n{body}\n")
        }
    }
}

fn analyze_read(reference: &Record, read: &Record, opts: &QumaOpts) -> QumaResult {
    let analysis = align::align_read(&reference.seq, &read.seq, opts.max_seq_len).map(|alignment| {
        let (sites, stats) = call_sites(&reference.seq, &alignment, opts.mode);
        let excluded = is_excluded(&alignment, &stats, opts);
        if excluded {
            log::debug!("read '{}' fails quality thresholds", read.id);
        }
        ReadAnalysis {
            alignment,
            sites,
            stats,
            excluded,
        }
    });

    if let Err(err) = &analysis {
        log::warn!("skipping alignment for read '{}': {}", read.id, err);
    }

    QumaResult {
        id: read.id.clone(),
        analysis,
    }
}

/// Quality filter: identity is measured with bisulfite conversions counted
/// as matches, and a read with no CpH evidence is not excluded on
/// conversion.
fn is_excluded(alignment: &AlignedPair, stats: &MethStats, opts: &QumaOpts) -> bool {
    if alignment.bisulfite_identity() < opts.min_identity {
        return true;
    }
    match stats.percent_conversion() {
        Some(pconv) => pconv < opts.min_conversion,
        None => false,
    }
}
