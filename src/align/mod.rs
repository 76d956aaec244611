//! Conversion-aware pairwise alignment of bisulfite reads against an
//! unconverted reference.

mod scoring;

pub use scoring::{score, CONVERSION, GAP_EXTEND, GAP_OPEN, MATCH, MISMATCH};

use crate::errors::AlignmentError;
use bio::alignment::pairwise::Aligner;
use bio::alignment::Alignment;
use bio::alphabets::dna;

type BioOp = bio::alignment::AlignmentOperation;

/// One alignment column, anchored to the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignOp {
    Match,
    Subst,
    /// Gap in the read: the reference base has no aligned read base.
    Del,
    /// Gap in the reference: an extra read base.
    Ins,
}

/// Orientation in which the read aligned against the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

/// Result of aligning one read against the reference.
///
/// Semi-global: the read is aligned end to end against the reference
/// window `[ref_start, ref_end)`; terminal reference overhangs produce no
/// columns and do not count against identity. `read_seq` is the read in
/// the orientation that was aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub ops: Vec<AlignOp>,
    pub score: i32,
    pub ref_start: usize,
    pub ref_end: usize,
    pub matches: usize,
    pub conversions: usize,
    pub percent_identity: f32,
    pub strand: Strand,
    pub read_seq: String,
}

impl AlignedPair {
    /// Identity with bisulfite conversions counted as matches; this is the
    /// quality metric used for read exclusion, since a fully converted
    /// read is biologically exact despite its C/T substitutions.
    pub fn bisulfite_identity(&self) -> f32 {
        100.0 * (self.matches + self.conversions) as f32 / self.ops.len() as f32
    }
}

type ScoreFunc = fn(u8, u8) -> i32;

fn make_aligner<'a>(read_len: usize, ref_len: usize) -> Aligner<&'a ScoreFunc> {
    Aligner::with_capacity(
        read_len,
        ref_len,
        scoring::GAP_OPEN,
        scoring::GAP_EXTEND,
        &(scoring::score as ScoreFunc),
    )
}

/// Align a read against the reference on both strands and keep the
/// better-scoring orientation. Ties go to the forward strand.
pub fn align_read(
    reference: &str,
    read: &str,
    max_seq_len: usize,
) -> Result<AlignedPair, AlignmentError> {
    check_len(reference.len(), max_seq_len)?;
    check_len(read.len(), max_seq_len)?;

    let ref_bytes = reference.as_bytes();
    let forward = align_one(ref_bytes, read.as_bytes(), Strand::Forward);
    let rev_comp = dna::revcomp(read.as_bytes());
    let reverse = align_one(ref_bytes, &rev_comp, Strand::Reverse);

    if reverse.score > forward.score {
        Ok(reverse)
    } else {
        Ok(forward)
    }
}

fn check_len(len: usize, max: usize) -> Result<(), AlignmentError> {
    if len > max {
        Err(AlignmentError::SequenceTooLong { len, max })
    } else {
        Ok(())
    }
}

/// Semi-global alignment of one oriented read against the reference.
fn align_one(ref_bytes: &[u8], read: &[u8], strand: Strand) -> AlignedPair {
    let mut aligner = make_aligner(read.len(), ref_bytes.len());
    let bio_align = aligner.semiglobal(read, ref_bytes);
    convert(&bio_align, ref_bytes, read, strand)
}

/// Convert a rust-bio alignment into an [`AlignedPair`], counting matched
/// columns and bisulfite conversion events along the way.
fn convert(align: &Alignment, ref_bytes: &[u8], read: &[u8], strand: Strand) -> AlignedPair {
    let mut ops = Vec::with_capacity(align.operations.len());
    let mut matches = 0;
    let mut conversions = 0;
    let mut ref_pos = align.ystart;
    let mut read_pos = 0;

    for bio_op in &align.operations {
        let op = match bio_op {
            BioOp::Match => AlignOp::Match,
            BioOp::Subst => AlignOp::Subst,
            BioOp::Del => AlignOp::Del,
            BioOp::Ins => AlignOp::Ins,
            other => panic!("unhandled alignment operation {other:?}"),
        };

        match op {
            AlignOp::Match => {
                matches += 1;
                ref_pos += 1;
                read_pos += 1;
            }
            AlignOp::Subst => {
                if ref_bytes[ref_pos] == b'C' && read[read_pos] == b'T' {
                    conversions += 1;
                }
                ref_pos += 1;
                read_pos += 1;
            }
            AlignOp::Del => ref_pos += 1,
            AlignOp::Ins => read_pos += 1,
        }
        ops.push(op);
    }

    let percent_identity = 100.0 * matches as f32 / ops.len() as f32;
    AlignedPair {
        ops,
        score: align.score,
        ref_start: align.ystart,
        ref_end: align.yend,
        matches,
        conversions,
        percent_identity,
        strand,
        read_seq: String::from_utf8_lossy(read).into_owned(),
    }
}
