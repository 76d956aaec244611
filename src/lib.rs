//! Quma: bisulfite-sequencing alignment and methylation quantification.
//!
//! The engine takes an unconverted genomic reference and a set of
//! bisulfite-converted reads, both as FASTA-formatted text, aligns each
//! read with conversion-aware scoring, and calls every qualifying
//! reference cytosine as methylated, unmethylated, gapped, mismatched, or
//! not applicable.
//!
//! Implements the QUMA quantification approach: <http://quma.cdb.riken.jp/>
//!
//! ```
//! use quma::{Call, Quma};
//!
//! let quma = Quma::new(">ref\nATCGTAGTCGA", ">r1\nATCGTAGTCGA").unwrap();
//! let analysis = quma.results()[0].analysis.as_ref().unwrap();
//! assert!(analysis.sites.iter().all(|site| site.call == Call::Methylated));
//! ```

pub mod align;
pub mod errors;
pub mod fasta;
pub mod meth;
pub mod quma;

pub use crate::align::{AlignOp, AlignedPair, Strand};
pub use crate::errors::{AlignmentError, ParseError, QumaError};
pub use crate::fasta::{parse_fasta, Record};
pub use crate::meth::{Call, CallMode, Context, MethStats, SiteCall};
pub use crate::quma::{Quma, QumaOpts, QumaResult, ReadAnalysis, SiteRow};
