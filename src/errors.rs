use thiserror::Error;

/// Errors raised while parsing FASTA-formatted text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("input text is empty")]
    EmptyInput,
    #[error("no FASTA marker line ('>') found")]
    MissingMarker,
    #[error("record '{id}' has an empty sequence")]
    EmptySequence { id: String },
}

/// Per-read alignment failures. These are attached to the affected read's
/// result instead of aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignmentError {
    #[error("sequence length {len} exceeds the configured maximum of {max}")]
    SequenceTooLong { len: usize, max: usize },
}

/// Batch-level failures that prevent any result from being produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QumaError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("reference must contain exactly one record, found {records}")]
    InputShape { records: usize },
}
