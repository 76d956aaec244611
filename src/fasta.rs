use crate::errors::ParseError;

/// One FASTA record with its marker line stripped and its sequence lines
/// concatenated, uppercased, and reduced to the {A,C,G,T,N} alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub seq: String,
}

/// Parse a FASTA-formatted block of text into ordered records.
///
/// Everything between one `>` marker line and the next belongs to that
/// record; characters outside the DNA alphabet are dropped. Records with
/// an empty header get a positional fallback identifier.
pub fn parse_fasta(text: &str) -> Result<Vec<Record>, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut records: Vec<Record> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if let Some(header) = line.strip_prefix('>') {
            let mut id = header.trim().to_string();
            if id.is_empty() {
                id = format!("query{}", records.len() + 1);
            }
            records.push(Record {
                id,
                seq: String::new(),
            });
        } else if let Some(record) = records.last_mut() {
            record.seq.push_str(&scrub(line));
        }
        // Bases before the first marker line are ignored
    }

    if records.is_empty() {
        return Err(ParseError::MissingMarker);
    }
    for record in &records {
        if record.seq.is_empty() {
            return Err(ParseError::EmptySequence {
                id: record.id.clone(),
            });
        }
    }
    Ok(records)
}

/// Uppercase a sequence line and keep only bases the engine understands.
fn scrub(line: &str) -> String {
    line.chars()
        .map(|base| base.to_ascii_uppercase())
        .filter(|base| matches!(base, 'A' | 'C' | 'G' | 'T' | 'N'))
        .collect()
}
