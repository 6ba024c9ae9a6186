//! Sequence file handling.
//!
//! The registry stores sequences server-side and serves them as text
//! in a handful of formats. GenBank is passed through as-is apart from
//! a LOCUS-line fixup; FASTA parsing is delegated to noodles.

use std::io;

use noodles::fasta;

/// Canonical width of a GenBank LOCUS line.
pub const GENBANK_LOCUS_WIDTH: usize = 80;

/// Sequence file formats the registry can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceFormat {
    #[default]
    Genbank,
    Fasta,
    Sbol,
}

impl SequenceFormat {
    /// Name used in the download endpoint path.
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceFormat::Genbank => "genbank",
            SequenceFormat::Fasta => "fasta",
            SequenceFormat::Sbol => "sbol",
        }
    }

    /// Conventional file extension for exported files.
    pub fn extension(&self) -> &'static str {
        match self {
            SequenceFormat::Genbank => "gb",
            SequenceFormat::Fasta => "fasta",
            SequenceFormat::Sbol => "xml",
        }
    }
}

impl std::fmt::Display for SequenceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SequenceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "genbank" | "gb" => Ok(SequenceFormat::Genbank),
            "fasta" | "fa" => Ok(SequenceFormat::Fasta),
            "sbol" => Ok(SequenceFormat::Sbol),
            _ => Err(format!(
                "unknown sequence format {s:?} (expected genbank, fasta or sbol)"
            )),
        }
    }
}

/// Fix up GenBank text downloaded from an ICE instance.
///
/// ICE writes LOCUS lines shorter than the canonical 80 columns, which
/// strict GenBank parsers reject; the first line is padded with spaces
/// before handing the text to one.
pub fn normalize_genbank(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();
    let padded;
    if let Some(first) = lines.first() {
        if first.len() < GENBANK_LOCUS_WIDTH {
            padded = format!("{:<width$}", first, width = GENBANK_LOCUS_WIDTH);
            lines[0] = &padded;
        }
    }
    lines.join("\n")
}

/// Parse FASTA text into records.
pub fn parse_fasta(data: &[u8]) -> io::Result<Vec<fasta::Record>> {
    let mut reader = fasta::io::Reader::new(data);
    reader.records().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_genbank_pads_locus_line() {
        let text = "LOCUS       pLab-17    4012 bp    DNA    circular\nFEATURES\n//";
        let normalized = normalize_genbank(text);
        let first = normalized.lines().next().unwrap();
        assert_eq!(first.len(), GENBANK_LOCUS_WIDTH);
        assert!(first.starts_with("LOCUS       pLab-17"));
        assert_eq!(normalized.lines().count(), 3);
    }

    #[test]
    fn test_normalize_genbank_leaves_wide_lines_alone() {
        let locus = format!("LOCUS{}", " ".repeat(90));
        let text = format!("{locus}\n//");
        let normalized = normalize_genbank(&text);
        assert_eq!(normalized.lines().next().unwrap(), locus);
    }

    #[test]
    fn test_normalize_genbank_empty_input() {
        assert_eq!(normalize_genbank(""), "");
    }

    #[test]
    fn test_parse_fasta() {
        let records = parse_fasta(b">seq1 test plasmid\nACGTACGT\nACGT\n>seq2\nTTTT\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence().len(), 12);
        assert_eq!(records[1].sequence().len(), 4);
    }

    #[test]
    fn test_format_round_trip() {
        for format in [
            SequenceFormat::Genbank,
            SequenceFormat::Fasta,
            SequenceFormat::Sbol,
        ] {
            let parsed: SequenceFormat = format.as_str().parse().unwrap();
            assert_eq!(parsed, format);
        }
        assert!("csv".parse::<SequenceFormat>().is_err());
    }
}
