use super::traits::FeatureReader;
use crate::core::models::table::DescriptorTable;
use std::io::{self, BufRead, BufReader, Read, Seek};
use thiserror::Error;

const MOL_BLOCK_END: &str = "M  END";
const RECORD_END: &str = "$$$$";

/// One record of a structure-data file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SdfRecord {
    /// First line of the molecule block.
    pub title: String,
    /// The molecule block after the title line, up to and including `M  END`.
    pub mol_block: Vec<String>,
    /// Data fields in file order. Multi-line values are joined with `\n`.
    pub properties: Vec<(String, String)>,
}

impl SdfRecord {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SdfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: SdfParseErrorKind },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SdfParseErrorKind {
    #[error("Data header has no '<name>' field")]
    MissingFieldName,
    #[error("File ended inside a molecule block (no 'M  END' line)")]
    UnterminatedMolBlock,
}

enum State {
    MolBlock,
    Data,
    Value { name: String, lines: Vec<String> },
}

fn field_name(header: &str) -> Option<&str> {
    let start = header.find('<')? + 1;
    let len = header[start..].find('>')?;
    Some(&header[start..start + len])
}

/// Reader for MDL structure-data files.
///
/// Only the record structure is interpreted: titles, raw molecule blocks and data
/// fields. Atom and bond tables are kept as text.
pub struct SdfFile;

impl SdfFile {
    /// Collects the data fields of all records into a table.
    pub fn into_table(records: Vec<SdfRecord>) -> DescriptorTable {
        DescriptorTable::from_records(records.into_iter().map(|r| r.properties))
    }
}

impl FeatureReader for SdfFile {
    type Output = Vec<SdfRecord>;
    type Error = SdfError;

    fn read_from<R: Read + Seek>(reader: R) -> Result<Self::Output, Self::Error> {
        let reader = BufReader::new(reader);
        let mut records = Vec::new();
        let mut current = SdfRecord::default();
        let mut lines_in_record = 0usize;
        let mut state = State::MolBlock;
        let mut last_line = 0;

        for (line_num, line_res) in reader.lines().enumerate() {
            let raw = line_res?;
            let line = raw.strip_suffix('\r').unwrap_or(&raw);
            let line_num = line_num + 1;
            last_line = line_num;

            if line == RECORD_END {
                if let State::Value { name, lines } = state {
                    current.properties.push((name, lines.join("\n")));
                }
                records.push(std::mem::take(&mut current));
                lines_in_record = 0;
                state = State::MolBlock;
                continue;
            }

            state = match state {
                State::MolBlock => {
                    if lines_in_record == 0 {
                        current.title = line.to_string();
                    } else {
                        current.mol_block.push(line.to_string());
                    }
                    lines_in_record += 1;
                    if line.starts_with(MOL_BLOCK_END) {
                        State::Data
                    } else {
                        State::MolBlock
                    }
                }
                State::Data => {
                    if line.starts_with('>') {
                        let name = field_name(line).ok_or(SdfError::Parse {
                            line: line_num,
                            kind: SdfParseErrorKind::MissingFieldName,
                        })?;
                        State::Value {
                            name: name.to_string(),
                            lines: Vec::new(),
                        }
                    } else {
                        if !line.trim().is_empty() {
                            tracing::trace!(line = line_num, "Ignoring stray line between data fields");
                        }
                        State::Data
                    }
                }
                State::Value { name, mut lines } => {
                    if line.trim().is_empty() {
                        current.properties.push((name, lines.join("\n")));
                        State::Data
                    } else {
                        lines.push(line.to_string());
                        State::Value { name, lines }
                    }
                }
            };
        }

        match state {
            State::MolBlock => {
                let has_content = !current.title.trim().is_empty()
                    || current.mol_block.iter().any(|l| !l.trim().is_empty());
                if has_content {
                    return Err(SdfError::Parse {
                        line: last_line,
                        kind: SdfParseErrorKind::UnterminatedMolBlock,
                    });
                }
            }
            State::Data => records.push(current),
            State::Value { name, lines } => {
                current.properties.push((name, lines.join("\n")));
                records.push(current);
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const METHANOL: &str = "\
methanol
     RDKit          2D

  2  1  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.2990    0.7500    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0
M  END
>  <SMILES>  (1)
CO

>  <partial_charges>  (1)
0.1,-0.4,
0.05

$$$$
";

    fn read(content: &str) -> Result<Vec<SdfRecord>, SdfError> {
        SdfFile::read_from(Cursor::new(content.as_bytes().to_vec()))
    }

    #[test]
    fn read_from_parses_title_block_and_properties() {
        let records = read(METHANOL).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.title, "methanol");
        assert_eq!(record.mol_block.last().map(String::as_str), Some("M  END"));
        assert_eq!(record.property("SMILES"), Some("CO"));
        assert_eq!(record.property("partial_charges"), Some("0.1,-0.4,\n0.05"));
    }

    #[test]
    fn read_from_handles_multiple_records_and_crlf() {
        let content = format!("{}{}", METHANOL, METHANOL.replace("CO\n", "CCO\n")).replace('\n', "\r\n");
        let records = read(&content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].property("SMILES"), Some("CCO"));
    }

    #[test]
    fn read_from_accepts_blank_title_and_missing_final_terminator() {
        let content = "\n  header\n\n  0  0  0  0  0  0  0  0  0  0999 V2000\nM  END\n> <SMILES>\nC\n";
        let records = read(content).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "");
        assert_eq!(records[0].property("SMILES"), Some("C"));
    }

    #[test]
    fn read_from_ignores_trailing_blank_lines() {
        let content = format!("{}\n\n", METHANOL);
        assert_eq!(read(&content).unwrap().len(), 1);
    }

    #[test]
    fn read_from_rejects_data_header_without_name() {
        let content = METHANOL.replace(">  <SMILES>  (1)", "> SMILES");
        let result = read(&content);
        assert!(matches!(
            result,
            Err(SdfError::Parse {
                line: 9,
                kind: SdfParseErrorKind::MissingFieldName
            })
        ));
    }

    #[test]
    fn read_from_rejects_truncated_mol_block() {
        let result = read("ethane\n  header\n\n  2  1  0  0\n");
        assert!(matches!(
            result,
            Err(SdfError::Parse {
                kind: SdfParseErrorKind::UnterminatedMolBlock,
                ..
            })
        ));
    }

    #[test]
    fn into_table_collects_properties_as_columns() {
        let table = SdfFile::into_table(read(METHANOL).unwrap());
        assert_eq!(table.columns(), ["SMILES", "partial_charges"]);
        assert_eq!(table.cell(0, 0), Some("CO"));
    }

    #[test]
    fn field_name_extracts_text_between_angle_brackets() {
        assert_eq!(field_name(">  <logP>  (3)"), Some("logP"));
        assert_eq!(field_name("> 25 <ID>"), Some("ID"));
        assert_eq!(field_name("> 25"), None);
    }
}
