use super::error::{ParseError, ParseErrorKind};
use super::traits::StructureFile;
use crate::core::models::builder::{AtomRecord, CoordinateModelBuilder};
use crate::core::models::residue::ResidueKey;
use crate::core::models::structure::CoordinateModel;
use nalgebra::Point3;
use std::io::BufRead;
use tracing::debug;

/// Shortest ATOM/HETATM line that still carries all three coordinates.
const MIN_ATOM_LINE_LEN: usize = 54;

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn column_char(line: &str, index: usize) -> Option<char> {
    line.get(index..index + 1)
        .and_then(|s| s.chars().next())
        .filter(|c| !c.is_whitespace())
}

/// Fixed-column PDB format reader (ATOM, HETATM, MODEL/ENDMDL, HEADER).
pub struct PdbFile;

impl StructureFile for PdbFile {
    fn read_from(reader: &mut impl BufRead) -> Result<CoordinateModel, ParseError> {
        let mut builder = CoordinateModelBuilder::new("");
        let mut fallback_serial = 0usize;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let line = line.trim_end_matches('\r');

            match slice_and_trim(line, 0, 6) {
                "HEADER" => {
                    let id_code = slice_and_trim(line, 62, 66);
                    if !id_code.is_empty() {
                        builder.set_id(id_code);
                    }
                }
                "ATOM" | "HETATM" => {
                    fallback_serial += 1;
                    let record = parse_atom_line(line, line_num, fallback_serial)?;
                    builder.add_atom(record);
                }
                "ENDMDL" | "END" => break,
                _ => {}
            }
        }

        if builder.atom_count() == 0 {
            return Err(ParseError::MissingRecord("ATOM/HETATM records".into()));
        }
        debug!(
            atoms = builder.atom_count(),
            dropped_alternates = builder.dropped_alternates(),
            "Parsed PDB atom records."
        );
        Ok(builder.build())
    }
}

fn parse_atom_line(
    line: &str,
    line_num: usize,
    fallback_serial: usize,
) -> Result<AtomRecord, ParseError> {
    if line.len() < MIN_ATOM_LINE_LEN {
        return Err(ParseError::at(
            line_num,
            ParseErrorKind::LineTooShort {
                min: MIN_ATOM_LINE_LEN,
            },
        ));
    }

    let name = slice_and_trim(line, 12, 16);
    if name.is_empty() {
        return Err(ParseError::at(
            line_num,
            ParseErrorKind::MissingField {
                field: "atom name (columns 13-16)".into(),
            },
        ));
    }
    let res_name = slice_and_trim(line, 17, 20);
    if res_name.is_empty() {
        return Err(ParseError::at(
            line_num,
            ParseErrorKind::MissingField {
                field: "residue name (columns 18-20)".into(),
            },
        ));
    }

    // Serials overflow into hybrid-36 or asterisks in very large entries.
    let serial = slice_and_trim(line, 6, 11)
        .parse::<usize>()
        .unwrap_or(fallback_serial);

    let res_seq_str = slice_and_trim(line, 22, 26);
    let res_seq: i32 = res_seq_str.parse().map_err(|_| {
        ParseError::at(
            line_num,
            ParseErrorKind::InvalidInt {
                field: "residue sequence number (columns 23-26)".into(),
                value: res_seq_str.into(),
            },
        )
    })?;

    let coordinate = |start: usize, end: usize, columns: &str| -> Result<f64, ParseError> {
        let raw = slice_and_trim(line, start, end);
        raw.parse().map_err(|_| {
            ParseError::at(
                line_num,
                ParseErrorKind::InvalidFloat {
                    field: format!("coordinate (columns {columns})"),
                    value: raw.into(),
                },
            )
        })
    };
    let x = coordinate(30, 38, "31-38")?;
    let y = coordinate(38, 46, "39-46")?;
    let z = coordinate(46, 54, "47-54")?;

    let element = slice_and_trim(line, 76, 78);
    let chain_id = column_char(line, 21).map(String::from).unwrap_or_default();

    Ok(AtomRecord {
        serial,
        name: name.to_string(),
        element: (!element.is_empty()).then(|| element.to_ascii_uppercase()),
        residue_name: res_name.to_string(),
        key: ResidueKey::new(&chain_id, res_seq, column_char(line, 26)),
        alt_loc: column_char(line, 16),
        is_hetero: slice_and_trim(line, 0, 6) == "HETATM",
        position: Point3::new(x, y, z),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CARBONIC_ANHYDRASE_FRAGMENT: &str = "\
HEADER    LYASE                                   01-JAN-00   1CA2
ATOM      1  NE2 HIS A  94       2.000   0.000   0.000  1.00 10.00           N
ATOM      2  NE2 HIS A  96       0.000   2.100   0.000  1.00 10.00           N
ATOM      3  OG ASER A  97       5.000   0.000   0.000  0.50 10.00           O
ATOM      4  OG BSER A  97       9.000   0.000   0.000  0.50 10.00           O
HETATM    5 ZN    ZN A 301       0.000   0.000   0.000  1.00 10.00          ZN
HETATM    6  O   HOH A 401       1.000   0.000   0.000  1.00 10.00           O
END
";

    fn parse(text: &str) -> Result<CoordinateModel, ParseError> {
        PdbFile::read_from(&mut Cursor::new(text))
    }

    #[test]
    fn reads_header_atoms_and_residues() {
        let model = parse(CARBONIC_ANHYDRASE_FRAGMENT).unwrap();
        assert_eq!(model.id(), "1CA2");
        assert_eq!(model.atoms().len(), 5);
        assert_eq!(model.residues().len(), 5);

        let zinc = model.atoms().iter().find(|a| a.is_zinc()).unwrap();
        assert_eq!(zinc.serial, 5);
        let residue = model.residue_of(zinc);
        assert!(residue.is_hetero);
        assert_eq!(residue.key, ResidueKey::new("A", 301, None));
    }

    #[test]
    fn alternate_location_b_is_dropped() {
        let model = parse(CARBONIC_ANHYDRASE_FRAGMENT).unwrap();
        let serine_atoms: Vec<_> = model
            .atoms()
            .iter()
            .filter(|a| model.residue_of(a).name == "SER")
            .collect();
        assert_eq!(serine_atoms.len(), 1);
        assert_eq!(serine_atoms[0].position.x, 5.0);
    }

    #[test]
    fn only_first_model_is_read() {
        let text = "\
MODEL        1
HETATM    1 ZN    ZN A 301       0.000   0.000   0.000  1.00 10.00          ZN
ENDMDL
MODEL        2
HETATM    1 ZN    ZN A 301       0.100   0.000   0.000  1.00 10.00          ZN
ENDMDL
";
        let model = parse(text).unwrap();
        assert_eq!(model.atoms().len(), 1);
    }

    #[test]
    fn missing_element_column_is_inferred() {
        let text = "HETATM    1 ZN    ZN A 301       0.000   0.000   0.000\n";
        let model = parse(text).unwrap();
        assert!(model.atoms()[0].is_zinc());
    }

    #[test]
    fn short_atom_line_is_an_error() {
        let result = parse("ATOM      1  N   HIS A  94       2.000   0.000\n");
        assert!(matches!(
            result,
            Err(ParseError::Parse {
                line: 1,
                kind: ParseErrorKind::LineTooShort { .. }
            })
        ));
    }

    #[test]
    fn invalid_coordinate_is_an_error() {
        let result = parse("ATOM      1  N   HIS A  94       2.000   x.xxx   0.000\n");
        assert!(matches!(
            result,
            Err(ParseError::Parse {
                kind: ParseErrorKind::InvalidFloat { .. },
                ..
            })
        ));
    }

    #[test]
    fn file_without_atoms_is_an_error() {
        let result = parse("HEADER    EMPTY\nEND\n");
        assert!(matches!(result, Err(ParseError::MissingRecord(_))));
    }
}
