//! mmCIF/PDBx reader.
//!
//! Only the `_atom_site.` loop of the first data block is interpreted. Author
//! numbering (`auth_asym_id`, `auth_seq_id`, `pdbx_PDB_ins_code`) identifies residues
//! when present, because label numbering leaves non-polymer groups without sequence
//! numbers. Only atoms of the first model are loaded.

use super::error::{ParseError, ParseErrorKind};
use super::traits::StructureFile;
use crate::core::models::builder::{AtomRecord, CoordinateModelBuilder};
use crate::core::models::residue::ResidueKey;
use crate::core::models::structure::CoordinateModel;
use nalgebra::Point3;
use std::io::BufRead;
use tracing::debug;

const ATOM_SITE_PREFIX: &str = "_atom_site.";

pub struct MmcifFile;

/// Column positions of the `_atom_site.` items this reader understands.
#[derive(Debug, Default)]
struct AtomSiteColumns {
    group_pdb: Option<usize>,
    id: Option<usize>,
    type_symbol: Option<usize>,
    atom_name: Option<usize>,
    alt_id: Option<usize>,
    comp_id: Option<usize>,
    asym_id: Option<usize>,
    seq_id: Option<usize>,
    ins_code: Option<usize>,
    x: Option<usize>,
    y: Option<usize>,
    z: Option<usize>,
    model_num: Option<usize>,
}

impl AtomSiteColumns {
    fn from_fields(fields: &[String]) -> Self {
        let find = |name: &str| fields.iter().position(|field| field == name);
        let prefer = |primary: &str, fallback: &str| find(primary).or_else(|| find(fallback));

        Self {
            group_pdb: find("group_PDB"),
            id: find("id"),
            type_symbol: find("type_symbol"),
            atom_name: prefer("auth_atom_id", "label_atom_id"),
            alt_id: find("label_alt_id"),
            comp_id: prefer("auth_comp_id", "label_comp_id"),
            asym_id: prefer("auth_asym_id", "label_asym_id"),
            seq_id: prefer("auth_seq_id", "label_seq_id"),
            ins_code: find("pdbx_PDB_ins_code"),
            x: find("Cartn_x"),
            y: find("Cartn_y"),
            z: find("Cartn_z"),
            model_num: find("pdbx_PDB_model_num"),
        }
    }

    fn require(column: Option<usize>, name: &str, line: usize) -> Result<usize, ParseError> {
        column.ok_or_else(|| {
            ParseError::at(
                line,
                ParseErrorKind::MissingColumn {
                    column: format!("{ATOM_SITE_PREFIX}{name}"),
                },
            )
        })
    }
}

/// Row-level state while consuming the `_atom_site.` loop.
struct AtomSiteReader {
    fields: Vec<String>,
    columns: AtomSiteColumns,
    pending: Vec<String>,
    first_model: Option<String>,
    rows: usize,
    skipped_models: usize,
}

impl AtomSiteReader {
    fn new() -> Self {
        Self {
            fields: Vec::new(),
            columns: AtomSiteColumns::default(),
            pending: Vec::new(),
            first_model: None,
            rows: 0,
            skipped_models: 0,
        }
    }

    fn push_field(&mut self, name: &str) {
        self.fields.push(name.to_string());
    }

    fn begin_rows(&mut self) {
        self.columns = AtomSiteColumns::from_fields(&self.fields);
    }

    fn push_line(
        &mut self,
        line: &str,
        line_num: usize,
        builder: &mut CoordinateModelBuilder,
    ) -> Result<(), ParseError> {
        self.pending.extend(tokenize(line));
        let width = self.fields.len();
        while self.pending.len() >= width {
            let row: Vec<String> = self.pending.drain(..width).collect();
            self.read_row(&row, line_num, builder)?;
        }
        Ok(())
    }

    fn finish(&self, line_num: usize) -> Result<(), ParseError> {
        if !self.pending.is_empty() {
            return Err(ParseError::at(
                line_num,
                ParseErrorKind::TruncatedRow {
                    expected: self.fields.len(),
                    found: self.pending.len(),
                },
            ));
        }
        Ok(())
    }

    fn read_row(
        &mut self,
        row: &[String],
        line: usize,
        builder: &mut CoordinateModelBuilder,
    ) -> Result<(), ParseError> {
        self.rows += 1;
        let cols = &self.columns;

        if let Some(model) = cols.model_num.and_then(|i| value(row, i)) {
            let first = self.first_model.get_or_insert_with(|| model.to_string());
            if first.as_str() != model {
                self.skipped_models += 1;
                return Ok(());
            }
        }

        let x = parse_coordinate(row, AtomSiteColumns::require(cols.x, "Cartn_x", line)?, "Cartn_x", line)?;
        let y = parse_coordinate(row, AtomSiteColumns::require(cols.y, "Cartn_y", line)?, "Cartn_y", line)?;
        let z = parse_coordinate(row, AtomSiteColumns::require(cols.z, "Cartn_z", line)?, "Cartn_z", line)?;

        let name = required_value(row, AtomSiteColumns::require(cols.atom_name, "label_atom_id", line)?, "atom_id", line)?;
        let comp_id = required_value(row, AtomSiteColumns::require(cols.comp_id, "label_comp_id", line)?, "comp_id", line)?;
        let asym_id = required_value(row, AtomSiteColumns::require(cols.asym_id, "label_asym_id", line)?, "asym_id", line)?;

        let seq_num = match cols.seq_id.and_then(|i| value(row, i)) {
            Some(raw) => raw.parse::<i32>().map_err(|_| {
                ParseError::at(
                    line,
                    ParseErrorKind::InvalidInt {
                        field: "seq_id".into(),
                        value: raw.into(),
                    },
                )
            })?,
            None => 0,
        };

        let serial = match cols.id.and_then(|i| value(row, i)) {
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                ParseError::at(
                    line,
                    ParseErrorKind::InvalidInt {
                        field: "id".into(),
                        value: raw.into(),
                    },
                )
            })?,
            None => self.rows,
        };

        let is_hetero = cols
            .group_pdb
            .and_then(|i| value(row, i))
            .is_some_and(|group| group == "HETATM");

        let record = AtomRecord {
            serial,
            name: name.to_string(),
            element: cols
                .type_symbol
                .and_then(|i| value(row, i))
                .map(str::to_ascii_uppercase),
            residue_name: comp_id.to_string(),
            key: ResidueKey::new(
                asym_id,
                seq_num,
                cols.ins_code.and_then(|i| value(row, i)).and_then(|s| s.chars().next()),
            ),
            alt_loc: cols.alt_id.and_then(|i| value(row, i)).and_then(|s| s.chars().next()),
            is_hetero,
            position: Point3::new(x, y, z),
        };
        builder.add_atom(record);
        Ok(())
    }
}

impl StructureFile for MmcifFile {
    fn read_from(reader: &mut impl BufRead) -> Result<CoordinateModel, ParseError> {
        let mut builder = CoordinateModelBuilder::new("");
        let mut atom_site: Option<AtomSiteReader> = None;
        let mut in_loop_header = false;
        let mut in_rows = false;
        let mut in_text_field = false;
        let mut seen_block = false;
        let mut last_line = 0;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            last_line = line_num;
            let line = line.trim_end_matches('\r');

            if line.starts_with(';') {
                if in_rows {
                    return Err(ParseError::at(line_num, ParseErrorKind::TextFieldInTable));
                }
                in_text_field = !in_text_field;
                continue;
            }
            if in_text_field {
                continue;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if in_rows {
                if ends_table(trimmed) {
                    break;
                }
                if let Some(site) = atom_site.as_mut() {
                    site.push_line(trimmed, line_num, &mut builder)?;
                }
                continue;
            }

            if let Some(block) = trimmed.strip_prefix("data_") {
                if seen_block {
                    break;
                }
                seen_block = true;
                builder.set_id(block);
                continue;
            }

            if trimmed == "loop_" {
                in_loop_header = true;
                continue;
            }

            if in_loop_header {
                if let Some(field) = trimmed.strip_prefix(ATOM_SITE_PREFIX) {
                    atom_site
                        .get_or_insert_with(AtomSiteReader::new)
                        .push_field(field.trim());
                    continue;
                }
                if trimmed.starts_with('_') {
                    continue;
                }
                in_loop_header = false;
                if let Some(site) = atom_site.as_mut() {
                    site.begin_rows();
                    if ends_table(trimmed) {
                        break;
                    }
                    in_rows = true;
                    site.push_line(trimmed, line_num, &mut builder)?;
                }
            }
        }

        let site = atom_site.ok_or_else(|| ParseError::MissingRecord("_atom_site loop".into()))?;
        site.finish(last_line)?;
        if builder.atom_count() == 0 {
            return Err(ParseError::MissingRecord("_atom_site rows".into()));
        }

        debug!(
            atoms = builder.atom_count(),
            dropped_alternates = builder.dropped_alternates(),
            skipped_model_rows = site.skipped_models,
            "Parsed mmCIF atom table."
        );
        Ok(builder.build())
    }
}

fn ends_table(trimmed: &str) -> bool {
    trimmed.starts_with('#')
        || trimmed.starts_with('_')
        || trimmed == "loop_"
        || trimmed.starts_with("data_")
}

/// Returns the value at `index`, treating the CIF null markers `.` and `?` as absent.
fn value(row: &[String], index: usize) -> Option<&str> {
    row.get(index)
        .map(String::as_str)
        .filter(|v| *v != "." && *v != "?")
}

fn required_value<'r>(
    row: &'r [String],
    index: usize,
    field: &str,
    line: usize,
) -> Result<&'r str, ParseError> {
    value(row, index).ok_or_else(|| {
        ParseError::at(
            line,
            ParseErrorKind::MissingField {
                field: field.to_string(),
            },
        )
    })
}

fn parse_coordinate(row: &[String], index: usize, field: &str, line: usize) -> Result<f64, ParseError> {
    let raw = required_value(row, index, field, line)?;
    raw.parse::<f64>().map_err(|_| {
        ParseError::at(
            line,
            ParseErrorKind::InvalidFloat {
                field: field.to_string(),
                value: raw.to_string(),
            },
        )
    })
}

/// Splits one line of CIF data into tokens.
///
/// A token opened by a quote runs until the same quote character is followed by
/// whitespace or the end of the line, so primes inside names such as `O5'` survive.
fn tokenize(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < len {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        if chars[i] == '\'' || chars[i] == '"' {
            let quote = chars[i];
            let start = i + 1;
            let mut end = start;
            while end < len && !(chars[end] == quote && (end + 1 == len || chars[end + 1].is_whitespace())) {
                end += 1;
            }
            tokens.push(chars[start..end].iter().collect());
            i = end + 1;
            continue;
        }

        let start = i;
        while i < len && !chars[i].is_whitespace() {
            i += 1;
        }
        tokens.push(chars[start..i].iter().collect());
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "\
data_1ZNF
#
_entry.id 1ZNF
#
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.type_symbol
_atom_site.label_atom_id
_atom_site.label_alt_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_seq_id
_atom_site.pdbx_PDB_ins_code
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
_atom_site.auth_seq_id
_atom_site.auth_asym_id
_atom_site.pdbx_PDB_model_num
";

    fn parse(body: &str) -> Result<CoordinateModel, ParseError> {
        let text = format!("{HEADER}{body}");
        MmcifFile::read_from(&mut Cursor::new(text))
    }

    #[test]
    fn reads_atoms_residues_and_block_id() {
        let model = parse(
            "\
ATOM   1 N  NE2 . HIS A 1 ? 3.000 0.000 0.000 96  A 1
ATOM   2 C  CA  . HIS A 1 ? 4.000 0.000 0.000 96  A 1
HETATM 3 ZN ZN  . ZN  B . ? 0.000 0.000 0.000 301 A 1
HETATM 4 O  O   . HOH C . ? 1.000 0.000 0.000 401 A 1
#
",
        )
        .unwrap();

        assert_eq!(model.id(), "1ZNF");
        assert_eq!(model.atoms().len(), 4);
        assert_eq!(model.residues().len(), 3);

        let zinc = &model.atoms()[2];
        assert!(zinc.is_zinc());
        assert_eq!(zinc.serial, 3);
        let zinc_residue = model.residue_of(zinc);
        assert!(zinc_residue.is_hetero);
        assert_eq!(zinc_residue.key, ResidueKey::new("A", 301, None));

        let his = model.residue(0).unwrap();
        assert_eq!(his.name, "HIS");
        assert!(!his.is_hetero);
        assert_eq!(his.atoms().len(), 2);
    }

    #[test]
    fn only_first_model_is_loaded() {
        let model = parse(
            "\
HETATM 1 ZN ZN . ZN B . ? 0.000 0.000 0.000 301 A 1
HETATM 2 ZN ZN . ZN B . ? 0.500 0.000 0.000 301 A 2
",
        )
        .unwrap();
        assert_eq!(model.atoms().len(), 1);
    }

    #[test]
    fn alternate_locations_keep_first_listed_atom() {
        let model = parse(
            "\
ATOM 1 O OG A SER A 5 ? 1.000 0.000 0.000 5 A 1
ATOM 2 O OG B SER A 5 ? 8.000 0.000 0.000 5 A 1
",
        )
        .unwrap();
        assert_eq!(model.atoms().len(), 1);
        assert_eq!(model.atoms()[0].position.x, 1.0);
    }

    #[test]
    fn insertion_codes_are_part_of_residue_identity() {
        let model = parse(
            "\
ATOM 1 C CA . GLY A 5 ? 1.000 0.000 0.000 52 A 1
ATOM 2 C CA . GLY A 6 A 2.000 0.000 0.000 52 A 1
",
        )
        .unwrap();
        assert_eq!(model.residues().len(), 2);
        assert_eq!(model.residues()[1].key.ins_code, Some('A'));
    }

    #[test]
    fn quoted_atom_names_are_unquoted() {
        let model = parse("HETATM 1 O \"O5'\" . NAG D . ? 1.000 2.000 3.000 601 A 1\n").unwrap();
        assert_eq!(model.atoms()[0].name, "O5'");
        assert_eq!(model.atoms()[0].position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn rows_may_wrap_across_lines() {
        let model = parse(
            "\
HETATM 1 ZN ZN . ZN B . ?
0.000 0.000 0.000 301 A 1
",
        )
        .unwrap();
        assert_eq!(model.atoms().len(), 1);
    }

    #[test]
    fn truncated_row_is_an_error() {
        let result = parse("HETATM 1 ZN ZN . ZN B . ? 0.000 0.000\n");
        assert!(matches!(
            result,
            Err(ParseError::Parse {
                kind: ParseErrorKind::TruncatedRow { expected: 15, found: 11 },
                ..
            })
        ));
    }

    #[test]
    fn invalid_coordinate_reports_line_and_field() {
        let result = parse("HETATM 1 ZN ZN . ZN B . ? abc 0.000 0.000 301 A 1\n");
        match result {
            Err(ParseError::Parse { line, kind }) => {
                assert_eq!(line, 21);
                assert_eq!(
                    kind,
                    ParseErrorKind::InvalidFloat {
                        field: "Cartn_x".into(),
                        value: "abc".into()
                    }
                );
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_atom_site_loop_is_an_error() {
        let text = "data_EMPTY\n_entry.id EMPTY\n";
        let result = MmcifFile::read_from(&mut Cursor::new(text));
        assert!(matches!(result, Err(ParseError::MissingRecord(_))));
    }

    #[test]
    fn atom_site_loop_without_rows_is_an_error() {
        let result = parse("#\n");
        assert!(matches!(result, Err(ParseError::MissingRecord(_))));
    }

    #[test]
    fn missing_coordinate_column_is_an_error() {
        let text = "\
data_X
loop_
_atom_site.id
_atom_site.label_atom_id
_atom_site.label_comp_id
_atom_site.label_asym_id
ZN 1 ZN A
";
        let result = MmcifFile::read_from(&mut Cursor::new(text));
        assert!(matches!(
            result,
            Err(ParseError::Parse {
                kind: ParseErrorKind::MissingColumn { .. },
                ..
            })
        ));
    }

    #[test]
    fn text_fields_before_the_atom_table_are_skipped() {
        let text = format!(
            "data_1TXT\n_struct.title\n;\nloop_\n_atom_site.bogus\n;\n{}HETATM 1 ZN ZN . ZN B . ? 0.0 0.0 0.0 301 A 1\n",
            &HEADER["data_1ZNF\n".len()..]
        );
        let model = MmcifFile::read_from(&mut Cursor::new(text)).unwrap();
        assert_eq!(model.id(), "1TXT");
        assert_eq!(model.atoms().len(), 1);
    }

    #[test]
    fn tokenizer_respects_quotes_and_embedded_primes() {
        assert_eq!(tokenize("A 'B C' O5' \"D'E\""), vec!["A", "B C", "O5'", "D'E"]);
        assert!(tokenize("   ").is_empty());
    }
}
