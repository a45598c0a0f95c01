use super::atom::Atom;
use super::chemistry;
use super::residue::{Residue, ResidueKey};
use super::structure::CoordinateModel;
use nalgebra::Point3;
use std::collections::{HashMap, HashSet};

/// One atom record as read from a structure file, before it is placed in a model.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub serial: usize,
    pub name: String,
    pub element: Option<String>,
    pub residue_name: String,
    pub key: ResidueKey,
    pub alt_loc: Option<char>,
    pub is_hetero: bool,
    pub position: Point3<f64>,
}

impl AtomRecord {
    pub fn new(
        name: &str,
        element: &str,
        residue_name: &str,
        chain_id: &str,
        seq_num: i32,
        position: Point3<f64>,
    ) -> Self {
        Self {
            serial: 0,
            name: name.to_string(),
            element: (!element.is_empty()).then(|| element.to_ascii_uppercase()),
            residue_name: residue_name.to_string(),
            key: ResidueKey::new(chain_id, seq_num, None),
            alt_loc: None,
            is_hetero: false,
            position,
        }
    }

    pub fn hetero(mut self) -> Self {
        self.is_hetero = true;
        self
    }

    pub fn serial(mut self, serial: usize) -> Self {
        self.serial = serial;
        self
    }

    pub fn alt_loc(mut self, alt_loc: char) -> Self {
        self.alt_loc = Some(alt_loc);
        self
    }

    pub fn ins_code(mut self, ins_code: char) -> Self {
        self.key.ins_code = Some(ins_code);
        self
    }
}

/// Incrementally assembles a [`CoordinateModel`] from atom records.
///
/// Alternate conformations are collapsed to the first-listed one: an atom carrying an
/// alternate location indicator is dropped when its residue already holds an atom of
/// the same name, or when the residue site is already occupied by a residue of a
/// different name (sequence microheterogeneity).
pub struct CoordinateModelBuilder {
    model: CoordinateModel,

    // --- Builder-specific state for efficient construction ---
    residue_map: HashMap<(ResidueKey, String), usize>,
    site_names: HashMap<ResidueKey, String>,
    atom_names: HashSet<(usize, String)>,
    dropped_alternates: usize,
}

impl CoordinateModelBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            model: CoordinateModel {
                id: id.to_string(),
                atoms: Vec::new(),
                residues: Vec::new(),
            },
            residue_map: HashMap::new(),
            site_names: HashMap::new(),
            atom_names: HashSet::new(),
            dropped_alternates: 0,
        }
    }

    /// Overrides the structure identifier, e.g. once a `data_` block name is known.
    pub fn set_id(&mut self, id: &str) -> &mut Self {
        self.model.id = id.to_string();
        self
    }

    /// Adds an atom, returning `false` if it was dropped as a later alternate conformation.
    pub fn add_atom(&mut self, record: AtomRecord) -> bool {
        let is_alternate = record.alt_loc.is_some();

        if is_alternate {
            if let Some(first_name) = self.site_names.get(&record.key) {
                if *first_name != record.residue_name {
                    self.dropped_alternates += 1;
                    return false;
                }
            }
        }

        let res_idx = self.residue_index(&record);

        if is_alternate && self.atom_names.contains(&(res_idx, record.name.clone())) {
            self.dropped_alternates += 1;
            return false;
        }
        self.atom_names.insert((res_idx, record.name.clone()));

        let element = record
            .element
            .unwrap_or_else(|| chemistry::infer_element(&record.name, record.is_hetero));

        let atom_idx = self.model.atoms.len();
        self.model.atoms.push(Atom {
            serial: record.serial,
            name: record.name,
            element,
            position: record.position,
            residue: res_idx,
        });
        self.model.residues[res_idx].atoms.push(atom_idx);
        true
    }

    /// Number of alternate-conformation atoms dropped so far.
    pub fn dropped_alternates(&self) -> usize {
        self.dropped_alternates
    }

    pub fn atom_count(&self) -> usize {
        self.model.atoms.len()
    }

    pub fn build(self) -> CoordinateModel {
        self.model
    }

    fn residue_index(&mut self, record: &AtomRecord) -> usize {
        self.site_names
            .entry(record.key.clone())
            .or_insert_with(|| record.residue_name.clone());

        let lookup = (record.key.clone(), record.residue_name.clone());
        *self.residue_map.entry(lookup).or_insert_with(|| {
            let index = self.model.residues.len();
            self.model.residues.push(Residue::new(
                &record.residue_name,
                record.key.clone(),
                record.is_hetero,
            ));
            index
        })
    }
}
