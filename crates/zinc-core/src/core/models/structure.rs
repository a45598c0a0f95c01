use super::atom::Atom;
use super::residue::Residue;

/// The parsed atoms and residues of one structure.
///
/// A coordinate model is built once per structure scan by
/// [`CoordinateModelBuilder`](super::builder::CoordinateModelBuilder) and dropped when
/// the scan completes. It holds no interior mutability, so it can be shared freely
/// between the search stages of a single scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateModel {
    /// The structure identifier (accession code or data block name).
    pub(crate) id: String,
    /// Atoms in file order.
    pub(crate) atoms: Vec<Atom>,
    /// Residues in order of first appearance.
    pub(crate) residues: Vec<Residue>,
}

impl CoordinateModel {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn residue(&self, index: usize) -> Option<&Residue> {
        self.residues.get(index)
    }

    /// Returns the residue owning `atom`.
    ///
    /// # Panics
    ///
    /// Panics if `atom` was not taken from this model.
    pub fn residue_of(&self, atom: &Atom) -> &Residue {
        &self.residues[atom.residue]
    }

    /// Returns `true` if the residue at `index` consists solely of zinc atoms,
    /// i.e. it is a free zinc ion rather than a group that merely contains zinc.
    pub fn is_zinc_ion(&self, index: usize) -> bool {
        self.residue(index).is_some_and(|residue| {
            !residue.atoms.is_empty()
                && residue
                    .atoms
                    .iter()
                    .all(|&atom_idx| self.atoms[atom_idx].is_zinc())
        })
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}
