use crate::core::models::atom::Atom;
use crate::core::models::structure::CoordinateModel;
use std::iter::Enumerate;
use std::slice::Iter;

/// A zinc atom together with its index in the coordinate model.
#[derive(Debug, Clone, Copy)]
pub struct ZincAtom<'a> {
    pub index: usize,
    pub atom: &'a Atom,
}

/// Lazy, finite iterator over the zinc atoms of a model, in file order.
///
/// The sequence is consumed once; call [`locate_zinc`] again for a fresh pass.
#[derive(Debug, Clone)]
pub struct ZincAtoms<'a> {
    atoms: Enumerate<Iter<'a, Atom>>,
}

impl<'a> Iterator for ZincAtoms<'a> {
    type Item = ZincAtom<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.atoms
            .find(|(_, atom)| atom.is_zinc())
            .map(|(index, atom)| ZincAtom { index, atom })
    }
}

/// Scans `model` for atoms whose element is zinc (case-insensitive).
pub fn locate_zinc(model: &CoordinateModel) -> ZincAtoms<'_> {
    ZincAtoms {
        atoms: model.atoms().iter().enumerate(),
    }
}
