use super::chemistry;
use nalgebra::Point3;

/// One atom of a parsed structure.
///
/// Atoms are immutable once the coordinate model is built. The owning residue is
/// referenced by its index into [`CoordinateModel::residues`](super::structure::CoordinateModel::residues).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Serial number from the source file (`_atom_site.id` or PDB columns 7-11).
    pub serial: usize,
    /// The atom name (e.g., "CA", "NE2", "ZN").
    pub name: String,
    /// The element symbol, upper-cased (e.g., "C", "ZN").
    pub element: String,
    /// Cartesian coordinates in Angstroms.
    pub position: Point3<f64>,
    /// Index of the owning residue within the coordinate model.
    pub residue: usize,
}

impl Atom {
    /// Returns `true` if this atom is a zinc atom.
    pub fn is_zinc(&self) -> bool {
        chemistry::is_zinc_element(&self.element)
    }

    /// Euclidean distance to another atom in Angstroms.
    pub fn distance_to(&self, other: &Atom) -> f64 {
        nalgebra::distance(&self.position, &other.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(element: &str, position: Point3<f64>) -> Atom {
        Atom {
            serial: 1,
            name: element.to_string(),
            element: element.to_string(),
            position,
            residue: 0,
        }
    }

    #[test]
    fn is_zinc_uses_element_not_name() {
        let mut zn = atom("ZN", Point3::origin());
        assert!(zn.is_zinc());
        zn.element = "C".to_string();
        assert!(!zn.is_zinc());
    }

    #[test]
    fn distance_is_euclidean() {
        let a = atom("ZN", Point3::new(0.0, 0.0, 0.0));
        let b = atom("N", Point3::new(1.0, 2.0, 2.0));
        assert!((a.distance_to(&b) - 3.0).abs() < 1e-12);
        assert_eq!(a.distance_to(&b), b.distance_to(&a));
    }
}
