use super::neighbors::NeighborHit;
use std::collections::BTreeMap;

/// The reduced finding for one structure that has at least one qualifying ligand.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureResult {
    /// Structure identifier, upper-cased.
    pub identifier: String,
    /// Distinct ligand residue names, sorted.
    pub ligand_names: Vec<String>,
    /// Smallest zinc-ligand distance over every hit of the structure, in Angstroms.
    pub min_distance: f64,
    /// Smallest distance per ligand name.
    pub closest_by_ligand: BTreeMap<String, f64>,
}

/// Reduces the hits of every zinc atom in a structure into a single result.
///
/// Returns `None` when `hits` is empty, which marks the structure as an empty finding.
pub fn aggregate(identifier: &str, hits: &[NeighborHit]) -> Option<StructureResult> {
    let mut closest_by_ligand: BTreeMap<String, f64> = BTreeMap::new();
    for hit in hits {
        closest_by_ligand
            .entry(hit.ligand.clone())
            .and_modify(|d| *d = d.min(hit.distance))
            .or_insert(hit.distance);
    }

    let min_distance = closest_by_ligand.values().copied().reduce(f64::min)?;

    Some(StructureResult {
        identifier: identifier.to_ascii_uppercase(),
        ligand_names: closest_by_ligand.keys().cloned().collect(),
        min_distance,
        closest_by_ligand,
    })
}
