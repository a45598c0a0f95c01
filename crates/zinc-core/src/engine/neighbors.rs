use super::config::CandidatePolicy;
use super::locator::{ZincAtom, locate_zinc};
use crate::core::models::structure::CoordinateModel;
use kiddo::{KdTree, SquaredEuclidean};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, trace};

/// Relative slack applied to the k-d tree query so that atoms lying exactly on the
/// radius survive floating-point rounding; every candidate is re-checked exactly.
const QUERY_SLACK: f64 = 1e-9;

/// Bucket capacity of kiddo's default `KdTree`. Construction cannot split a bucket
/// whose points share one value on the split axis, so more coincident values than
/// this on any axis rule the tree out.
const TREE_BUCKET_SIZE: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Atom {serial} has a non-finite coordinate")]
    NonFiniteCoordinate { serial: usize },
}

/// One residue observed within the search radius of one zinc atom.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborHit {
    /// Index of the zinc atom the search was centred on.
    pub zinc_atom: usize,
    /// Index of the neighboring residue.
    pub residue: usize,
    /// Name of the neighboring residue.
    pub ligand: String,
    /// Distance from the zinc atom to the nearest atom of the residue, in Angstroms.
    pub distance: f64,
}

enum SpatialIndex {
    Tree(KdTree<f64, 3>),
    Linear,
}

/// Radius search around zinc atoms of one coordinate model.
///
/// A residue qualifies as a neighbor of a zinc atom when it is not the zinc atom's own
/// residue, is not water, is not a zinc ion (a residue made only of zinc atoms), and
/// satisfies the configured [`CandidatePolicy`]. The recorded distance is the minimum
/// over all atoms of the residue.
pub struct NeighborSearch<'a> {
    model: &'a CoordinateModel,
    index: SpatialIndex,
    policy: CandidatePolicy,
}

impl<'a> NeighborSearch<'a> {
    /// Indexes every atom of `model` for radius queries.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::NonFiniteCoordinate`] if any atom has a NaN or infinite
    /// coordinate, since no distance to it is meaningful.
    pub fn new(model: &'a CoordinateModel, policy: CandidatePolicy) -> Result<Self, SearchError> {
        let positions = model
            .atoms()
            .iter()
            .map(|atom| {
                let p = atom.position;
                if p.coords.iter().all(|c| c.is_finite()) {
                    Ok([p.x, p.y, p.z])
                } else {
                    Err(SearchError::NonFiniteCoordinate {
                        serial: atom.serial,
                    })
                }
            })
            .collect::<Result<Vec<[f64; 3]>, _>>()?;

        let index = if fits_in_tree(&positions) {
            SpatialIndex::Tree((&positions).into())
        } else {
            debug!(
                structure = model.id(),
                "Too many atoms share a coordinate value; using a linear scan."
            );
            SpatialIndex::Linear
        };

        Ok(Self {
            model,
            index,
            policy,
        })
    }

    /// Returns one hit per qualifying residue within `radius` Angstroms of `zinc`,
    /// ordered by residue index. `radius` must be positive.
    pub fn around(&self, zinc: ZincAtom<'_>, radius: f64) -> Vec<NeighborHit> {
        let zinc_residue = zinc.atom.residue;
        let mut closest: BTreeMap<usize, f64> = BTreeMap::new();

        for atom_idx in self.atoms_near(zinc, radius) {
            let atom = &self.model.atoms()[atom_idx];
            let distance = zinc.atom.distance_to(atom);
            if distance > radius || !self.is_candidate(atom.residue, zinc_residue) {
                continue;
            }
            closest
                .entry(atom.residue)
                .and_modify(|d| *d = d.min(distance))
                .or_insert(distance);
        }

        trace!(zinc_atom = zinc.index, hits = closest.len(), "Searched around zinc atom.");

        closest
            .into_iter()
            .map(|(residue, distance)| NeighborHit {
                zinc_atom: zinc.index,
                residue,
                ligand: self.model.residues()[residue].name.clone(),
                distance,
            })
            .collect()
    }

    /// Runs one independent search per zinc atom and concatenates the hits.
    pub fn around_all_zinc(&self, radius: f64) -> Vec<NeighborHit> {
        locate_zinc(self.model)
            .flat_map(|zinc| self.around(zinc, radius))
            .collect()
    }

    fn atoms_near(&self, zinc: ZincAtom<'_>, radius: f64) -> Vec<usize> {
        match &self.index {
            SpatialIndex::Tree(tree) => {
                let p = zinc.atom.position;
                let radius_sq = radius * radius * (1.0 + QUERY_SLACK);
                tree.within_unsorted::<SquaredEuclidean>(&[p.x, p.y, p.z], radius_sq)
                    .into_iter()
                    .map(|neighbour| neighbour.item as usize)
                    .collect()
            }
            SpatialIndex::Linear => (0..self.model.atoms().len()).collect(),
        }
    }

    fn is_candidate(&self, residue_idx: usize, zinc_residue: usize) -> bool {
        if residue_idx == zinc_residue {
            return false;
        }
        let residue = &self.model.residues()[residue_idx];
        if residue.is_water() || self.model.is_zinc_ion(residue_idx) {
            return false;
        }
        match self.policy {
            CandidatePolicy::AllResidues => true,
            CandidatePolicy::HeteroOnly => residue.is_hetero,
        }
    }
}

/// True when no axis holds more than [`TREE_BUCKET_SIZE`] atoms at the same value.
fn fits_in_tree(positions: &[[f64; 3]]) -> bool {
    (0..3).all(|axis| {
        let mut values: Vec<f64> = positions.iter().map(|p| p[axis]).collect();
        values.sort_unstable_by(f64::total_cmp);
        values
            .chunk_by(|a, b| a == b)
            .all(|run| run.len() <= TREE_BUCKET_SIZE)
    })
}

/// Convenience wrapper: indexes `model` and searches around every zinc atom in it.
pub fn search_structure(
    model: &CoordinateModel,
    radius: f64,
    policy: CandidatePolicy,
) -> Result<Vec<NeighborHit>, SearchError> {
    Ok(NeighborSearch::new(model, policy)?.around_all_zinc(radius))
}
