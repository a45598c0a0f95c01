use super::chemistry;
use std::fmt;

/// Identity of a residue instance within a structure: chain, sequence number and
/// insertion code. Two residues with equal keys are the same residue site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueKey {
    pub chain_id: String,
    pub seq_num: i32,
    pub ins_code: Option<char>,
}

impl ResidueKey {
    pub fn new(chain_id: &str, seq_num: i32, ins_code: Option<char>) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            seq_num,
            ins_code,
        }
    }
}

impl fmt::Display for ResidueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ins_code {
            Some(code) => write!(f, "{}:{}{}", self.chain_id, self.seq_num, code),
            None => write!(f, "{}:{}", self.chain_id, self.seq_num),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub name: String,            // Residue (component) name, e.g. "HIS", "HOH", "ZN"
    pub key: ResidueKey,         // Chain + sequence number + insertion code
    pub is_hetero: bool,         // True for HETATM groups
    pub(crate) atoms: Vec<usize>, // Indices of the atoms belonging to this residue
}

impl Residue {
    pub(crate) fn new(name: &str, key: ResidueKey, is_hetero: bool) -> Self {
        Self {
            name: name.to_string(),
            key,
            is_hetero,
            atoms: Vec::new(),
        }
    }

    pub fn atoms(&self) -> &[usize] {
        &self.atoms
    }

    pub fn is_water(&self) -> bool {
        chemistry::is_water(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_residue_initializes_fields_correctly() {
        let residue = Residue::new("HIS", ResidueKey::new("A", 96, None), false);
        assert_eq!(residue.name, "HIS");
        assert_eq!(residue.key.chain_id, "A");
        assert_eq!(residue.key.seq_num, 96);
        assert!(!residue.is_hetero);
        assert!(residue.atoms().is_empty());
    }

    #[test]
    fn water_detection_follows_residue_name() {
        assert!(Residue::new("HOH", ResidueKey::new("A", 501, None), true).is_water());
        assert!(!Residue::new("ZN", ResidueKey::new("A", 301, None), true).is_water());
    }

    #[test]
    fn keys_display_with_optional_insertion_code() {
        assert_eq!(ResidueKey::new("B", 52, None).to_string(), "B:52");
        assert_eq!(ResidueKey::new("B", 52, Some('A')).to_string(), "B:52A");
    }

    #[test]
    fn keys_with_different_insertion_codes_are_distinct() {
        let plain = ResidueKey::new("A", 10, None);
        let inserted = ResidueKey::new("A", 10, Some('A'));
        assert_ne!(plain, inserted);
        assert!(plain < inserted);
    }
}
