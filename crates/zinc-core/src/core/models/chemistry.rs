//! Chemistry lookup tables used to classify atoms and residues.

use phf::phf_set;

/// Element symbol of zinc, compared case-insensitively.
pub const ZINC_SYMBOL: &str = "ZN";

/// Residue names that designate a water molecule in deposited structures.
static WATER_RESIDUE_NAMES: phf::Set<&'static str> = phf_set! {
    "HOH", "DOD", "WAT", "H2O", "D2O", "TIP", "TIP3", "TIP4", "TIP5", "SPC", "SOL",
};

/// Two-letter element symbols that commonly start atom names in hetero groups.
///
/// Used only when a file omits the element column, to tell e.g. a zinc atom named
/// `ZN` apart from a carbon atom named `C1`.
static TWO_LETTER_ELEMENTS: phf::Set<&'static str> = phf_set! {
    "ZN", "FE", "MG", "MN", "CU", "CO", "NI", "CA", "CD", "HG", "NA", "CL", "BR", "SE",
};

/// Returns `true` if `symbol` is the element symbol of zinc, ignoring case and
/// surrounding whitespace.
pub fn is_zinc_element(symbol: &str) -> bool {
    symbol.trim().eq_ignore_ascii_case(ZINC_SYMBOL)
}

/// Returns `true` if `residue_name` is a recognized water designation.
pub fn is_water(residue_name: &str) -> bool {
    let name = residue_name.trim().to_ascii_uppercase();
    WATER_RESIDUE_NAMES.contains(name.as_str())
}

/// Infers an element symbol from an atom name when the file carries none.
///
/// Hetero atoms whose name starts with a known two-letter element (`ZN`, `FE`, ...)
/// keep both letters; everything else falls back to the first alphabetic character.
/// Polymer atoms always take one letter so that a protein `CA` stays a carbon.
pub fn infer_element(atom_name: &str, is_hetero: bool) -> String {
    let letters: String = atom_name
        .trim()
        .chars()
        .skip_while(|c| c.is_ascii_digit())
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();

    if is_hetero && letters.len() >= 2 && TWO_LETTER_ELEMENTS.contains(&letters[..2]) {
        return letters[..2].to_string();
    }
    letters.chars().next().map(String::from).unwrap_or_default()
}
