use super::ast::Keyword;
use crate::core::models::field::{Field, FloatField, IntegerField, TextField};
use phf::{Map, phf_map};

/// Bumped whenever a keyword or field name is added, removed or changes meaning.
pub const KEYWORD_TABLE_VERSION: u32 = 1;

static KEYWORDS: Map<&'static str, Keyword> = phf_map! {
    "all" => Keyword::All,
    "none" => Keyword::None,
    "protein" => Keyword::Protein,
    "water" => Keyword::Water,
    "backbone" => Keyword::Backbone,
    "sidechain" => Keyword::Sidechain,
    "calpha" => Keyword::Calpha,
    "hydrogen" => Keyword::Hydrogen,
    "heavy" => Keyword::Heavy,
    "nucleic" => Keyword::Nucleic,
    "ion" => Keyword::Ion,
    "hetero" => Keyword::Hetero,
    "acidic" => Keyword::Acidic,
    "basic" => Keyword::Basic,
    "charged" => Keyword::Charged,
    "aromatic" => Keyword::Aromatic,
    "hydrophobic" => Keyword::Hydrophobic,
};

static FIELDS: Map<&'static str, Field> = phf_map! {
    "name" => Field::Text(TextField::Name),
    "resname" => Field::Text(TextField::Resname),
    "chain" => Field::Text(TextField::Chain),
    "chid" => Field::Text(TextField::Chain),
    "element" => Field::Text(TextField::Element),
    "segment" => Field::Text(TextField::Segment),
    "segname" => Field::Text(TextField::Segment),
    "resnum" => Field::Integer(IntegerField::Resnum),
    "resid" => Field::Integer(IntegerField::Resnum),
    "serial" => Field::Integer(IntegerField::Serial),
    "index" => Field::Integer(IntegerField::Index),
    "resindex" => Field::Integer(IntegerField::Resindex),
    "occupancy" => Field::Float(FloatField::Occupancy),
    "beta" => Field::Float(FloatField::Beta),
    "bfactor" => Field::Float(FloatField::Beta),
    "charge" => Field::Float(FloatField::Charge),
    "mass" => Field::Float(FloatField::Mass),
    "x" => Field::Float(FloatField::X),
    "y" => Field::Float(FloatField::Y),
    "z" => Field::Float(FloatField::Z),
};

/// Words with grammatical meaning. Like keywords they must be quoted to be used as values.
const OPERATOR_WORDS: [&str; 9] = [
    "and", "or", "not", "within", "exwithin", "of", "same", "as", "to",
];

pub fn is_operator_word(word: &str) -> bool {
    OPERATOR_WORDS.contains(&word)
}

/// Looks up a flag keyword. Names are lowercase and case-sensitive.
pub fn lookup_keyword(word: &str) -> Option<Keyword> {
    KEYWORDS.get(word).copied()
}

/// Looks up a field name or alias.
pub fn lookup_field(word: &str) -> Option<Field> {
    FIELDS.get(word).copied()
}

/// Whether `word` is a keyword or field name and so cannot be an unquoted value.
pub fn is_reserved_name(word: &str) -> bool {
    KEYWORDS.contains_key(word) || FIELDS.contains_key(word)
}

/// All keyword names, sorted.
pub fn keyword_names() -> Vec<&'static str> {
    let mut names: Vec<_> = KEYWORDS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// All field names and aliases, sorted.
pub fn field_names() -> Vec<&'static str> {
    let mut names: Vec<_> = FIELDS.keys().copied().collect();
    names.sort_unstable();
    names
}
