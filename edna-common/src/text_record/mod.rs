//! Info text parsing
//!
//! Each site ships a loosely structured `.txt` file: one `Label: value` pair
//! per line, optionally repeated per language under a bare upper-case header
//! line (`EN`, `FR`, `ES`). The `Description` line is a single paragraph that
//! itself contains labelled sub-fields, see [`extract`].

pub mod extract;
pub mod translations;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::groups::GroupPrefix;
use crate::language::Language;

pub use extract::{extract_info, extract_info_only};

/// Field holding the nested description map
pub const DESCRIPTION: &str = "Description";

/// Section name for lines that precede any language header
pub const DEFAULT_SECTION: &str = "default";

/// Sub-fields that may appear inside a description paragraph
pub const DESCRIPTION_VOCABULARY: [&str; 8] = [
    "Climate",
    "Geographic location",
    "Human activities",
    "Levels of protection",
    "Ecosystem and habitats",
    "Marine ecosystem type and habitat",
    "Sampling strategy",
    "Typology",
];

/// Fields used by the site list
pub const LIST_KEYS: [&str; 3] = [
    "Title",
    "Description.Typology",
    "Description.Geographic location",
];

/// Fields used by the site detail page
pub const DETAIL_KEYS: [&str; 18] = [
    "Title",
    "Affiliation",
    "Author Details",
    "Authors",
    "Citation",
    "Data and ressources",
    "Email",
    "Funding information",
    "Geospatial Information",
    "Keywords",
    "Related Datasets",
    "Description",
    // description sub-fields written on their own line
    "Geographic Location",
    "Geographic location",
    "Marine ecosystem type and habitat",
    "Human activities",
    "Level of protection",
    "Levels of protection",
];

/// Value of one parsed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Nested(BTreeMap<String, String>),
}

/// Parsed fields of one language section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TextRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl TextRecord {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Plain text field
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(FieldValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn description(&self) -> Option<&BTreeMap<String, String>> {
        match self.fields.get(DESCRIPTION) {
            Some(FieldValue::Nested(map)) => Some(map),
            _ => None,
        }
    }

    /// Description sub-field by lower-cased key (e.g. `typology`)
    pub fn description_field(&self, key: &str) -> Option<&str> {
        self.description()
            .and_then(|map| map.get(key))
            .map(String::as_str)
    }

    fn insert_text(&mut self, key: &str, value: &str) {
        self.fields
            .insert(key.to_string(), FieldValue::Text(value.to_string()));
    }

    /// Add sub-fields to the description, overwriting keys already present
    fn merge_description(&mut self, parsed: BTreeMap<String, String>) {
        let entry = self
            .fields
            .entry(DESCRIPTION.to_string())
            .or_insert_with(|| FieldValue::Nested(BTreeMap::new()));

        match entry {
            FieldValue::Nested(map) => map.extend(parsed),
            other => *other = FieldValue::Nested(parsed),
        }
    }
}

/// Parsed info file, one record per language section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LocalizedRecord {
    sections: BTreeMap<String, TextRecord>,
}

impl Default for LocalizedRecord {
    fn default() -> Self {
        let sections = Language::ALL
            .iter()
            .map(|lang| (lang.code().to_string(), TextRecord::default()))
            .collect();
        Self { sections }
    }
}

impl LocalizedRecord {
    pub fn section(&self, name: &str) -> Option<&TextRecord> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Record to show for `lang`, falling back to the unlabelled section
    pub fn for_language(&self, lang: Language) -> Option<&TextRecord> {
        let labelled = self.sections.get(lang.code());
        match labelled {
            Some(record) if !record.is_empty() => Some(record),
            _ => self.sections.get(DEFAULT_SECTION).or(labelled),
        }
    }

    /// True when no section holds any field
    pub fn is_empty(&self) -> bool {
        self.sections.values().all(TextRecord::is_empty)
    }

    /// Ecosystem group named by the description's typology
    pub fn typology_group(&self, lang: Language) -> Option<GroupPrefix> {
        if let Some(value) = self
            .sections
            .get(lang.code())
            .and_then(|r| r.description_field("typology"))
        {
            return GroupPrefix::from_typology(Some(lang), value);
        }

        self.sections
            .get(DEFAULT_SECTION)
            .and_then(|r| r.description_field("typology"))
            .and_then(|value| GroupPrefix::from_typology(None, value))
    }
}

/// An allow-list entry matches on its part before the first dot
fn key_allowed<S: AsRef<str>>(allowed: &[S], key: &str) -> bool {
    allowed
        .iter()
        .any(|entry| entry.as_ref().split('.').next() == Some(key))
}

/// Sub-keys requested as `Description.<child>`
fn description_children<S: AsRef<str>>(allowed: &[S]) -> Vec<&str> {
    allowed
        .iter()
        .filter_map(|entry| entry.as_ref().split_once('.'))
        .filter(|(parent, _)| *parent == DESCRIPTION)
        .map(|(_, child)| child)
        .collect()
}

/// Parse the lines of one section
///
/// Lines whose label is not allow-listed are skipped. The description
/// paragraph is split positionally. For a vocabulary term written as its own
/// line only the text after the term is split, and whatever labels it holds
/// are merged into the description.
pub fn parse_record<L, A, V>(lines: &[L], allowed_keys: &[A], vocabulary: &[V]) -> TextRecord
where
    L: AsRef<str>,
    A: AsRef<str>,
    V: AsRef<str>,
{
    let labels: Vec<String> = vocabulary
        .iter()
        .map(|term| format!("{}:", term.as_ref()))
        .collect();
    let children = description_children(allowed_keys);

    let mut record = TextRecord::default();

    for line in lines {
        let mut fragments = line.as_ref().split(':').map(str::trim);
        let Some(key) = fragments.next() else {
            continue;
        };
        let rest: Vec<&str> = fragments.collect();

        if rest.is_empty() || !key_allowed(allowed_keys, key) {
            continue;
        }

        if key == DESCRIPTION {
            let content = rest.join(": ");
            let parsed = extract_info_only(&content, labels.as_slice(), children.as_slice());
            record.merge_description(parsed);
        } else if vocabulary.iter().any(|term| term.as_ref() == key) {
            let content = rest.join(": ");
            record.merge_description(extract_info(&content, labels.as_slice()));
        } else {
            record.insert_text(key, rest[0]);
        }
    }

    record
}

/// A header line is a bare run of upper-case letters
fn is_language_header(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_uppercase())
}

/// Parse a whole info file into language sections
pub fn parse_localized<A, V>(text: &str, allowed_keys: &[A], vocabulary: &[V]) -> LocalizedRecord
where
    A: AsRef<str>,
    V: AsRef<str>,
{
    let mut sections: Vec<(String, Vec<String>)> = Vec::new();
    let mut current = DEFAULT_SECTION.to_string();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_language_header(line) {
            current = line.to_lowercase();
            if !sections.iter().any(|(name, _)| *name == current) {
                sections.push((current.clone(), Vec::new()));
            }
            continue;
        }

        let translated = translations::translate_line(&current, line);
        match sections.iter_mut().find(|(name, _)| *name == current) {
            Some((_, lines)) => lines.push(translated),
            None => sections.push((current.clone(), vec![translated])),
        }
    }

    let mut record = LocalizedRecord::default();
    for (name, lines) in sections {
        record
            .sections
            .insert(name, parse_record(lines.as_slice(), allowed_keys, vocabulary));
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTILINGUAL: &str = "\
EN
Title: Lower Rhône
Authors: A. Martin, B. Rossi
Description: Typology: Large river. Geographic location: Rhône delta, France. Climate: Mediterranean.
Email: contact@example.org

FR
Titre: Bas-Rhône
Description: Typologie: Grande rivière. Localisation géographique: Delta du Rhône. Climat: Méditerranéen.

ES
Título: Bajo Ródano
Descripción: Tipología: Gran río. Ubicación geográfica: Delta del Ródano. Clima: Mediterráneo.
";

    #[test]
    fn test_list_keys_restrict_description() {
        let record = parse_localized(MULTILINGUAL, &LIST_KEYS, &DESCRIPTION_VOCABULARY);

        let en = record.section("en").unwrap();
        assert_eq!(en.text("Title"), Some("Lower Rhône"));
        assert_eq!(en.text("Authors"), None);
        assert_eq!(en.text("Email"), None);
        assert_eq!(en.description_field("typology"), Some("Large river"));
        assert_eq!(
            en.description_field("geographic location"),
            Some("Rhône delta, France")
        );
        assert_eq!(en.description_field("climate"), None);
    }

    #[test]
    fn test_sections_are_translated() {
        let record = parse_localized(MULTILINGUAL, &LIST_KEYS, &DESCRIPTION_VOCABULARY);

        let fr = record.section("fr").unwrap();
        assert_eq!(fr.text("Title"), Some("Bas-Rhône"));
        assert_eq!(fr.description_field("typology"), Some("Grande rivière"));

        let es = record.section("es").unwrap();
        assert_eq!(es.text("Title"), Some("Bajo Ródano"));
        assert_eq!(es.description_field("typology"), Some("Gran río"));
        assert_eq!(
            es.description_field("geographic location"),
            Some("Delta del Ródano")
        );
    }

    #[test]
    fn test_typology_group_per_language() {
        let record = parse_localized(MULTILINGUAL, &LIST_KEYS, &DESCRIPTION_VOCABULARY);
        for lang in Language::ALL {
            assert_eq!(
                record.typology_group(lang),
                Some(GroupPrefix::FreshwaterRiver),
                "language {}",
                lang
            );
        }
    }

    #[test]
    fn test_detail_keys_keep_all_description_fields() {
        let record = parse_localized(MULTILINGUAL, &DETAIL_KEYS, &DESCRIPTION_VOCABULARY);
        let en = record.section("en").unwrap();
        assert_eq!(en.text("Authors"), Some("A. Martin, B. Rossi"));
        assert_eq!(en.text("Email"), Some("contact@example.org"));
        assert_eq!(en.description_field("climate"), Some("Mediterranean."));
        assert_eq!(en.description().unwrap().len(), 3);
    }

    #[test]
    fn test_vocabulary_line_merges_into_description() {
        let lines = [
            "Description: Typology: Mountain catchment. Climate: Alpine.",
            "Human activities: Grazing. Sampling strategy: Transects.",
            "Title: Upper Valley: north slope",
        ];
        let record = parse_record(&lines, &DETAIL_KEYS, &DESCRIPTION_VOCABULARY);

        let description = record.description().unwrap();
        assert_eq!(description["typology"], "Mountain catchment");
        assert_eq!(description["climate"], "Alpine.");
        assert_eq!(description["sampling strategy"], "Transects.");
        // the line's own term is not part of the extracted text
        assert!(!description.contains_key("human activities"));
        // only the first fragment after the label is kept
        assert_eq!(record.text("Title"), Some("Upper Valley"));
    }

    #[test]
    fn test_vocabulary_line_without_inner_labels_adds_nothing() {
        let lines = ["Human activities: Grazing and tourism."];
        let record = parse_record(&lines, &DETAIL_KEYS, &DESCRIPTION_VOCABULARY);
        assert_eq!(record.description(), Some(&BTreeMap::new()));
    }

    #[test]
    fn test_lines_without_colon_or_unknown_key_skipped() {
        let lines = ["Just a sentence", "Unknown: value", "Title: Lake"];
        let record = parse_record(&lines, &DETAIL_KEYS, &DESCRIPTION_VOCABULARY);
        assert_eq!(record.text("Title"), Some("Lake"));
        assert!(record.get("Unknown").is_none());
        assert!(record.get("Just a sentence").is_none());
    }

    #[test]
    fn test_unlabelled_text_goes_to_default_section() {
        let text = "Title: Bay of Brest\nDescription: Typology: Marine coastal area.\n";
        let record = parse_localized(text, &LIST_KEYS, &DESCRIPTION_VOCABULARY);

        let default = record.section(DEFAULT_SECTION).unwrap();
        assert_eq!(default.text("Title"), Some("Bay of Brest"));
        assert_eq!(
            record.for_language(Language::Fr).unwrap().text("Title"),
            Some("Bay of Brest")
        );
        assert_eq!(record.typology_group(Language::En), Some(GroupPrefix::Marine));
        assert!(record.section("en").unwrap().is_empty());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = parse_localized(MULTILINGUAL, &DETAIL_KEYS, &DESCRIPTION_VOCABULARY);
        let second = parse_localized(MULTILINGUAL, &DETAIL_KEYS, &DESCRIPTION_VOCABULARY);
        assert_eq!(first, second);
    }

    #[test]
    fn test_serializes_nested_description() {
        let lines = ["Title: Lake", "Description: Typology: Large river."];
        let record = parse_record(&lines, &LIST_KEYS, &DESCRIPTION_VOCABULARY);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Title"], "Lake");
        assert_eq!(json["Description"]["typology"], "Large river.");
    }

    #[test]
    fn test_localized_always_has_core_languages() {
        let record = parse_localized("", &LIST_KEYS, &DESCRIPTION_VOCABULARY);
        let names: Vec<&str> = record.section_names().collect();
        assert_eq!(names, vec!["en", "es", "fr"]);
        assert!(record.is_empty());
    }
}
