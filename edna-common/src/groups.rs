//! Ecosystem groups and their static reference data
//!
//! Everything in this module is immutable lookup data: the species taxonomy
//! shown for each ecosystem group, the typology phrases that identify a group
//! in each language, and the time-series columns charted for a group.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::language::Language;

/// Ecosystem type a monitored site belongs to
///
/// Serialized with the short codes the front end uses in asset paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupPrefix {
    #[serde(rename = "ma")]
    Marine,
    #[serde(rename = "fw")]
    FreshwaterMountain,
    #[serde(rename = "fw_")]
    FreshwaterRiver,
}

/// Output order of groups in the site list
pub const GROUP_ORDER: [GroupPrefix; 3] = [
    GroupPrefix::Marine,
    GroupPrefix::FreshwaterMountain,
    GroupPrefix::FreshwaterRiver,
];

const FISH_GUILDS: [&str; 6] = [
    "Large_piscivores",
    "Large_omnivores",
    "Small_omnivores",
    "Herbivores",
    "Planktonivores",
    "Small_piscivores",
];

const MAMMAL_ORDERS: [&str; 6] = [
    "Rodents_Lagomorpha",
    "Diprotodontia_Eulipotyphla",
    "Artiodactyla",
    "Carnivores",
    "Chiropteres",
    "Primates",
];

const FISH_INDEX_FIELDS: [&str; 6] = [
    "Planktonivores_index",
    "Herbivores_index",
    "Invertivores_scavengers_index",
    "Omnivores_index",
    "Large_piscivores_index",
    "Small_piscivores_index",
];

const MAMMAL_INDEX_FIELDS: [&str; 6] = [
    "Carnivores_index",
    "Chiropteres_index",
    "Eulipotyphla_index",
    "Primates_index",
    "Rodents_index",
    "Artiodactyla_index",
];

/// Legend entries of the time-series line chart
pub const LEGEND: [&str; 4] = ["Climate", "Human", "Vegetation", "Integrity index"];

/// Column holding the integrity index of a site
pub const INTEGRITY_COLUMN: &str = "Integrity_index";

/// Baseline + change columns summed into one chart line
pub const TOTAL_GROUPS: &[(&str, &[&str])] = &[
    ("Climate_total", &["Climate_intercept", "Climate_change"]),
    ("Vegetation_total", &["Vegetation_intercept", "Vegetation_change"]),
    ("Human_total", &["Human_intercept", "Human_change"]),
];

/// Typology phrases per language, as written in the info files
const TYPOLOGY_EN: [(&str, GroupPrefix); 6] = [
    ("Mountain catchment.", GroupPrefix::FreshwaterMountain),
    ("Large river.", GroupPrefix::FreshwaterRiver),
    ("Marine coastal area.", GroupPrefix::Marine),
    ("Marine Coastal area.", GroupPrefix::Marine),
    ("marine coastal area.", GroupPrefix::Marine),
    ("Coastal marine area.", GroupPrefix::Marine),
];

const TYPOLOGY_FR: [(&str, GroupPrefix); 6] = [
    ("Bassin de montagne.", GroupPrefix::FreshwaterMountain),
    ("Bassin versant de montagne.", GroupPrefix::FreshwaterMountain),
    ("Grande rivière.", GroupPrefix::FreshwaterRiver),
    ("Zone côtière marine.", GroupPrefix::Marine),
    ("Zone marine côtière.", GroupPrefix::Marine),
    ("zone côtière marine.", GroupPrefix::Marine),
];

const TYPOLOGY_ES: [(&str, GroupPrefix); 7] = [
    ("Cuenca de montaña.", GroupPrefix::FreshwaterMountain),
    ("Cuenca montañosa.", GroupPrefix::FreshwaterMountain),
    ("zona costera marina.", GroupPrefix::Marine),
    ("Zona costera marina.", GroupPrefix::Marine),
    ("Área marina costera.", GroupPrefix::Marine),
    ("Área costera marina.", GroupPrefix::Marine),
    ("Gran río.", GroupPrefix::FreshwaterRiver),
];

impl GroupPrefix {
    /// Short code used in asset paths
    pub fn code(self) -> &'static str {
        match self {
            GroupPrefix::Marine => "ma",
            GroupPrefix::FreshwaterMountain => "fw",
            GroupPrefix::FreshwaterRiver => "fw_",
        }
    }

    /// Map the token found before the first underscore of a key
    pub fn from_path_token(token: &str) -> Option<Self> {
        match token {
            "ma" => Some(GroupPrefix::Marine),
            "fw" => Some(GroupPrefix::FreshwaterMountain),
            "fw_" => Some(GroupPrefix::FreshwaterRiver),
            _ => None,
        }
    }

    /// Look up a parsed `Description.typology` value
    ///
    /// With no language every table is searched (text files without
    /// language headers).
    pub fn from_typology(lang: Option<Language>, value: &str) -> Option<Self> {
        let wanted = normalize_typology(value);
        if wanted.is_empty() {
            return None;
        }

        let tables: Vec<&[(&str, GroupPrefix)]> = match lang {
            Some(Language::En) => vec![&TYPOLOGY_EN[..]],
            Some(Language::Fr) => vec![&TYPOLOGY_FR[..]],
            Some(Language::Es) => vec![&TYPOLOGY_ES[..]],
            None => vec![&TYPOLOGY_EN[..], &TYPOLOGY_FR[..], &TYPOLOGY_ES[..]],
        };

        tables
            .into_iter()
            .flat_map(|table| table.iter())
            .find(|(phrase, _)| normalize_typology(phrase) == wanted)
            .map(|(_, group)| *group)
    }

    /// Species groups shown on a site card
    pub fn species(self) -> &'static [&'static str] {
        match self {
            GroupPrefix::Marine | GroupPrefix::FreshwaterRiver => &FISH_GUILDS,
            GroupPrefix::FreshwaterMountain => &MAMMAL_ORDERS,
        }
    }

    /// Suffix of the richness column for a species group
    ///
    /// Marine sheets name the richness column after the guild itself.
    pub fn richness_suffix(self) -> &'static str {
        match self {
            GroupPrefix::Marine => "",
            GroupPrefix::FreshwaterMountain | GroupPrefix::FreshwaterRiver => "_richness",
        }
    }

    /// Richness column for every species group, in display order
    pub fn richness_columns(self) -> Vec<String> {
        self.species()
            .iter()
            .map(|name| format!("{}{}", name, self.richness_suffix()))
            .collect()
    }

    /// Index columns that must all be present for an index reading
    pub fn index_fields(self) -> &'static [&'static str] {
        match self {
            GroupPrefix::FreshwaterMountain => &MAMMAL_INDEX_FIELDS,
            GroupPrefix::Marine | GroupPrefix::FreshwaterRiver => &FISH_INDEX_FIELDS,
        }
    }

    pub fn species_icon(self, species: &str) -> String {
        format!(
            "/assets/icons/cards/species/{}/{}.svg",
            self.code(),
            species.to_lowercase()
        )
    }
}

impl fmt::Display for GroupPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Column charted for a legend entry
pub fn legend_column(name: &str) -> String {
    if name.contains("Integrity") {
        INTEGRITY_COLUMN.to_string()
    } else {
        format!("{}_intercept", name)
    }
}

/// Icon of a legend entry (only the first space becomes a dash)
pub fn legend_icon(name: &str) -> String {
    format!(
        "/assets/icons/charts/legend/time-series-changes/{}.svg",
        name.to_lowercase().trim().replacen(' ', "-", 1)
    )
}

/// Map marker for an integrity index value
pub fn integrity_icon(value: Option<&str>) -> &'static str {
    let parsed = value.and_then(|v| v.trim().parse::<f64>().ok());
    match parsed {
        Some(v) if (0.0..=0.2).contains(&v) => "/assets/icons/map/point_red.svg",
        Some(v) if v > 0.2 && v <= 0.4 => "/assets/icons/map/point_orange.svg",
        Some(v) if v > 0.4 && v <= 0.6 => "/assets/icons/map/point_yellow.svg",
        Some(v) if v > 0.6 && v.is_finite() => "/assets/icons/map/point_green.svg",
        _ => "/assets/icons/map/point_gray.svg",
    }
}

fn normalize_typology(value: &str) -> String {
    let trimmed = value.trim();
    trimmed
        .strip_suffix('.')
        .unwrap_or(trimmed)
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_tokens() {
        assert_eq!(GroupPrefix::from_path_token("ma"), Some(GroupPrefix::Marine));
        assert_eq!(
            GroupPrefix::from_path_token("fw"),
            Some(GroupPrefix::FreshwaterMountain)
        );
        assert_eq!(GroupPrefix::from_path_token("edna"), None);
    }

    #[test]
    fn test_typology_with_or_without_period() {
        assert_eq!(
            GroupPrefix::from_typology(Some(Language::En), "Large river."),
            Some(GroupPrefix::FreshwaterRiver)
        );
        assert_eq!(
            GroupPrefix::from_typology(Some(Language::En), "Large river"),
            Some(GroupPrefix::FreshwaterRiver)
        );
        assert_eq!(
            GroupPrefix::from_typology(Some(Language::Es), "Gran río."),
            Some(GroupPrefix::FreshwaterRiver)
        );
        assert_eq!(
            GroupPrefix::from_typology(Some(Language::Fr), "Bassin versant de montagne."),
            Some(GroupPrefix::FreshwaterMountain)
        );
    }

    #[test]
    fn test_typology_is_language_specific() {
        assert_eq!(GroupPrefix::from_typology(Some(Language::En), "Gran río."), None);
        assert_eq!(
            GroupPrefix::from_typology(None, "Gran río."),
            Some(GroupPrefix::FreshwaterRiver)
        );
        assert_eq!(GroupPrefix::from_typology(Some(Language::En), ""), None);
    }

    #[test]
    fn test_richness_columns() {
        assert_eq!(GroupPrefix::Marine.richness_columns()[0], "Large_piscivores");
        assert_eq!(
            GroupPrefix::FreshwaterRiver.richness_columns()[0],
            "Large_piscivores_richness"
        );
        assert_eq!(
            GroupPrefix::FreshwaterMountain.richness_columns()[0],
            "Rodents_Lagomorpha_richness"
        );
    }

    #[test]
    fn test_serialized_codes() {
        assert_eq!(
            serde_json::to_string(&GroupPrefix::FreshwaterRiver).unwrap(),
            "\"fw_\""
        );
        assert_eq!(GroupPrefix::Marine.to_string(), "ma");
    }

    #[test]
    fn test_species_icon() {
        assert_eq!(
            GroupPrefix::FreshwaterRiver.species_icon("Large_piscivores"),
            "/assets/icons/cards/species/fw_/large_piscivores.svg"
        );
    }

    #[test]
    fn test_legend_helpers() {
        assert_eq!(legend_column("Climate"), "Climate_intercept");
        assert_eq!(legend_column("Integrity index"), "Integrity_index");
        assert_eq!(
            legend_icon("Integrity index"),
            "/assets/icons/charts/legend/time-series-changes/integrity-index.svg"
        );
    }

    #[test]
    fn test_integrity_icon_thresholds() {
        assert_eq!(integrity_icon(Some("0.1")), "/assets/icons/map/point_red.svg");
        assert_eq!(integrity_icon(Some("0.2")), "/assets/icons/map/point_red.svg");
        assert_eq!(integrity_icon(Some("0.35")), "/assets/icons/map/point_orange.svg");
        assert_eq!(integrity_icon(Some("0.6")), "/assets/icons/map/point_yellow.svg");
        assert_eq!(integrity_icon(Some("0.9")), "/assets/icons/map/point_green.svg");
        assert_eq!(integrity_icon(Some("NA")), "/assets/icons/map/point_gray.svg");
        assert_eq!(integrity_icon(Some("-1")), "/assets/icons/map/point_gray.svg");
        assert_eq!(integrity_icon(None), "/assets/icons/map/point_gray.svg");
    }
}
