//! Species cards
//!
//! Each group shows a fixed list of species groups. Their richness count comes
//! from one row of the site's time-series sheet, and which row that is depends
//! on a [`SpeciesYearPolicy`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::groups::GroupPrefix;
use crate::time_series::{
    find_last_year_with_values, row_for_year, select_most_recent, CsvRow, Selection,
};
use crate::Error;

/// Quantity shown when a species group has no reading
pub const NO_QUANTITY: &str = "--";

/// How the year of the richness counts is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesYearPolicy {
    /// Newest row where every species group has a richness value
    #[default]
    AllGroups,
    /// Last year where the first species group has a value
    LeadGroup,
}

impl fmt::Display for SpeciesYearPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeciesYearPolicy::AllGroups => write!(f, "all_groups"),
            SpeciesYearPolicy::LeadGroup => write!(f, "lead_group"),
        }
    }
}

impl FromStr for SpeciesYearPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all_groups" => Ok(SpeciesYearPolicy::AllGroups),
            "lead_group" => Ok(SpeciesYearPolicy::LeadGroup),
            other => Err(Error::InvalidInput(format!(
                "Unknown species year policy '{}' (expected all_groups or lead_group)",
                other
            ))),
        }
    }
}

/// One species card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesEntry {
    pub name: String,
    pub icon: String,
    pub quantity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

/// Cards of a group with no readings yet
pub fn species_placeholders(group: GroupPrefix) -> Vec<SpeciesEntry> {
    group
        .species()
        .iter()
        .map(|name| SpeciesEntry {
            name: name.to_string(),
            icon: group.species_icon(name),
            quantity: NO_QUANTITY.to_string(),
            index: None,
        })
        .collect()
}

/// Row holding the richness counts under `policy`
pub fn select_richness<'a>(
    rows: &'a [CsvRow],
    group: GroupPrefix,
    policy: SpeciesYearPolicy,
    current_year: i32,
) -> Option<Selection<'a>> {
    let columns = group.richness_columns();

    match policy {
        SpeciesYearPolicy::AllGroups => select_most_recent(rows, &columns, current_year),
        SpeciesYearPolicy::LeadGroup => {
            let lead = columns.first()?;
            let year = find_last_year_with_values(rows, std::slice::from_ref(lead))?;
            row_for_year(rows, year).map(|row| Selection { row, year })
        }
    }
}

/// Row holding the species index values
pub fn select_index(rows: &[CsvRow], group: GroupPrefix, current_year: i32) -> Option<Selection<'_>> {
    select_most_recent(rows, group.index_fields(), current_year)
}

/// Copy richness counts from `row`; groups without a value show [`NO_QUANTITY`]
pub fn fill_quantities(entries: &mut [SpeciesEntry], group: GroupPrefix, row: Option<&CsvRow>) {
    for entry in entries {
        let column = format!("{}{}", entry.name, group.richness_suffix());
        entry.quantity = row
            .and_then(|r| r.value(&column))
            .unwrap_or(NO_QUANTITY)
            .to_string();
    }
}

/// Copy `<name>_index` values from `row`
pub fn fill_indices(entries: &mut [SpeciesEntry], row: Option<&CsvRow>) {
    for entry in entries {
        let column = format!("{}_index", entry.name);
        entry.index = row.and_then(|r| r.value(&column)).map(str::to_string);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fish_row(year: &str, lead: &str, rest: &str) -> CsvRow {
        let mut row = CsvRow::new().with("Year", year);
        for (i, column) in GroupPrefix::FreshwaterRiver.richness_columns().iter().enumerate() {
            row.insert(column, if i == 0 { lead } else { rest });
        }
        row
    }

    #[test]
    fn test_placeholders() {
        let cards = species_placeholders(GroupPrefix::FreshwaterMountain);
        assert_eq!(cards.len(), 6);
        assert_eq!(cards[0].name, "Rodents_Lagomorpha");
        assert_eq!(cards[0].quantity, NO_QUANTITY);
        assert_eq!(
            cards[0].icon,
            "/assets/icons/cards/species/fw/rodents_lagomorpha.svg"
        );
    }

    #[test]
    fn test_all_groups_requires_every_column() {
        let rows = vec![
            fish_row("2018", "4", "2"),
            fish_row("2019", "5", "NA"),
        ];
        let selection =
            select_richness(&rows, GroupPrefix::FreshwaterRiver, SpeciesYearPolicy::AllGroups, 2020)
                .unwrap();
        assert_eq!(selection.year, 2018);
    }

    #[test]
    fn test_lead_group_only_looks_at_first_column() {
        let rows = vec![
            fish_row("2018", "4", "2"),
            fish_row("2019", "5", "NA"),
        ];
        let selection =
            select_richness(&rows, GroupPrefix::FreshwaterRiver, SpeciesYearPolicy::LeadGroup, 2020)
                .unwrap();
        assert_eq!(selection.year, 2019);
        assert_eq!(selection.row.get("Large_piscivores_richness"), Some("5"));
    }

    #[test]
    fn test_fill_quantities_marks_missing() {
        let rows = vec![fish_row("2019", "5", "NA")];
        let mut cards = species_placeholders(GroupPrefix::FreshwaterRiver);
        fill_quantities(&mut cards, GroupPrefix::FreshwaterRiver, rows.first());
        assert_eq!(cards[0].quantity, "5");
        assert_eq!(cards[1].quantity, NO_QUANTITY);

        fill_quantities(&mut cards, GroupPrefix::FreshwaterRiver, None);
        assert!(cards.iter().all(|c| c.quantity == NO_QUANTITY));
    }

    #[test]
    fn test_marine_richness_columns_have_no_suffix() {
        let row = CsvRow::new().with("Year", "2020").with("Herbivores", "7");
        let mut cards = species_placeholders(GroupPrefix::Marine);
        fill_quantities(&mut cards, GroupPrefix::Marine, Some(&row));
        let herbivores = cards.iter().find(|c| c.name == "Herbivores").unwrap();
        assert_eq!(herbivores.quantity, "7");
    }

    #[test]
    fn test_index_selection_and_fill() {
        let mut full = CsvRow::new().with("Year", "2019");
        for field in GroupPrefix::Marine.index_fields() {
            full.insert(field, "0.5");
        }
        let mut partial = full.clone().with("Year", "2020");
        partial.insert("Herbivores_index", "NA");

        let rows = vec![full, partial];
        let selection = select_index(&rows, GroupPrefix::Marine, 2020).unwrap();
        assert_eq!(selection.year, 2019);

        let mut cards = species_placeholders(GroupPrefix::Marine);
        fill_indices(&mut cards, Some(selection.row));
        let herbivores = cards.iter().find(|c| c.name == "Herbivores").unwrap();
        assert_eq!(herbivores.index.as_deref(), Some("0.5"));
        let omnivores = cards.iter().find(|c| c.name == "Large_omnivores").unwrap();
        assert_eq!(omnivores.index, None);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("all_groups".parse::<SpeciesYearPolicy>().unwrap(), SpeciesYearPolicy::AllGroups);
        assert_eq!("Lead-Group".parse::<SpeciesYearPolicy>().unwrap(), SpeciesYearPolicy::LeadGroup);
        assert!("newest".parse::<SpeciesYearPolicy>().is_err());
        assert_eq!(SpeciesYearPolicy::LeadGroup.to_string(), "lead_group");
    }
}
