//! Category Classifier Module
//! Groups raw event types into higher-level hazard categories.

use std::collections::BTreeSet;
use std::fmt;

use super::record::pretty_event_label;

/// Placeholder shown for a category none of whose members occur in the data.
pub const NO_MATCHING_EVENTS: &str = "No matching events in data";

/// Higher-level hazard category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Geophysical,
    Geomorphological,
    Atmospheric,
    Climatological,
    Hydrological,
    Ecological,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Geophysical,
        Category::Geomorphological,
        Category::Atmospheric,
        Category::Climatological,
        Category::Hydrological,
        Category::Ecological,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Geophysical => "Geophysical",
            Category::Geomorphological => "Geomorphological",
            Category::Atmospheric => "Atmospheric",
            Category::Climatological => "Climatological",
            Category::Hydrological => "Hydrological",
            Category::Ecological => "Ecological",
        }
    }

    /// Member event types of the standard table.
    pub fn standard_members(&self) -> &'static [&'static str] {
        match self {
            Category::Geophysical => &["earthquake", "volcanic eruption", "tsunami"],
            Category::Geomorphological => &["landslide"],
            Category::Atmospheric => &["hailstorm", "tornado", "hurricane"],
            Category::Climatological => &["coldwave", "heatwave", "drought"],
            Category::Hydrological => &["flood"],
            Category::Ecological => &["wildfire"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lower-case, trim and turn underscores into spaces.
pub fn normalize_event_type(raw: &str) -> String {
    raw.trim().to_lowercase().replace('_', " ")
}

/// Fixed mapping category -> member event-type names, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    entries: Vec<(Category, Vec<String>)>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl CategoryTable {
    pub fn standard() -> Self {
        Self::new(Category::ALL.iter().map(|c| {
            (
                *c,
                c.standard_members().iter().map(|m| m.to_string()).collect(),
            )
        }))
    }

    pub fn new(entries: impl IntoIterator<Item = (Category, Vec<String>)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn entries(&self) -> &[(Category, Vec<String>)] {
        &self.entries
    }
}

/// A category with the observed raw event types that belong to it.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMembers {
    pub category: Category,
    /// Raw spellings as they appear in the data, sorted.
    pub members: Vec<String>,
}

impl CategoryMembers {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// `"Geophysical (Earthquake, Volcanic Eruption)"`.
    pub fn label(&self) -> String {
        let inside = if self.members.is_empty() {
            NO_MATCHING_EVENTS.to_string()
        } else {
            self.members
                .iter()
                .map(|m| pretty_event_label(m))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("{} ({})", self.category.name(), inside)
    }
}

/// Result of matching a [`CategoryTable`] against the observed event types.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification {
    categories: Vec<CategoryMembers>,
}

impl Classification {
    /// Every category of the table, in table order, including empty ones.
    pub fn categories(&self) -> &[CategoryMembers] {
        &self.categories
    }

    pub fn get(&self, category: Category) -> Option<&CategoryMembers> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// Observed members of `category` (empty when unknown or unmatched).
    pub fn members(&self, category: Category) -> &[String] {
        self.get(category).map(|c| c.members.as_slice()).unwrap_or(&[])
    }

    /// First category, in table order, among `selected` that owns `event_type`.
    pub fn owner_among(
        &self,
        event_type: &str,
        selected: &BTreeSet<Category>,
    ) -> Option<Category> {
        self.categories
            .iter()
            .filter(|c| selected.contains(&c.category))
            .find(|c| c.members.iter().any(|m| m == event_type))
            .map(|c| c.category)
    }
}

/// Match every table member against the observed event types.
///
/// A member matches when its normalized form equals the normalized form of
/// an observed type; all observed spellings that match are kept.
pub fn classify<S: AsRef<str>>(table: &CategoryTable, observed: &[S]) -> Classification {
    let categories = table
        .entries()
        .iter()
        .map(|(category, members)| {
            let wanted: BTreeSet<String> =
                members.iter().map(|m| normalize_event_type(m)).collect();
            let matched: BTreeSet<String> = observed
                .iter()
                .map(AsRef::as_ref)
                .filter(|raw| wanted.contains(&normalize_event_type(raw)))
                .map(str::to_string)
                .collect();
            CategoryMembers {
                category: *category,
                members: matched.into_iter().collect(),
            }
        })
        .collect();

    Classification { categories }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_case_and_underscores() {
        let table = CategoryTable::new([(Category::Climatological, vec!["cold wave".to_string()])]);

        let a = classify(&table, &["Cold_Wave"]);
        let b = classify(&table, &["cold wave"]);
        assert_eq!(a.members(Category::Climatological), ["Cold_Wave"]);
        assert_eq!(b.members(Category::Climatological), ["cold wave"]);
        assert_eq!(
            a.get(Category::Climatological).unwrap().label(),
            b.get(Category::Climatological).unwrap().label()
        );
    }

    #[test]
    fn standard_table_keeps_observed_spelling() {
        let observed = ["Volcanic_Eruption", "earthquake", "Flood", "meteor"];
        let c = classify(&CategoryTable::standard(), &observed);

        assert_eq!(
            c.members(Category::Geophysical),
            ["Volcanic_Eruption", "earthquake"]
        );
        assert_eq!(c.members(Category::Hydrological), ["Flood"]);
        assert_eq!(c.categories().len(), Category::ALL.len());
    }

    #[test]
    fn unmatched_category_is_reported_empty() {
        let c = classify(&CategoryTable::standard(), &["flood"]);
        let eco = c.get(Category::Ecological).unwrap();
        assert!(eco.is_empty());
        assert_eq!(eco.label(), "Ecological (No matching events in data)");
    }

    #[test]
    fn label_lists_pretty_members() {
        let c = classify(&CategoryTable::standard(), &["tornado", "hurricane"]);
        assert_eq!(
            c.get(Category::Atmospheric).unwrap().label(),
            "Atmospheric (Hurricane, Tornado)"
        );
    }

    #[test]
    fn owner_follows_table_order() {
        let table = CategoryTable::new([
            (Category::Hydrological, vec!["flood".to_string()]),
            (Category::Ecological, vec!["flood".to_string()]),
        ]);
        let c = classify(&table, &["flood"]);
        let both: BTreeSet<_> = [Category::Ecological, Category::Hydrological].into();
        assert_eq!(c.owner_among("flood", &both), Some(Category::Hydrological));

        let eco_only: BTreeSet<_> = [Category::Ecological].into();
        assert_eq!(c.owner_among("flood", &eco_only), Some(Category::Ecological));
    }
}
