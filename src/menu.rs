use serde::{Deserialize, Serialize};

const DISH_SEPARATOR: &str = "<br/>";

/// One cafeteria row as published by the menu provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRow {
    /// Dish names joined by `<br/>`, each optionally followed by a
    /// parenthesised allergen or origin note.
    #[serde(rename = "DDISH_NM", default)]
    pub dishes: String,
    #[serde(rename = "MMEAL_SC_NM", default, skip_serializing_if = "Option::is_none")]
    pub meal_name: Option<String>,
    #[serde(rename = "CAL_INFO", default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<String>,
}

/// Dish names for one date. Empty means the provider had nothing for the day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub dishes: Vec<String>,
}

impl MenuEntry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the display menu from the first row, as the provider lists the
    /// main meal first.
    pub fn from_rows(rows: &[MealRow]) -> Self {
        rows.first()
            .map(|row| Self {
                dishes: parse_dishes(&row.dishes),
            })
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }
}

/// Split a `<br/>`-joined dish list and strip parenthesised notes.
pub fn parse_dishes(raw: &str) -> Vec<String> {
    raw.split(DISH_SEPARATOR)
        .map(|dish| strip_notes(dish).trim().to_string())
        .filter(|dish| !dish.is_empty())
        .collect()
}

/// Remove every `(...)` group, pairing each `(` with the nearest `)`.
/// An unclosed `(` is kept verbatim.
fn strip_notes(dish: &str) -> String {
    let mut out = String::with_capacity(dish.len());
    let mut rest = dish;
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')') else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}
