//! Tea stash data models.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeaItem {
    pub id: String,
    pub name: String,
    pub tea_type: String,
    pub color: Option<String>,
    pub year: i32,
    pub origin: String,
    pub total_grams: u32,
    pub remaining_grams: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for adding a tea to the stash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTea {
    pub name: String,
    pub tea_type: String,
    pub color: Option<String>,
    pub year: i32,
    pub origin: String,
    pub total_grams: u32,
}

impl TeaItem {
    /// A freshly added tea starts full.
    pub fn create(input: NewTea) -> Result<Self> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            bail!("Tea name must not be empty");
        }
        if input.total_grams == 0 {
            bail!("Tea weight must be greater than zero");
        }
        if let Some(color) = input.color.as_deref() {
            validate_color(color)?;
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            tea_type: input.tea_type.trim().to_string(),
            color: input.color,
            year: input.year,
            origin: input.origin.trim().to_string(),
            total_grams: input.total_grams,
            remaining_grams: input.total_grams,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn remaining_after(&self, grams: u32) -> u32 {
        self.remaining_grams.saturating_sub(grams)
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [&self.name, &self.tea_type, &self.origin]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

pub fn validate_color(color: &str) -> Result<()> {
    let Some(hex_part) = color.strip_prefix('#') else {
        bail!("Invalid color format. Must be hex (#RRGGBB)");
    };
    if hex_part.len() != 6 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("Invalid color format. Must be hex (#RRGGBB)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewTea {
        NewTea {
            name: "  Dian Hong Golden Bud ".into(),
            tea_type: "Red".into(),
            color: Some("#aa3300".into()),
            year: 2022,
            origin: "Yunnan".into(),
            total_grams: 100,
        }
    }

    #[test]
    fn new_tea_starts_full() {
        let tea = TeaItem::create(input()).unwrap();
        assert_eq!(tea.name, "Dian Hong Golden Bud");
        assert_eq!(tea.remaining_grams, 100);
        assert!(!tea.id.is_empty());
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(TeaItem::create(NewTea { name: " ".into(), ..input() }).is_err());
        assert!(TeaItem::create(NewTea { total_grams: 0, ..input() }).is_err());
        assert!(TeaItem::create(NewTea { color: Some("red".into()), ..input() }).is_err());
    }

    #[test]
    fn remaining_is_floored_at_zero() {
        let tea = TeaItem::create(input()).unwrap();
        assert_eq!(tea.remaining_after(7), 93);
        assert_eq!(tea.remaining_after(500), 0);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let tea = TeaItem::create(input()).unwrap();
        assert!(tea.matches("golden"));
        assert!(tea.matches("RED"));
        assert!(tea.matches("yun"));
        assert!(!tea.matches("oolong"));
    }
}
