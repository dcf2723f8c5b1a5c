use std::future::Future;

use anyhow::{anyhow, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, to_u32},
    models::TeaItem,
};
use crate::gateway::TeaLookup;

pub(crate) const TEA_COLUMNS: &str =
    "id, name, tea_type, color, year, origin, total_grams, remaining_grams, created_at, updated_at";

pub(crate) fn row_to_tea(row: &Row) -> Result<TeaItem> {
    let total_grams: i64 = row.get("total_grams")?;
    let remaining_grams: i64 = row.get("remaining_grams")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(TeaItem {
        id: row.get("id")?,
        name: row.get("name")?,
        tea_type: row.get("tea_type")?,
        color: row.get("color")?,
        year: row.get("year")?,
        origin: row.get("origin")?,
        total_grams: to_u32(total_grams, "total_grams")?,
        remaining_grams: to_u32(remaining_grams, "remaining_grams")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    pub async fn insert_tea(&self, tea: &TeaItem) -> Result<()> {
        let record = tea.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO teas (id, name, tea_type, color, year, origin, total_grams, remaining_grams, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    record.id,
                    record.name,
                    record.tea_type,
                    record.color,
                    record.year,
                    record.origin,
                    record.total_grams,
                    record.remaining_grams,
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn find_tea(&self, tea_id: &str) -> Result<Option<TeaItem>> {
        let tea_id = tea_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!("SELECT {TEA_COLUMNS} FROM teas WHERE id = ?1"))?;
            let tea = stmt
                .query_row(params![tea_id], |row| Ok(row_to_tea(row)))
                .optional()?
                .transpose()?;
            Ok(tea)
        })
        .await
    }

    /// All teas in the stash, alphabetically.
    pub async fn list_teas(&self) -> Result<Vec<TeaItem>> {
        self.execute(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TEA_COLUMNS} FROM teas ORDER BY name COLLATE NOCASE ASC"))?;
            let mut rows = stmt.query([])?;
            let mut teas = Vec::new();
            while let Some(row) = rows.next()? {
                teas.push(row_to_tea(row)?);
            }
            Ok(teas)
        })
        .await
    }

    /// Case-insensitive substring match on name, type or origin.
    pub async fn search_teas(&self, query: &str) -> Result<Vec<TeaItem>> {
        let query = query.trim().to_string();
        let teas = self.list_teas().await?;
        if query.is_empty() {
            return Ok(teas);
        }
        Ok(teas.into_iter().filter(|tea| tea.matches(&query)).collect())
    }

    /// Removes a tea. Its sessions stay in the history without a tea reference.
    pub async fn delete_tea(&self, tea_id: &str) -> Result<()> {
        let tea_id = tea_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute("DELETE FROM teas WHERE id = ?1", params![tea_id])?;
            if rows_affected == 0 {
                return Err(anyhow!("Tea not found"));
            }
            Ok(())
        })
        .await
    }
}

impl TeaLookup for Database {
    fn get_tea(&self, tea_id: &str) -> impl Future<Output = Result<Option<TeaItem>>> + Send {
        self.find_tea(tea_id)
    }
}
