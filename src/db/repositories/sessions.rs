use std::future::Future;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    repositories::teas::{row_to_tea, TEA_COLUMNS},
    helpers::{parse_datetime, to_i64, to_u32, to_u64},
    models::{SessionEntry, SessionRecord},
};
use crate::gateway::SessionGateway;
use crate::timer::state::SessionRequest;

const SESSION_COLUMNS: &str = "s.id AS id, s.tea_id AS tea_id, s.brewed_at AS brewed_at, \
     s.duration_secs AS duration_secs, s.steeps AS steeps, s.grams AS grams, \
     s.volume_ml AS volume_ml, s.rating AS rating, s.created_at AS created_at";

fn row_to_session(row: &Row) -> Result<SessionRecord> {
    let brewed_at: String = row.get("brewed_at")?;
    let created_at: String = row.get("created_at")?;
    let duration_secs: i64 = row.get("duration_secs")?;
    let steeps: i64 = row.get("steeps")?;
    let grams: i64 = row.get("grams")?;
    let volume_ml: i64 = row.get("volume_ml")?;
    let rating: i64 = row.get("rating")?;

    Ok(SessionRecord {
        id: row.get("id")?,
        tea_id: row.get("tea_id")?,
        brewed_at: parse_datetime(&brewed_at, "brewed_at")?,
        duration_secs: to_u64(duration_secs, "duration_secs")?,
        steeps: to_u32(steeps, "steeps")?,
        grams: to_u32(grams, "grams")?,
        volume_ml: to_u32(volume_ml, "volume_ml")?,
        rating: u8::try_from(rating).map_err(|_| anyhow!("rating out of range: {rating}"))?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

fn row_to_entry(row: &Row) -> Result<SessionEntry> {
    Ok(SessionEntry {
        session: row_to_session(row)?,
        tea_name: row.get("tea_name")?,
        tea_type: row.get("tea_type")?,
    })
}

impl Database {
    /// Appends the session and draws the leaf weight from the stash in one
    /// transaction.
    pub async fn insert_session_and_consume(&self, request: SessionRequest) -> Result<SessionRecord> {
        if !(1..=5).contains(&request.rating) {
            bail!("rating must be between 1 and 5, got {}", request.rating);
        }

        self.transaction(move |tx| {
            let tea = tx
                .query_row(
                    &format!("SELECT {TEA_COLUMNS} FROM teas WHERE id = ?1"),
                    params![request.tea_id],
                    |row| Ok(row_to_tea(row)),
                )
                .optional()?
                .transpose()?;
            let Some(tea) = tea else {
                bail!("Tea {} not found", request.tea_id);
            };

            let now = Utc::now();
            let record = SessionRecord {
                id: Uuid::new_v4().to_string(),
                tea_id: Some(request.tea_id.clone()),
                brewed_at: now,
                duration_secs: request.duration_secs,
                steeps: request.steeps,
                grams: request.grams,
                volume_ml: request.volume_ml,
                rating: request.rating,
                created_at: now,
            };

            tx.execute(
                "INSERT INTO sessions (id, tea_id, brewed_at, duration_secs, steeps, grams, volume_ml, rating, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    record.id,
                    record.tea_id,
                    record.brewed_at.to_rfc3339(),
                    to_i64(record.duration_secs)?,
                    record.steeps,
                    record.grams,
                    record.volume_ml,
                    record.rating,
                    record.created_at.to_rfc3339(),
                ],
            )?;

            tx.execute(
                "UPDATE teas
                 SET remaining_grams = ?1,
                     updated_at = ?2
                 WHERE id = ?3",
                params![tea.remaining_after(request.grams), now.to_rfc3339(), request.tea_id],
            )?;

            Ok(record)
        })
        .await
    }

    /// Full history, newest first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionEntry>> {
        self.list_sessions_paginated(usize::MAX, 0).await
    }

    pub async fn list_sessions_paginated(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SessionEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS}, t.name AS tea_name, t.tea_type AS tea_type
                 FROM sessions s
                 LEFT JOIN teas t ON t.id = s.tea_id
                 ORDER BY s.brewed_at DESC
                 LIMIT ?1 OFFSET ?2"
            ))?;

            let mut rows = stmt.query(params![limit, offset])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(row_to_entry(row)?);
            }
            Ok(entries)
        })
        .await
    }

    pub async fn list_sessions_since(&self, since: DateTime<Utc>) -> Result<Vec<SessionRecord>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS}
                 FROM sessions s
                 WHERE s.brewed_at >= ?1
                 ORDER BY s.brewed_at ASC"
            ))?;

            let mut rows = stmt.query(params![since.to_rfc3339()])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    /// Deleting a session does not give the leaf back to the stash.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let rows_affected =
                conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
            if rows_affected == 0 {
                return Err(anyhow!("Session not found"));
            }
            Ok(())
        })
        .await
    }
}

impl SessionGateway for Database {
    fn record_session(
        &self,
        request: SessionRequest,
    ) -> impl Future<Output = Result<SessionRecord>> + Send {
        self.insert_session_and_consume(request)
    }
}
