use anyhow::Result;
use chrono::{Duration, Local, Utc};

use crate::{
    db::{models::SessionEntry, Database},
    locale::{t, Key, Locale},
};

use super::{activity::ActivityGraph, monthly_stats, round_one_decimal};

pub fn format_history_entry(entry: &SessionEntry, locale: Locale) -> String {
    let session = &entry.session;
    let tea = match (&entry.tea_name, &entry.tea_type) {
        (Some(name), Some(tea_type)) if !tea_type.is_empty() => format!("{name} ({tea_type})"),
        (Some(name), _) => name.clone(),
        (None, _) => format!("<{}>", t(locale, Key::DeletedTea)),
    };
    let stars: String = "*".repeat(usize::from(session.rating));

    format!(
        "{}  {}  {} {}  {} {}  {}g/{}ml  {}",
        session.brewed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        tea,
        session.steeps,
        t(locale, Key::HistorySteeps),
        session.duration_secs / 60,
        t(locale, Key::HistoryMinutes),
        session.grams,
        session.volume_ml,
        stars,
    )
}

pub async fn print_history(db: &Database, locale: Locale, limit: usize) -> Result<()> {
    let entries = db.list_sessions_paginated(limit, 0).await?;

    println!("{}", t(locale, Key::HistoryTitle));
    if entries.is_empty() {
        println!("  {}", t(locale, Key::HistoryEmpty));
        return Ok(());
    }
    for entry in &entries {
        println!("  {}", format_history_entry(entry, locale));
    }
    Ok(())
}

pub async fn print_stats(db: &Database, locale: Locale) -> Result<()> {
    let now = Local::now();
    // A full grid reaches back 52 weeks plus the snap to Monday. Anything
    // older is dropped by the grid itself.
    let since = Utc::now() - Duration::weeks(54);
    let sessions = db.list_sessions_since(since).await?;

    let month = monthly_stats(&sessions, &now);
    println!("{}", t(locale, Key::StatsThisMonth));
    println!(
        "  {}: {}  {}: {:.1}  {}: {:.1}",
        t(locale, Key::StatsSessions),
        month.session_count,
        t(locale, Key::StatsLiters),
        round_one_decimal(month.liters),
        t(locale, Key::StatsHours),
        round_one_decimal(month.hours),
    );

    let dates: Vec<_> = sessions
        .iter()
        .map(|session| session.brewed_at.with_timezone(&Local).date_naive())
        .collect();
    let graph = ActivityGraph::build(&dates, now.date_naive());

    println!();
    println!(
        "{} ({} {})",
        t(locale, Key::ActivityTitle),
        graph.total_sessions,
        t(locale, Key::StatsSessions).to_lowercase()
    );
    for row in graph.render_rows() {
        println!("  {row}");
    }
    Ok(())
}
