use anyhow::{anyhow, Context, Result};
use log::info;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    db::{models::NewTea, Database, TeaItem},
    haptics::{HapticCue, Haptics},
    locale::{t, Key, Locale},
};

pub fn format_tea_line(tea: &TeaItem, locale: Locale) -> String {
    let color = tea.color.as_deref().unwrap_or("-");
    format!(
        "{}  {} {}  {} · {}  {}: {}g {} {}g  [{color}]",
        tea.id,
        tea.name,
        tea.year,
        tea.tea_type,
        tea.origin,
        t(locale, Key::StashRemaining),
        tea.remaining_grams,
        t(locale, Key::StashOf),
        tea.total_grams,
    )
}

pub async fn add_tea(db: &Database, input: NewTea, locale: Locale) -> Result<TeaItem> {
    let tea = TeaItem::create(input)?;
    db.insert_tea(&tea).await?;
    info!("Added tea {} ({})", tea.name, tea.id);
    println!("{}: {}", t(locale, Key::TeaAdded), format_tea_line(&tea, locale));
    Ok(tea)
}

pub async fn list_teas(db: &Database, search: Option<&str>, locale: Locale) -> Result<()> {
    let teas = match search {
        Some(query) => db.search_teas(query).await?,
        None => db.list_teas().await?,
    };

    println!("{}", t(locale, Key::StashTitle));
    if teas.is_empty() {
        println!("  {}", t(locale, Key::StashEmpty));
        return Ok(());
    }
    for tea in &teas {
        println!("  {}", format_tea_line(tea, locale));
    }
    Ok(())
}

/// Accepts `y`/`yes` and the Ukrainian `т`/`так`.
pub fn is_confirmation(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "т" | "так"
    )
}

/// Deletes a tea after a y/N answer read from `input`, unless `assume_yes`.
/// Sessions brewed from it stay in the history. Returns whether it was removed.
pub async fn remove_tea<R>(
    db: &Database,
    tea_id: &str,
    locale: Locale,
    haptics: &Haptics,
    assume_yes: bool,
    input: R,
) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    let tea = db
        .find_tea(tea_id)
        .await?
        .ok_or_else(|| anyhow!("Tea {tea_id} not found"))?;

    if !assume_yes {
        println!("{}", format_tea_line(&tea, locale));
        println!("{}", t(locale, Key::ConfirmRemoveTea));
        let answer = input
            .lines()
            .next_line()
            .await
            .context("failed to read confirmation")?
            .unwrap_or_default();
        if !is_confirmation(&answer) {
            println!("{}", t(locale, Key::RemoveCancelled));
            return Ok(false);
        }
    }

    db.delete_tea(tea_id).await?;
    haptics.cue(HapticCue::Heavy);
    info!("Removed tea {} ({tea_id})", tea.name);
    println!("{}", t(locale, Key::TeaRemoved));
    Ok(true)
}
