use anyhow::{Context, Result};
use log::warn;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};

use crate::{
    db::models::SessionRecord,
    gateway::SessionGateway,
    locale::{t, Key, Locale},
};

use super::{
    controller::{BrewController, BrewEvent},
    state::{
        coerce_target_field, format_time, BrewField, BrewSession, SessionPhase, SummaryView,
        TimerMode, COUNTDOWN_PRESETS,
    },
};

/// One line typed during a brewing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrewCommand {
    Mode(TimerMode),
    /// Start or pause the stopwatch.
    Toggle,
    Reset,
    Next,
    Target { minutes: u32, seconds: u32 },
    /// Whole-minute quick target.
    Preset(u32),
    Go,
    Extend,
    Field(BrewField, String),
    Finish,
    Rate(u8),
    Save,
    Back,
    Status,
    Help,
}

pub fn parse_command(line: &str) -> Option<BrewCommand> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?.to_ascii_lowercase();
    let rest: Vec<&str> = parts.collect();

    let command = match verb.as_str() {
        "mode" => match rest.first()?.to_ascii_lowercase().as_str() {
            "stopwatch" | "sw" => BrewCommand::Mode(TimerMode::Stopwatch),
            "countdown" | "timer" => BrewCommand::Mode(TimerMode::Countdown),
            _ => return None,
        },
        "start" | "pause" => BrewCommand::Toggle,
        "reset" => BrewCommand::Reset,
        "next" => BrewCommand::Next,
        "target" => parse_target(&rest)?,
        "preset" => {
            let minutes: u32 = rest.first()?.parse().ok()?;
            if !COUNTDOWN_PRESETS.contains(&minutes) {
                return None;
            }
            BrewCommand::Preset(minutes)
        }
        "go" => BrewCommand::Go,
        "extend" | "+1" => BrewCommand::Extend,
        "temp" | "water" => BrewCommand::Field(BrewField::WaterTemp, rest.join(" ")),
        "leaf" => BrewCommand::Field(BrewField::Leaf, rest.join(" ")),
        "vessel" => BrewCommand::Field(BrewField::Vessel, rest.join(" ")),
        "finish" => BrewCommand::Finish,
        "rate" => BrewCommand::Rate(rest.first()?.parse().ok()?),
        "save" => BrewCommand::Save,
        "back" | "quit" | "exit" => BrewCommand::Back,
        "status" => BrewCommand::Status,
        "help" | "?" => BrewCommand::Help,
        _ => return None,
    };
    Some(command)
}

/// `target M:SS` or `target M S`; each field keeps at most two digits.
fn parse_target(args: &[&str]) -> Option<BrewCommand> {
    let (minutes, seconds) = match args {
        [single] => match single.split_once(':') {
            Some((minutes, seconds)) => (minutes, seconds),
            None => (*single, "0"),
        },
        [minutes, seconds, ..] => (*minutes, *seconds),
        [] => return None,
    };
    Some(BrewCommand::Target {
        minutes: coerce_target_field(minutes),
        seconds: coerce_target_field(seconds),
    })
}

pub fn help_text() -> &'static str {
    "mode stopwatch|countdown  start|pause  reset  next\n\
     target M:SS  preset 1|2|3|5  go  extend\n\
     temp N  leaf N  vessel N\n\
     finish  rate 1-5  save  back  status  help"
}

pub fn render_status(session: &BrewSession, locale: Locale) -> String {
    if session.phase != SessionPhase::Brewing {
        return render_summary(&session.summary(), locale);
    }

    let timer = match session.mode {
        TimerMode::Stopwatch => {
            let marker = if session.stopwatch.running { ">" } else { "||" };
            format!(
                "{} {} {marker}",
                t(locale, Key::ModeStopwatch),
                format_time(session.stopwatch.elapsed_secs)
            )
        }
        TimerMode::Countdown => {
            let countdown = &session.countdown;
            match countdown.remaining_secs {
                _ if countdown.expired => format!(
                    "{} {} [extend: {}]",
                    t(locale, Key::ModeTimer),
                    t(locale, Key::TimeUp),
                    t(locale, Key::Extend)
                ),
                Some(remaining) => format!(
                    "{} {} ({:.0}%)",
                    t(locale, Key::ModeTimer),
                    format_time(remaining),
                    session.progress_ratio() * 100.0
                ),
                None => format!(
                    "{} {:02} {} {:02} {} - {}",
                    t(locale, Key::ModeTimer),
                    countdown.target_minutes,
                    t(locale, Key::MinLabel),
                    countdown.target_seconds,
                    t(locale, Key::SecLabel),
                    t(locale, Key::TimerHint)
                ),
            }
        }
    };

    format!(
        "{} | {} {} | {}{} | {} | {}\n{} {}°C  {} {}g  {} {}ml\nfinish: {}  back: {}",
        t(locale, Key::SessionTitle),
        session.tea.name,
        session.tea.year,
        t(locale, Key::SteepPrefix),
        session.steep_count,
        format_time(session.session_duration_secs),
        timer,
        t(locale, Key::Water),
        session.params.water_temp_c,
        t(locale, Key::Leaf),
        session.params.leaf_grams,
        t(locale, Key::Vessel),
        session.params.vessel_ml,
        t(locale, Key::SessionFinish),
        t(locale, Key::SessionBack),
    )
}

pub fn render_summary(summary: &SummaryView, locale: Locale) -> String {
    let stars: String = (1..=5)
        .map(|i| if i <= summary.rating { '*' } else { '.' })
        .collect();
    format!(
        "{}\n{} ({})\n{} {}\n{}{}  {}°C  {}g  {}ml\n[{stars}]  save: {}",
        t(locale, Key::SummaryTitle),
        summary.tea_name,
        summary.tea_year,
        t(locale, Key::SummarySessionTime),
        format_time(summary.session_duration_secs),
        t(locale, Key::SteepPrefix),
        summary.steep_count,
        summary.params.water_temp_c,
        summary.params.leaf_grams,
        summary.params.vessel_ml,
        t(locale, Key::SummarySave),
    )
}

async fn execute<G: SessionGateway>(
    controller: &BrewController<G>,
    command: BrewCommand,
    locale: Locale,
) -> Result<Option<String>> {
    let session = match command {
        BrewCommand::Mode(mode) => controller.set_mode(mode).await?,
        BrewCommand::Toggle => controller.toggle_stopwatch().await?,
        BrewCommand::Reset => match controller.snapshot().await.mode {
            TimerMode::Stopwatch => controller.reset_stopwatch().await?,
            TimerMode::Countdown => controller.reset_countdown().await?,
        },
        BrewCommand::Next => match controller.snapshot().await.mode {
            TimerMode::Stopwatch => controller.next_steep_from_stopwatch().await?,
            TimerMode::Countdown => controller.next_steep_from_countdown().await?,
        },
        BrewCommand::Target { minutes, seconds } => {
            controller.set_countdown_target(minutes, seconds).await?
        }
        BrewCommand::Preset(minutes) => controller.apply_preset(minutes).await?,
        BrewCommand::Go => controller.start_countdown().await?,
        BrewCommand::Extend => controller.extend_countdown().await?,
        BrewCommand::Field(field, raw) => controller.set_brew_field_input(field, raw).await?,
        BrewCommand::Finish => {
            let summary = controller.finish().await?;
            return Ok(Some(render_summary(&summary, locale)));
        }
        BrewCommand::Rate(rating) => controller.set_rating(rating).await?,
        BrewCommand::Status => controller.snapshot().await,
        BrewCommand::Help => return Ok(Some(help_text().to_string())),
        BrewCommand::Save | BrewCommand::Back => return Ok(None),
    };
    Ok(Some(render_status(&session, locale)))
}

/// Runs a session against stdin until it is saved, discarded, or input ends.
/// Returns the persisted record when the user saved.
pub async fn run_brew_session<G: SessionGateway>(
    controller: BrewController<G>,
    locale: Locale,
) -> Result<Option<SessionRecord>> {
    let mut events = controller.subscribe();
    let renderer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(BrewEvent::Heartbeat(session)) => println!("{}", render_status(&session, locale)),
                Ok(BrewEvent::CountdownExpired(session)) => {
                    println!("{}", render_status(&session, locale))
                }
                Ok(BrewEvent::SessionSaved(_)) | Ok(BrewEvent::SessionDiscarded) => break,
                Ok(BrewEvent::StateChanged(_)) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("{}", render_status(&controller.snapshot().await, locale));

    let mut saved = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read brewing command")?
    {
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = parse_command(&line) else {
            println!("{}", t(locale, Key::UnknownCommand));
            continue;
        };

        match command {
            BrewCommand::Save => match controller.save().await {
                Ok(record) => {
                    println!("{}", t(locale, Key::SessionSaved));
                    saved = Some(record);
                }
                Err(err) => println!("{err:#}"),
            },
            BrewCommand::Back => {
                controller.discard().await?;
                println!("{}", t(locale, Key::SessionDiscarded));
            }
            other => match execute(&controller, other, locale).await {
                Ok(Some(output)) => println!("{output}"),
                Ok(None) => {}
                Err(err) => {
                    warn!("Brewing command rejected: {err:#}");
                    println!("{err:#}");
                }
            },
        }

        if controller.is_closed().await {
            break;
        }
    }

    if !controller.is_closed().await {
        controller.discard().await?;
    }
    renderer.abort();
    Ok(saved)
}
