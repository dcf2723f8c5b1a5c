//! User-facing strings for the terminal surfaces, in Ukrainian and English.

use std::{fmt, str::FromStr};

use anyhow::{bail, Error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Uk,
    En,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Uk => "uk",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "uk" | "ua" => Ok(Locale::Uk),
            "en" => Ok(Locale::En),
            other => bail!("Unsupported locale: {other}"),
        }
    }
}

/// Semantic label keys. Surfaces never hard-code display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    SessionTitle,
    SessionBack,
    SessionFinish,
    ModeStopwatch,
    ModeTimer,
    Water,
    Leaf,
    Vessel,
    MinLabel,
    SecLabel,
    TimerHint,
    TimeUp,
    Extend,
    SteepPrefix,
    SummaryTitle,
    SummarySessionTime,
    SummarySave,
    SessionSaved,
    SessionDiscarded,
    HistoryTitle,
    HistoryEmpty,
    HistorySteeps,
    HistoryMinutes,
    DeletedTea,
    StatsThisMonth,
    StatsSessions,
    StatsLiters,
    StatsHours,
    ActivityTitle,
    StashTitle,
    StashEmpty,
    StashRemaining,
    StashOf,
    TeaAdded,
    TeaRemoved,
    ConfirmRemoveTea,
    RemoveCancelled,
    UnknownCommand,
}

pub fn t(locale: Locale, key: Key) -> &'static str {
    match locale {
        Locale::Uk => uk(key),
        Locale::En => en(key),
    }
}

fn uk(key: Key) -> &'static str {
    match key {
        Key::SessionTitle => "Чайна сесія",
        Key::SessionBack => "Назад",
        Key::SessionFinish => "Фініш",
        Key::ModeStopwatch => "Секундомір",
        Key::ModeTimer => "Таймер",
        Key::Water => "Вода",
        Key::Leaf => "Лист",
        Key::Vessel => "Посуд",
        Key::MinLabel => "хв",
        Key::SecLabel => "сек",
        Key::TimerHint => "Вкажи час заварювання і введи go",
        Key::TimeUp => "Час вийшов!",
        Key::Extend => "+1 хв",
        Key::SteepPrefix => "#",
        Key::SummaryTitle => "Як вам чай?",
        Key::SummarySessionTime => "Час сесії:",
        Key::SummarySave => "Зберегти в історію",
        Key::SessionSaved => "Сесію збережено",
        Key::SessionDiscarded => "Сесію скасовано",
        Key::HistoryTitle => "Журнал",
        Key::HistoryEmpty => "Немає записів",
        Key::HistorySteeps => "проливів",
        Key::HistoryMinutes => "хв",
        Key::DeletedTea => "видалений чай",
        Key::StatsThisMonth => "Цього місяця:",
        Key::StatsSessions => "Сесій",
        Key::StatsLiters => "Літрів",
        Key::StatsHours => "Годин чаю",
        Key::ActivityTitle => "Активність",
        Key::StashTitle => "Сховище",
        Key::StashEmpty => "Сховище порожнє",
        Key::StashRemaining => "Залишок",
        Key::StashOf => "з",
        Key::TeaAdded => "Чай додано",
        Key::TeaRemoved => "Чай видалено",
        Key::ConfirmRemoveTea => "Видалити цей чай? Історія сесій залишиться. [y/N]",
        Key::RemoveCancelled => "Скасовано",
        Key::UnknownCommand => "Невідома команда. Введи help",
    }
}

fn en(key: Key) -> &'static str {
    match key {
        Key::SessionTitle => "Tea Session",
        Key::SessionBack => "Back",
        Key::SessionFinish => "Finish",
        Key::ModeStopwatch => "Stopwatch",
        Key::ModeTimer => "Timer",
        Key::Water => "Water",
        Key::Leaf => "Leaf",
        Key::Vessel => "Vessel",
        Key::MinLabel => "min",
        Key::SecLabel => "sec",
        Key::TimerHint => "Set the steep time and type go",
        Key::TimeUp => "Time's up!",
        Key::Extend => "+1 min",
        Key::SteepPrefix => "#",
        Key::SummaryTitle => "How was the tea?",
        Key::SummarySessionTime => "Session time:",
        Key::SummarySave => "Save to history",
        Key::SessionSaved => "Session saved",
        Key::SessionDiscarded => "Session discarded",
        Key::HistoryTitle => "Journal",
        Key::HistoryEmpty => "No entries yet",
        Key::HistorySteeps => "steeps",
        Key::HistoryMinutes => "min",
        Key::DeletedTea => "deleted tea",
        Key::StatsThisMonth => "This month:",
        Key::StatsSessions => "Sessions",
        Key::StatsLiters => "Liters",
        Key::StatsHours => "Tea hours",
        Key::ActivityTitle => "Activity",
        Key::StashTitle => "Stash",
        Key::StashEmpty => "Stash is empty",
        Key::StashRemaining => "Remaining",
        Key::StashOf => "of",
        Key::TeaAdded => "Tea added",
        Key::TeaRemoved => "Tea removed",
        Key::ConfirmRemoveTea => "Remove this tea? Session history is kept. [y/N]",
        Key::RemoveCancelled => "Cancelled",
        Key::UnknownCommand => "Unknown command. Type help",
    }
}
