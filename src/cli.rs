use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{db::NewTea, locale::Locale};

#[derive(Parser, Debug)]
#[command(name = "teadiary")]
#[command(about = "Tea stash, brewing timer and session journal")]
#[command(version)]
pub struct Cli {
    /// Directory holding the database and settings
    #[arg(long, default_value = ".teadiary", env = "TEADIARY_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Display language (uk or en); overrides the saved setting
    #[arg(long)]
    pub locale: Option<Locale>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the tea stash
    #[command(subcommand)]
    Tea(TeaCommand),
    /// Start an interactive brewing session
    Brew {
        /// ID of the tea to brew
        tea_id: String,
    },
    /// Show past sessions, newest first
    History {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// This month's totals and the yearly activity grid
    Stats,
    /// Show or change preferences
    Settings(SettingsArgs),
}

#[derive(Subcommand, Debug)]
pub enum TeaCommand {
    Add(AddTeaArgs),
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Remove a tea; its session history is kept
    Remove {
        tea_id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct AddTeaArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long = "type")]
    pub tea_type: String,
    #[arg(long)]
    pub year: i32,
    #[arg(long)]
    pub origin: String,
    /// Weight of the cake or bag in grams
    #[arg(long)]
    pub grams: u32,
    /// Tab color as #RRGGBB
    #[arg(long)]
    pub color: Option<String>,
}

impl From<AddTeaArgs> for NewTea {
    fn from(args: AddTeaArgs) -> Self {
        NewTea {
            name: args.name,
            tea_type: args.tea_type,
            color: args.color,
            year: args.year,
            origin: args.origin,
            total_grams: args.grams,
        }
    }
}

#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[arg(long)]
    pub vibration: Option<bool>,
    #[arg(long)]
    pub chime: Option<bool>,
    /// Saved display language
    #[arg(long = "set-locale")]
    pub set_locale: Option<Locale>,
}
