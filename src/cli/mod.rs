pub mod account;
pub mod backup;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod entry;
pub mod export;
pub mod goals;
pub mod init;
pub mod load;
pub mod pair;
pub mod status;
pub mod summary;
pub mod usd;

use std::io::{BufRead, IsTerminal, Write};

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use zeroize::Zeroizing;

use crate::auth::get_user;
use crate::db::get_connection;
use crate::error::{EconomiaError, Result};
use crate::models::{GoalAccrual, Kind, Profile, ViewMode};
use crate::settings::{load_settings, Settings};
use crate::spaces::{get_profile, onboard};

#[derive(Parser)]
#[command(
    name = "economia",
    version,
    about = "Household finances for one wallet or two: personal, shared and combined views."
)]
pub struct Cli {
    /// Print debug logs to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for economia data (default: ~/Documents/economia)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Switch to an existing economia data directory.
    Load {
        /// Path to data directory containing economia.db
        path: String,
    },
    /// Show the current database, session and row counts.
    Status,
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/economia-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Create an account and sign in. The password is read from the terminal.
    Signup {
        #[arg(long)]
        email: String,
        /// Name shown to your partner in the shared space
        #[arg(long)]
        name: String,
    },
    /// Sign in. The password is read from the terminal.
    Login {
        #[arg(long)]
        email: String,
    },
    /// Sign out.
    Logout,
    /// Reset a forgotten password.
    ResetPassword {
        #[command(subcommand)]
        command: ResetPasswordCommands,
    },
    /// Delete your account, your personal wallet and everything in it.
    DeleteAccount {
        /// Confirmation text; prompted for when omitted
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Print the monthly summary for a view.
    Summary {
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
        /// Month to summarize: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Open the interactive dashboard.
    Dashboard {
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
    },
    /// Record an income or an expense.
    Add {
        #[arg(value_enum)]
        kind: Kind,
        amount: f64,
        description: String,
        /// Category name (must match the kind)
        #[arg(long)]
        category: String,
        /// Create the category if it does not exist yet
        #[arg(long = "new-category")]
        new_category: bool,
        /// Payment method name (default: the first one)
        #[arg(long)]
        method: Option<String>,
        /// Split a credit purchase into monthly installments
        #[arg(long, default_value_t = 1)]
        installments: u32,
        /// Savings goal this expense funds
        #[arg(long)]
        goal: Option<String>,
        /// Date: YYYY-MM-DD or YYYY-MM-DDTHH:MM (default: now)
        #[arg(long)]
        date: Option<String>,
        /// Space to record into
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
    },
    /// Delete a transaction by ID.
    Delete {
        /// Transaction ID (shown by `economia summary`)
        id: i64,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage payment methods.
    Methods {
        #[command(subcommand)]
        command: MethodsCommands,
    },
    /// Record dollar movements and show the dollar balance.
    Usd {
        #[command(subcommand)]
        command: UsdCommands,
    },
    /// Manage savings goals.
    Goals {
        #[command(subcommand)]
        command: GoalsCommands,
    },
    /// Create, join or manage the shared space.
    Pair {
        #[command(subcommand)]
        command: PairCommands,
    },
    /// Export a month's register to CSV.
    Export {
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
        /// Output file path (default: <data_dir>/exports/<view>-<month>.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show or change preferences.
    Config {
        /// How installment purchases credit a savings goal
        #[arg(long = "goal-accrual", value_enum)]
        goal_accrual: Option<GoalAccrual>,
        /// Maximum number of transactions loaded per command
        #[arg(long = "ledger-limit")]
        ledger_limit: Option<usize>,
    },
    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ResetPasswordCommands {
    /// Issue a one-time reset token.
    Request {
        #[arg(long)]
        email: String,
    },
    /// Set a new password using a reset token.
    Confirm {
        #[arg(long)]
        token: String,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List categories of a space.
    List {
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
        #[arg(long, value_enum)]
        kind: Option<Kind>,
    },
    /// Add a category.
    Add {
        name: String,
        #[arg(long, value_enum)]
        kind: Kind,
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
    },
}

#[derive(Subcommand)]
pub enum MethodsCommands {
    /// List payment methods of a space.
    List {
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
    },
    /// Add a payment method.
    Add {
        name: String,
        /// Purchases with this method can be split into installments
        #[arg(long)]
        credit: bool,
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
    },
}

#[derive(Subcommand)]
pub enum UsdCommands {
    /// Buy dollars with pesos at a given exchange rate.
    Buy {
        /// Dollars bought
        amount: f64,
        /// Pesos paid per dollar
        #[arg(long)]
        rate: f64,
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
    },
    /// Add dollars that did not cost pesos (savings, gifts).
    Deposit {
        amount: f64,
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
    },
    /// Take dollars out.
    Withdraw {
        amount: f64,
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
    },
    /// Show the dollar balance.
    Balance {
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
    },
}

#[derive(Subcommand)]
pub enum GoalsCommands {
    /// List goals with progress and suggested monthly saving.
    List {
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
    },
    /// Create a goal.
    Add {
        name: String,
        #[arg(long)]
        target: f64,
        /// Deadline month: YYYY-MM
        #[arg(long)]
        deadline: String,
        /// Amount already saved
        #[arg(long, default_value_t = 0.0)]
        starting: f64,
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
    },
    /// Rename a goal.
    Rename {
        name: String,
        new_name: String,
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
    },
    /// Take money out of a goal.
    Withdraw {
        name: String,
        amount: f64,
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
    },
    /// Delete a goal.
    Delete {
        name: String,
        #[arg(long, value_enum, default_value_t = ViewMode::Personal)]
        view: ViewMode,
    },
}

#[derive(Subcommand)]
pub enum PairCommands {
    /// Create a shared space and print its invite code.
    Create { name: String },
    /// Join your partner's shared space.
    Join { code: String },
    /// Show the shared space's name, invite code and members.
    Info,
    /// Rename the shared space.
    Rename { name: String },
    /// Delete the shared space and everything in it.
    Delete {
        /// Confirmation text; prompted for when omitted
        #[arg(long)]
        confirm: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Open the configured database. It must have been created with `economia init`.
pub(crate) fn open_db(settings: &Settings) -> Result<Connection> {
    let db_path = settings.db_path();
    if !db_path.exists() {
        return Err(EconomiaError::Settings(format!(
            "No database found at {}\nRun `economia init` to set one up.",
            db_path.display()
        )));
    }
    get_connection(&db_path)
}

/// The signed-in user's profile. A user without a personal space gets one.
pub(crate) fn signed_in(conn: &Connection, settings: &Settings) -> Result<Profile> {
    let session = settings.session.as_ref().ok_or(EconomiaError::NotSignedIn)?;
    let user = get_user(conn, session.user_id)?;
    match get_profile(conn, user.id)? {
        Some(profile) if profile.personal_space_id.is_some() => Ok(profile),
        _ => onboard(conn, user.id, &user.display_name),
    }
}

/// Settings, connection and profile for commands that need a signed-in user.
pub(crate) fn open_session() -> Result<(Settings, Connection, Profile)> {
    let settings = load_settings();
    let conn = open_db(&settings)?;
    let profile = signed_in(&conn, &settings)?;
    Ok((settings, conn, profile))
}

pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

pub(crate) fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Read a password without echo on a terminal, or a plain line when piped.
pub(crate) fn read_password(label: &str) -> Result<Zeroizing<String>> {
    if std::io::stdin().is_terminal() {
        Ok(Zeroizing::new(rpassword::prompt_password(label)?))
    } else {
        let mut input = Zeroizing::new(String::new());
        std::io::stdin().lock().read_line(&mut input)?;
        let trimmed = Zeroizing::new(input.trim_end_matches(['\r', '\n']).to_string());
        Ok(trimmed)
    }
}

/// Typed confirmation for destructive commands, from a flag or a prompt.
pub(crate) fn confirmation(given: Option<String>, expected: &str, what: &str) -> Result<String> {
    match given {
        Some(text) => Ok(text),
        None => prompt(&format!("Type {expected} to {what}: ")),
    }
}
