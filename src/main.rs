mod auth;
mod catalog;
mod cli;
mod db;
mod entry;
mod error;
mod fmt;
mod goals;
mod ledger;
mod log;
mod models;
mod settings;
mod snapshot;
mod spaces;
mod tui;
mod usd;

use clap::{CommandFactory, Parser};

use cli::{
    CategoriesCommands, Cli, Commands, GoalsCommands, MethodsCommands, PairCommands,
    ResetPasswordCommands, UsdCommands,
};
use models::ViewMode;
use usd::UsdMovement;

fn main() {
    let cli = Cli::parse();
    log::init_logging(cli.verbose);

    let result = match cli.command {
        None => cli::dashboard::run(ViewMode::Personal),
        Some(Commands::Dashboard { view }) => cli::dashboard::run(view),
        Some(Commands::Init { data_dir }) => cli::init::run(data_dir),
        Some(Commands::Load { path }) => cli::load::run(&path),
        Some(Commands::Status) => cli::status::run(),
        Some(Commands::Backup { output }) => cli::backup::run(output),
        Some(Commands::Signup { email, name }) => cli::account::signup(&email, &name),
        Some(Commands::Login { email }) => cli::account::login(&email),
        Some(Commands::Logout) => cli::account::logout(),
        Some(Commands::ResetPassword { command }) => match command {
            ResetPasswordCommands::Request { email } => cli::account::request_reset(&email),
            ResetPasswordCommands::Confirm { token } => cli::account::confirm_reset(&token),
        },
        Some(Commands::DeleteAccount { confirm }) => cli::account::delete_account(confirm),
        Some(Commands::Summary { view, month }) => cli::summary::run(view, month),
        Some(Commands::Add {
            kind,
            amount,
            description,
            category,
            new_category,
            method,
            installments,
            goal,
            date,
            view,
        }) => cli::entry::add(
            kind,
            amount,
            &description,
            &category,
            new_category,
            method.as_deref(),
            installments,
            goal.as_deref(),
            date.as_deref(),
            view,
        ),
        Some(Commands::Delete { id }) => cli::entry::delete(id),
        Some(Commands::Categories { command }) => match command {
            CategoriesCommands::List { view, kind } => cli::catalog::list_categories_cmd(view, kind),
            CategoriesCommands::Add { name, kind, view } => {
                cli::catalog::add_category_cmd(&name, kind, view)
            }
        },
        Some(Commands::Methods { command }) => match command {
            MethodsCommands::List { view } => cli::catalog::list_methods_cmd(view),
            MethodsCommands::Add { name, credit, view } => {
                cli::catalog::add_method_cmd(&name, credit, view)
            }
        },
        Some(Commands::Usd { command }) => match command {
            UsdCommands::Buy { amount, rate, view } => {
                cli::usd::record(UsdMovement::Bought { rate }, amount, view)
            }
            UsdCommands::Deposit { amount, view } => {
                cli::usd::record(UsdMovement::Deposit, amount, view)
            }
            UsdCommands::Withdraw { amount, view } => {
                cli::usd::record(UsdMovement::Withdrawal, amount, view)
            }
            UsdCommands::Balance { view } => cli::usd::balance(view),
        },
        Some(Commands::Goals { command }) => match command {
            GoalsCommands::List { view } => cli::goals::list(view),
            GoalsCommands::Add {
                name,
                target,
                deadline,
                starting,
                view,
            } => cli::goals::add(&name, target, &deadline, starting, view),
            GoalsCommands::Rename {
                name,
                new_name,
                view,
            } => cli::goals::rename(&name, &new_name, view),
            GoalsCommands::Withdraw { name, amount, view } => {
                cli::goals::withdraw(&name, amount, view)
            }
            GoalsCommands::Delete { name, view } => cli::goals::delete(&name, view),
        },
        Some(Commands::Pair { command }) => match command {
            PairCommands::Create { name } => cli::pair::create(&name),
            PairCommands::Join { code } => cli::pair::join(&code),
            PairCommands::Info => cli::pair::info(),
            PairCommands::Rename { name } => cli::pair::rename(&name),
            PairCommands::Delete { confirm } => cli::pair::delete(confirm),
        },
        Some(Commands::Export {
            view,
            month,
            output,
        }) => cli::export::run(view, month, output),
        Some(Commands::Config {
            goal_accrual,
            ledger_limit,
        }) => cli::config::run(goal_accrual, ledger_limit),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "economia", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
