use colored::Colorize;

use crate::auth::{self, RESET_TOKEN_TTL_MINUTES};
use crate::error::{EconomiaError, Result};
use crate::settings::{load_settings, save_settings, Session};
use crate::spaces::onboard;

pub const DELETE_ACCOUNT_CONFIRMATION: &str = "GOODBYE";

pub fn signup(email: &str, name: &str) -> Result<()> {
    let mut settings = load_settings();
    let conn = super::open_db(&settings)?;
    let password = super::read_password("Password: ")?;

    let user = auth::sign_up(&conn, email, name, &password)?;
    let profile = onboard(&conn, user.id, &user.display_name)?;
    settings.session = Some(Session {
        user_id: user.id,
        email: user.email.clone(),
    });
    save_settings(&settings)?;

    tracing::debug!(user_id = user.id, space_id = ?profile.personal_space_id, "onboarded");

    println!("Welcome, {}.", user.display_name.bold());
    println!("Your personal wallet is ready. Record something with `economia add`.");
    Ok(())
}

pub fn login(email: &str) -> Result<()> {
    let mut settings = load_settings();
    let conn = super::open_db(&settings)?;
    let password = super::read_password("Password: ")?;

    let user = auth::sign_in(&conn, email, &password)?;
    settings.session = Some(Session {
        user_id: user.id,
        email: user.email.clone(),
    });
    save_settings(&settings)?;
    println!("Signed in as {}.", user.display_name.bold());
    Ok(())
}

pub fn logout() -> Result<()> {
    let mut settings = load_settings();
    if settings.session.take().is_none() {
        println!("Not signed in.");
        return Ok(());
    }
    save_settings(&settings)?;
    println!("Signed out.");
    Ok(())
}

pub fn request_reset(email: &str) -> Result<()> {
    let settings = load_settings();
    let conn = super::open_db(&settings)?;
    let now = chrono::Local::now().naive_local();

    // Same answer whether or not the account exists.
    println!("If an account exists for {email}, a reset token has been issued.");
    if let Some(token) = auth::request_password_reset(&conn, email, now)? {
        println!("Reset token (valid for {RESET_TOKEN_TTL_MINUTES} minutes): {}", token.bold());
        println!("Run `economia reset-password confirm --token <TOKEN>` to choose a new password.");
    }
    Ok(())
}

pub fn confirm_reset(token: &str) -> Result<()> {
    let settings = load_settings();
    let conn = super::open_db(&settings)?;
    let password = super::read_password("New password: ")?;
    let now = chrono::Local::now().naive_local();

    let user = auth::reset_password(&conn, token, &password, now)?;
    println!("Password updated for {}. Sign in with `economia login`.", user.email);
    Ok(())
}

pub fn delete_account(confirm: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    let conn = super::open_db(&settings)?;
    let session = settings.session.clone().ok_or(EconomiaError::NotSignedIn)?;

    println!(
        "{}",
        "This permanently deletes your account and your personal wallet.".red().bold()
    );
    let typed = super::confirmation(confirm, DELETE_ACCOUNT_CONFIRMATION, "delete your account")?;
    if typed.trim() != DELETE_ACCOUNT_CONFIRMATION {
        return Err(EconomiaError::ConfirmationMismatch);
    }

    let result = auth::delete_account(&conn, session.user_id);
    settings.session = None;
    save_settings(&settings)?;
    result?;

    println!("Account deleted. Goodbye.");
    Ok(())
}
