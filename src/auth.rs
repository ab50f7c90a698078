use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::NaiveDateTime;
use rand::RngCore;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::error::{EconomiaError, Result};
use crate::models::User;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Argon2id PHC string; the salt travels inside it.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| EconomiaError::Auth(format!("Could not hash password: {e}")))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "unreadable password hash");
            false
        }
    }
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn check_password_rules(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(EconomiaError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn get_user(conn: &Connection, user_id: i64) -> Result<User> {
    conn.query_row(
        "SELECT id, email, display_name FROM users WHERE id = ?1",
        [user_id],
        |row| {
            Ok(User {
                id: row.get(0)?,
                email: row.get(1)?,
                display_name: row.get(2)?,
            })
        },
    )
    .optional()?
    .ok_or(EconomiaError::NotSignedIn)
}

pub fn sign_up(conn: &Connection, email: &str, display_name: &str, password: &str) -> Result<User> {
    let email = email.trim();
    let display_name = display_name.trim();
    if !email_re().is_match(email) {
        return Err(EconomiaError::Validation(format!("Invalid email address: {email}")));
    }
    if display_name.is_empty() {
        return Err(EconomiaError::Validation("Name cannot be empty".to_string()));
    }
    check_password_rules(password)?;

    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
        [email],
        |r| r.get(0),
    )?;
    if exists {
        return Err(EconomiaError::Auth(format!("An account already exists for {email}")));
    }

    let password_hash = hash_password(password)?;
    conn.execute(
        "INSERT INTO users (email, display_name, password_hash) VALUES (?1, ?2, ?3)",
        rusqlite::params![email, display_name, password_hash],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(user_id = id, "user signed up");
    Ok(User {
        id,
        email: email.to_string(),
        display_name: display_name.to_string(),
    })
}

pub fn sign_in(conn: &Connection, email: &str, password: &str) -> Result<User> {
    let row: Option<(i64, String, String, String)> = conn
        .query_row(
            "SELECT id, email, display_name, password_hash FROM users WHERE email = ?1",
            [email.trim()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()?;

    match row {
        Some((id, email, display_name, stored)) if verify_password(password, &stored) => {
            tracing::debug!(user_id = id, "signed in");
            Ok(User { id, email, display_name })
        }
        _ => Err(EconomiaError::Auth("Invalid email or password".to_string())),
    }
}

/// Issue a one-time reset token for `email`. Returns `None` when no account matches.
pub fn request_password_reset(
    conn: &Connection,
    email: &str,
    now: NaiveDateTime,
) -> Result<Option<String>> {
    let user_id: Option<i64> = conn
        .query_row("SELECT id FROM users WHERE email = ?1", [email.trim()], |r| r.get(0))
        .optional()?;
    let Some(user_id) = user_id else {
        return Ok(None);
    };

    let token = random_hex(24);
    let expires_at = now + chrono::Duration::minutes(RESET_TOKEN_TTL_MINUTES);
    conn.execute(
        "INSERT INTO password_resets (token_hash, user_id, expires_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            hash_token(&token),
            user_id,
            expires_at.format(TIMESTAMP_FORMAT).to_string()
        ],
    )?;
    tracing::info!(user_id, "password reset requested");
    Ok(Some(token))
}

pub fn reset_password(
    conn: &Connection,
    token: &str,
    new_password: &str,
    now: NaiveDateTime,
) -> Result<User> {
    check_password_rules(new_password)?;
    let token_hash = hash_token(token.trim());
    let row: Option<(i64, String)> = conn
        .query_row(
            "SELECT user_id, expires_at FROM password_resets WHERE token_hash = ?1",
            [&token_hash],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    let Some((user_id, expires_at)) = row else {
        return Err(EconomiaError::Auth("Invalid or already used reset token".to_string()));
    };

    conn.execute("DELETE FROM password_resets WHERE token_hash = ?1", [&token_hash])?;
    let expires_at = NaiveDateTime::parse_from_str(&expires_at, TIMESTAMP_FORMAT)
        .map_err(|e| EconomiaError::Other(format!("corrupt reset token expiry: {e}")))?;
    if now > expires_at {
        return Err(EconomiaError::Auth("Reset token has expired".to_string()));
    }

    let password_hash = hash_password(new_password)?;
    conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE id = ?2",
        rusqlite::params![password_hash, user_id],
    )?;
    tracing::info!(user_id, "password reset");
    get_user(conn, user_id)
}

/// Remove the user, their personal space with everything in it, and any
/// shared space they were the last member of.
pub fn delete_account(conn: &Connection, user_id: i64) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    let spaces: Option<(Option<i64>, Option<i64>)> = tx
        .query_row(
            "SELECT personal_space_id, shared_space_id FROM profiles WHERE user_id = ?1",
            [user_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    let (personal, shared) = spaces.unwrap_or((None, None));

    if let Some(personal) = personal {
        tx.execute("DELETE FROM spaces WHERE id = ?1", [personal])?;
    }
    let removed = tx.execute("DELETE FROM users WHERE id = ?1", [user_id])?;
    if removed == 0 {
        return Err(EconomiaError::NotSignedIn);
    }
    if let Some(shared) = shared {
        let members: i64 = tx.query_row(
            "SELECT count(*) FROM profiles WHERE shared_space_id = ?1",
            [shared],
            |r| r.get(0),
        )?;
        if members == 0 {
            tx.execute("DELETE FROM spaces WHERE id = ?1", [shared])?;
        }
    }
    tx.commit()?;
    tracing::info!(user_id, "account deleted");
    Ok(())
}
