use rand::Rng;
use rusqlite::{Connection, OptionalExtension};

use crate::db::{seed_space, PERSONAL_CATEGORIES, SHARED_CATEGORIES};
use crate::error::{EconomiaError, Result};
use crate::models::{Profile, Space};

pub const PERSONAL_SPACE_NAME: &str = "My Personal Wallet";
pub const INVITE_CODE_LEN: usize = 6;
pub const DELETE_SPACE_CONFIRMATION: &str = "DELETE";

const INVITE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone)]
pub struct SharedSpaceInfo {
    pub name: String,
    pub invite_code: Option<String>,
    /// Member display names joined with " and ".
    pub members: String,
}

pub fn generate_invite_code<R: Rng>(rng: &mut R) -> String {
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_ALPHABET[rng.gen_range(0..INVITE_ALPHABET.len())] as char)
        .collect()
}

pub fn get_profile(conn: &Connection, user_id: i64) -> Result<Option<Profile>> {
    Ok(conn
        .query_row(
            "SELECT user_id, display_name, personal_space_id, shared_space_id \
             FROM profiles WHERE user_id = ?1",
            [user_id],
            |row| {
                Ok(Profile {
                    user_id: row.get(0)?,
                    display_name: row.get(1)?,
                    personal_space_id: row.get(2)?,
                    shared_space_id: row.get(3)?,
                })
            },
        )
        .optional()?)
}

pub fn get_space(conn: &Connection, space_id: i64) -> Result<Space> {
    Ok(conn.query_row(
        "SELECT id, name, invite_code, usd_balance FROM spaces WHERE id = ?1",
        [space_id],
        |row| {
            Ok(Space {
                id: row.get(0)?,
                name: row.get(1)?,
                invite_code: row.get(2)?,
                usd_balance: row.get(3)?,
            })
        },
    )?)
}

/// Create the user's personal space with starter categories and payment
/// methods, and point their profile at it.
pub fn onboard(conn: &Connection, user_id: i64, display_name: &str) -> Result<Profile> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("INSERT INTO spaces (name) VALUES (?1)", [PERSONAL_SPACE_NAME])?;
    let space_id = tx.last_insert_rowid();
    tx.execute(
        "INSERT INTO profiles (user_id, display_name, personal_space_id) VALUES (?1, ?2, ?3) \
         ON CONFLICT(user_id) DO UPDATE SET personal_space_id = excluded.personal_space_id",
        rusqlite::params![user_id, display_name, space_id],
    )?;
    seed_space(&tx, space_id, PERSONAL_CATEGORIES)?;
    tx.commit()?;
    tracing::info!(user_id, space_id, "personal space created");

    get_profile(conn, user_id)?.ok_or(EconomiaError::NotSignedIn)
}

/// A user belongs to at most one shared space; relinking would orphan the old one.
fn ensure_unpaired(conn: &Connection, user_id: i64) -> Result<()> {
    let profile = get_profile(conn, user_id)?.ok_or(EconomiaError::NotSignedIn)?;
    if profile.shared_space_id.is_some() {
        return Err(EconomiaError::Validation(
            "You already belong to a shared space. Delete it first with `economia pair delete`."
                .to_string(),
        ));
    }
    Ok(())
}

/// Create a shared space, link the creator to it and return (space id, invite code).
pub fn create_shared_space(conn: &Connection, user_id: i64, name: &str) -> Result<(i64, String)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EconomiaError::Validation("Space name cannot be empty".to_string()));
    }
    ensure_unpaired(conn, user_id)?;
    let mut rng = rand::thread_rng();
    let tx = conn.unchecked_transaction()?;
    let code = loop {
        let candidate = generate_invite_code(&mut rng);
        let taken: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM spaces WHERE invite_code = ?1)",
            [&candidate],
            |r| r.get(0),
        )?;
        if !taken {
            break candidate;
        }
    };
    tx.execute(
        "INSERT INTO spaces (name, invite_code) VALUES (?1, ?2)",
        rusqlite::params![name, code],
    )?;
    let space_id = tx.last_insert_rowid();
    let linked = tx.execute(
        "UPDATE profiles SET shared_space_id = ?1 WHERE user_id = ?2",
        rusqlite::params![space_id, user_id],
    )?;
    if linked == 0 {
        return Err(EconomiaError::NotSignedIn);
    }
    seed_space(&tx, space_id, SHARED_CATEGORIES)?;
    tx.commit()?;
    tracing::info!(user_id, space_id, "shared space created");
    Ok((space_id, code))
}

pub fn join_shared_space(conn: &Connection, user_id: i64, code: &str) -> Result<i64> {
    let code = code.trim().to_uppercase();
    let space_id: i64 = conn
        .query_row("SELECT id FROM spaces WHERE invite_code = ?1", [&code], |r| r.get(0))
        .optional()?
        .ok_or(EconomiaError::InvalidInviteCode)?;
    ensure_unpaired(conn, user_id)?;
    let linked = conn.execute(
        "UPDATE profiles SET shared_space_id = ?1 WHERE user_id = ?2",
        rusqlite::params![space_id, user_id],
    )?;
    if linked == 0 {
        return Err(EconomiaError::NotSignedIn);
    }
    tracing::info!(user_id, space_id, "joined shared space");
    Ok(space_id)
}

pub fn rename_space(conn: &Connection, space_id: i64, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EconomiaError::Validation("Space name cannot be empty".to_string()));
    }
    conn.execute(
        "UPDATE spaces SET name = ?1 WHERE id = ?2",
        rusqlite::params![name, space_id],
    )?;
    Ok(())
}

/// Delete a shared space and everything in it. Members' profiles are unlinked
/// by the store.
pub fn delete_shared_space(conn: &Connection, space_id: i64, confirmation: &str) -> Result<()> {
    if confirmation.trim() != DELETE_SPACE_CONFIRMATION {
        return Err(EconomiaError::ConfirmationMismatch);
    }
    conn.execute("DELETE FROM spaces WHERE id = ?1", [space_id])?;
    tracing::info!(space_id, "shared space deleted");
    Ok(())
}

pub fn shared_space_info(conn: &Connection, space_id: i64) -> Result<SharedSpaceInfo> {
    let space = get_space(conn, space_id)?;
    let mut stmt = conn.prepare(
        "SELECT display_name FROM profiles WHERE shared_space_id = ?1 ORDER BY user_id",
    )?;
    let names: Vec<String> = stmt
        .query_map([space_id], |r| r.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(SharedSpaceInfo {
        name: space.name,
        invite_code: space.invite_code,
        members: names.join(" and "),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::sign_up;
    use crate::db::test_db;
    use rand::SeedableRng;

    pub(crate) fn onboarded_user(conn: &Connection, email: &str, name: &str) -> Profile {
        let user = sign_up(conn, email, name, "secret1").unwrap();
        onboard(conn, user.id, name).unwrap()
    }

    #[test]
    fn test_invite_code_shape() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let code = generate_invite_code(&mut rng);
            assert_eq!(code.len(), INVITE_CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_onboard_creates_personal_space() {
        let (_dir, conn) = test_db();
        let profile = onboarded_user(&conn, "ana@example.com", "Ana");
        let space = get_space(&conn, profile.personal_space_id.unwrap()).unwrap();
        assert_eq!(space.name, PERSONAL_SPACE_NAME);
        assert!(space.invite_code.is_none());
        assert_eq!(space.usd_balance, 0.0);
        assert!(profile.shared_space_id.is_none());
    }

    #[test]
    fn test_pairing_flow() {
        let (_dir, conn) = test_db();
        let ana = onboarded_user(&conn, "ana@example.com", "Ana");
        let leo = onboarded_user(&conn, "leo@example.com", "Leo");

        let (space_id, code) = create_shared_space(&conn, ana.user_id, "Our Home").unwrap();
        let joined = join_shared_space(&conn, leo.user_id, &code.to_lowercase()).unwrap();
        assert_eq!(joined, space_id);

        let info = shared_space_info(&conn, space_id).unwrap();
        assert_eq!(info.name, "Our Home");
        assert_eq!(info.invite_code.as_deref(), Some(code.as_str()));
        assert_eq!(info.members, "Ana and Leo");

        let shared_cats: i64 = conn
            .query_row("SELECT count(*) FROM categories WHERE space_id = ?1", [space_id], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(shared_cats as usize, SHARED_CATEGORIES.len());
    }

    #[test]
    fn test_join_with_bad_code() {
        let (_dir, conn) = test_db();
        let ana = onboarded_user(&conn, "ana@example.com", "Ana");
        let err = join_shared_space(&conn, ana.user_id, "ZZZZZZ").unwrap_err();
        assert!(matches!(err, EconomiaError::InvalidInviteCode));
    }

    #[test]
    fn test_paired_user_cannot_join_or_create_another_space() {
        let (_dir, conn) = test_db();
        let ana = onboarded_user(&conn, "ana@example.com", "Ana");
        let leo = onboarded_user(&conn, "leo@example.com", "Leo");
        let (home, _) = create_shared_space(&conn, ana.user_id, "Home").unwrap();
        let (_, leo_code) = create_shared_space(&conn, leo.user_id, "Flat").unwrap();

        let err = join_shared_space(&conn, ana.user_id, &leo_code).unwrap_err();
        assert!(err.to_string().contains("Delete it first"), "got: {err}");
        let err = create_shared_space(&conn, ana.user_id, "Cabin").unwrap_err();
        assert!(matches!(err, EconomiaError::Validation(_)));

        let profile = get_profile(&conn, ana.user_id).unwrap().unwrap();
        assert_eq!(profile.shared_space_id, Some(home));
        assert_eq!(shared_space_info(&conn, home).unwrap().members, "Ana");
    }

    #[test]
    fn test_rename_rejects_blank() {
        let (_dir, conn) = test_db();
        let ana = onboarded_user(&conn, "ana@example.com", "Ana");
        let (space_id, _) = create_shared_space(&conn, ana.user_id, "Home").unwrap();
        assert!(rename_space(&conn, space_id, "   ").is_err());
        rename_space(&conn, space_id, "New Home").unwrap();
        assert_eq!(get_space(&conn, space_id).unwrap().name, "New Home");
    }

    #[test]
    fn test_delete_shared_space_requires_confirmation_and_unlinks() {
        let (_dir, conn) = test_db();
        let ana = onboarded_user(&conn, "ana@example.com", "Ana");
        let (space_id, _) = create_shared_space(&conn, ana.user_id, "Home").unwrap();

        let err = delete_shared_space(&conn, space_id, "delete").unwrap_err();
        assert!(matches!(err, EconomiaError::ConfirmationMismatch));
        assert!(get_space(&conn, space_id).is_ok());

        delete_shared_space(&conn, space_id, "DELETE").unwrap();
        assert!(get_space(&conn, space_id).is_err());
        let profile = get_profile(&conn, ana.user_id).unwrap().unwrap();
        assert!(profile.shared_space_id.is_none());
    }

    #[test]
    fn test_delete_account_keeps_shared_space_for_partner() {
        let (_dir, conn) = test_db();
        let ana = onboarded_user(&conn, "ana@example.com", "Ana");
        let leo = onboarded_user(&conn, "leo@example.com", "Leo");
        let (space_id, code) = create_shared_space(&conn, ana.user_id, "Home").unwrap();
        join_shared_space(&conn, leo.user_id, &code).unwrap();

        crate::auth::delete_account(&conn, ana.user_id).unwrap();
        assert!(get_space(&conn, ana.personal_space_id.unwrap()).is_err());
        assert!(get_space(&conn, space_id).is_ok());

        crate::auth::delete_account(&conn, leo.user_id).unwrap();
        assert!(get_space(&conn, space_id).is_err());
    }
}
