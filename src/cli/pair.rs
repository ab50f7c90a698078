use colored::Colorize;

use crate::error::{EconomiaError, Result};
use crate::spaces::{
    create_shared_space, delete_shared_space, join_shared_space, rename_space, shared_space_info,
    DELETE_SPACE_CONFIRMATION,
};

pub fn create(name: &str) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let (_space_id, code) = create_shared_space(&conn, profile.user_id, name)?;
    println!("Created shared space {}", name.trim().bold());
    println!("Invite code: {}", code.bold());
    println!("Your partner joins with `economia pair join {code}`.");
    Ok(())
}

pub fn join(code: &str) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let space_id = join_shared_space(&conn, profile.user_id, code)?;
    let info = shared_space_info(&conn, space_id)?;
    println!("Joined {} ({})", info.name.bold(), info.members);
    Ok(())
}

pub fn info() -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let space_id = profile.shared_space_id.ok_or(EconomiaError::NoSharedSpace)?;
    let info = shared_space_info(&conn, space_id)?;
    println!("Name:         {}", info.name);
    println!("Invite code:  {}", info.invite_code.as_deref().unwrap_or("(none)"));
    println!("Members:      {}", info.members);
    Ok(())
}

pub fn rename(name: &str) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let space_id = profile.shared_space_id.ok_or(EconomiaError::NoSharedSpace)?;
    rename_space(&conn, space_id, name)?;
    println!("Shared space renamed to {}", name.trim());
    Ok(())
}

pub fn delete(confirm: Option<String>) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let space_id = profile.shared_space_id.ok_or(EconomiaError::NoSharedSpace)?;
    let info = shared_space_info(&conn, space_id)?;

    println!(
        "{}",
        format!(
            "This deletes {} and every transaction, category and goal in it for all members.",
            info.name
        )
        .red()
        .bold()
    );
    let typed = super::confirmation(confirm, DELETE_SPACE_CONFIRMATION, "delete it")?;
    delete_shared_space(&conn, space_id, &typed)?;
    println!("Deleted shared space {}", info.name);
    Ok(())
}
