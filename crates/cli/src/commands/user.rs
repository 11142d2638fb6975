//! User account and staff group management commands.

use bistro_core::types::StaffGroup;
use bistro_core::Email;
use bistro_server::db::UserRepository;

/// Create a user, optionally attaching them to a staff group.
///
/// An empty email is allowed; anything else must parse as an address.
///
/// # Errors
///
/// Returns an error if the email is malformed, the username is taken, or a
/// database write fails.
#[allow(clippy::print_stdout)]
pub async fn create(
    username: &str,
    email: &str,
    group: Option<StaffGroup>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !email.is_empty() {
        Email::parse(email)?;
    }
    let pool = super::open_pool().await?;
    let repo = UserRepository::new(&pool);

    let user = repo.create(username, email).await?;
    println!("Created user {} (id {})", user.username, user.id);

    if let Some(group) = group {
        repo.add_to_group(user.id, group).await?;
        println!("Added {} to {group}", user.username);
    }
    Ok(())
}

/// Add an existing user to a staff group. Idempotent.
///
/// # Errors
///
/// Returns an error if the user does not exist or a database write fails.
#[allow(clippy::print_stdout)]
pub async fn add_to_group(
    username: &str,
    group: StaffGroup,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::open_pool().await?;
    let repo = UserRepository::new(&pool);

    let user = repo
        .get_by_username(username)
        .await?
        .ok_or_else(|| format!("no such user: {username}"))?;
    repo.add_to_group(user.id, group).await?;
    println!("Added {username} to {group}");
    Ok(())
}

/// Remove a user from a staff group.
///
/// # Errors
///
/// Returns an error if the user does not exist, is not in the group, or a
/// database write fails.
#[allow(clippy::print_stdout)]
pub async fn remove_from_group(
    username: &str,
    group: StaffGroup,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::open_pool().await?;
    let repo = UserRepository::new(&pool);

    let user = repo
        .get_by_username(username)
        .await?
        .ok_or_else(|| format!("no such user: {username}"))?;
    if !repo.remove_from_group(user.id, group).await? {
        return Err(format!("{username} is not in {group}").into());
    }
    println!("Removed {username} from {group}");
    Ok(())
}
