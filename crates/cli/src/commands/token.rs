//! Auth token issuance.

use bistro_server::db::UserRepository;
use rand::Rng;
use rand::distr::Alphanumeric;

const TOKEN_LENGTH: usize = 40;

fn generate_key() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Generate and store a token for a user, printing the key exactly once.
///
/// # Errors
///
/// Returns an error if the user does not exist or a database write fails.
#[allow(clippy::print_stdout)]
pub async fn issue(username: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::open_pool().await?;
    let repo = UserRepository::new(&pool);

    let user = repo
        .get_by_username(username)
        .await?
        .ok_or_else(|| format!("no such user: {username}"))?;

    let key = generate_key();
    repo.store_token(user.id, &key).await?;

    println!("Token for {username} (shown once):");
    println!("{key}");
    Ok(())
}
