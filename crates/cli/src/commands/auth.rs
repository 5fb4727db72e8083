//! Login and registration.

use std::error::Error;

use chodocu_client::{AuthApi, AuthClient, ClientConfig};
use chodocu_core::Credentials;

/// Log in and print the session as environment assignments, ready for a
/// `.env` file.
///
/// # Errors
///
/// Returns the validation or backend failure as a user-facing message.
#[allow(clippy::print_stdout)]
pub async fn login(
    config: &ClientConfig,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn Error>> {
    let client = AuthClient::new(config)?;
    let session = client
        .login(&Credentials::login(email, password))
        .await
        .map_err(|e| e.user_message())?;

    println!("CHODOCU_ACCESS_TOKEN={}", session.token());
    println!("CHODOCU_ROLE={}", session.role);
    println!("CHODOCU_EMAIL={}", session.email);
    tracing::info!(home = session.role.home_path(), "Logged in");
    Ok(())
}

/// Create an account.
///
/// # Errors
///
/// Returns the validation or backend failure as a user-facing message.
pub async fn register(
    config: &ClientConfig,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), Box<dyn Error>> {
    let client = AuthClient::new(config)?;
    let registered = client
        .register(&Credentials::register(email, password, confirm))
        .await
        .map_err(|e| e.user_message())?;

    tracing::info!(
        email = %registered.email,
        id = ?registered.id,
        "Account created, log in to continue"
    );
    Ok(())
}
