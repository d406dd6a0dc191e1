use crate::core::config::AppConfig;
use crate::providers::backend;
use crate::store::local::LocalStore;
use anyhow::{Context, Result};
use tracing::info;

/// Signs in and stores the session, prompting for the password when absent.
pub async fn login(
    config: &AppConfig,
    store: &LocalStore,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => {
            let term = console::Term::stderr();
            term.write_str("Password: ")?;
            term.read_secure_line()
                .context("Failed to read password")?
        }
    };

    let session = backend::sign_in(config, email, &password).await?;
    store.save_session(&session)?;
    info!("Stored session for user {}", session.user_id);
    println!("Signed in as {}", session.email);
    Ok(())
}

pub fn logout(store: &LocalStore) -> Result<()> {
    match store.load_session()? {
        Some(session) => {
            store.clear_session()?;
            println!("Signed out {}", session.email);
        }
        None => println!("Not signed in"),
    }
    Ok(())
}
