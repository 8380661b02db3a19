//! Signing in and out.

use anyhow::Context;
use log::info;
use std::io::Write;
use vbos_core::api::{HttpClient, SessionRestore, Transport};
use vbos_core::{ApiError, AuthUser};

fn describe(user: &AuthUser) -> String {
    let mut line = format!("{} ({})", user.display_name(), user.username);
    if !user.email.is_empty() {
        line.push_str(&format!(" <{}>", user.email));
    }
    if !user.groups.is_empty() {
        line.push_str(&format!(" groups: {}", user.groups.join(", ")));
    }
    line
}

pub async fn run_login<T: Transport>(
    client: &HttpClient<T>,
    username: &str,
    password: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let user = client.login(username, password).await?;
    writeln!(out, "Signed in as {}", describe(&user))?;
    Ok(())
}

pub fn run_logout<T: Transport>(client: &HttpClient<T>, out: &mut impl Write) -> anyhow::Result<()> {
    let was_signed_in = client.session().snapshot().is_authenticated();
    client.logout().context("failed to clear the stored session")?;
    if was_signed_in {
        writeln!(out, "Signed out")?;
    } else {
        writeln!(out, "Not signed in")?;
    }
    Ok(())
}

/// Print the outcome of the start-up session check. With `refresh`, a
/// cached profile is fetched again so a revoked token is noticed.
pub async fn run_whoami<T: Transport>(
    client: &HttpClient<T>,
    restored: SessionRestore,
    refresh: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let restored = match restored {
        SessionRestore::Cached(cached) if refresh => refresh_profile(client, cached).await?,
        other => other,
    };
    match restored {
        SessionRestore::Cached(user) | SessionRestore::Validated(user) => {
            writeln!(out, "{}", describe(&user))?;
        }
        SessionRestore::Anonymous => writeln!(out, "Not signed in")?,
        SessionRestore::Cleared => writeln!(out, "Session expired; sign in again")?,
        SessionRestore::Stale => {
            writeln!(out, "Signed in, but the server could not confirm who you are")?
        }
    }
    Ok(())
}

async fn refresh_profile<T: Transport>(
    client: &HttpClient<T>,
    cached: AuthUser,
) -> anyhow::Result<SessionRestore> {
    let Some(token) = client.session().token() else {
        return Ok(SessionRestore::Cached(cached));
    };
    match client.current_user(&token).await {
        Ok(user) => {
            client.session().set_user(user.clone())?;
            Ok(SessionRestore::Validated(user))
        }
        Err(ApiError::Unauthorized) => {
            info!("stored token was rejected");
            client.logout()?;
            Ok(SessionRestore::Cleared)
        }
        Err(e) => Err(e.into()),
    }
}
