//! Session command handlers: login, logout, whoami, refresh.

use dialoguer::Input;
use secrecy::SecretString;
use serde::Serialize;

use bizdash_core::UserSession;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::Context;

/// The user as shown to humans; tokens stay out of it.
#[derive(Serialize)]
struct WhoAmI<'a> {
    profile: &'a str,
    username: &'a str,
    name: &'a str,
    email: &'a str,
    role: &'a str,
}

impl<'a> WhoAmI<'a> {
    fn new(profile: &'a str, user: &'a UserSession) -> Self {
        Self {
            profile,
            username: &user.username,
            name: &user.name,
            email: &user.email,
            role: &user.role,
        }
    }
}

fn detail(w: &WhoAmI<'_>) -> String {
    [
        format!("Profile:  {}", w.profile),
        format!("Username: {}", w.username),
        format!("Name:     {}", w.name),
        format!("Email:    {}", w.email),
        format!("Role:     {}", w.role),
    ]
    .join("\n")
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn login(ctx: &Context, args: LoginArgs) -> Result<(), CliError> {
    // 1. Username (flag > profile/env > prompt)
    let username = match args.username.or_else(|| config::resolve_username(&ctx.profile)) {
        Some(name) => name,
        None => Input::<String>::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err)?,
    };

    // 2. Password (env > keyring > profile > prompt)
    let mut profile = ctx.profile.clone();
    profile.username = Some(username.clone());
    let password = match config::resolve_credentials(&profile, &ctx.profile_name) {
        Ok((_, password)) => password,
        Err(_) => SecretString::from(rpassword::prompt_password("Password: ").map_err(prompt_err)?),
    };

    let outcome = ctx.session.login(&username, &password).await;
    if !outcome.success {
        return Err(CliError::AuthFailed {
            profile: ctx.profile_name.clone(),
            message: outcome.error.unwrap_or_default(),
        });
    }

    if let Some(user) = ctx.session.user() {
        eprintln!(
            "{}",
            output::success_line(
                &format!("Logged in as {} ({})", user.name, user.role),
                ctx.color
            )
        );
    }
    Ok(())
}

pub fn logout(ctx: &Context) {
    ctx.session.logout();
    eprintln!("{}", output::success_line("Logged out", ctx.color));
}

pub fn whoami(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let user = ctx.session.user().ok_or_else(|| CliError::NotLoggedIn {
        profile: ctx.profile_name.clone(),
    })?;
    let view = WhoAmI::new(&ctx.profile_name, &user);
    let out = output::render_single(&global.output, &view, detail, |w| w.username.to_owned());
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn refresh(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    if !ctx.session.is_authenticated() {
        return Err(CliError::NotLoggedIn {
            profile: ctx.profile_name.clone(),
        });
    }
    let refreshed = ctx.session.refresh_token().await;
    output::print_output(&refreshed.to_string(), global.quiet);
    if refreshed {
        Ok(())
    } else {
        Err(CliError::SessionExpired)
    }
}
