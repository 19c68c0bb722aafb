//! Command dispatch: bridges CLI args -> core stores/session -> output.

pub mod auth;
pub mod config_cmd;
pub mod resource;
pub mod summary;
pub mod util;

use std::sync::Arc;

use bizdash_config::Profile;
use bizdash_core::{Resource, Session};

use crate::cli::{Command, GlobalOpts};
use crate::config::{self, FileVault};
use crate::error::CliError;
use crate::output;

/// Everything a backend-bound command needs.
pub struct Context {
    pub profile_name: String,
    pub profile: Profile,
    pub session: Session,
    pub color: bool,
}

impl Context {
    /// Resolve the profile, build the HTTP client, and restore any stored
    /// session for the profile.
    pub fn connect(global: &GlobalOpts) -> Result<Self, CliError> {
        let cfg = config::load_config_or_default();
        let (profile_name, profile) = config::active_profile(global, &cfg)?;
        let backend = config::resolve_backend(&profile, &cfg, global)?;
        let client = backend.connect()?;

        let vault = Arc::new(FileVault::for_profile(&profile_name));
        let session = Session::new(client, vault);
        session.init();

        Ok(Self {
            profile_name,
            profile,
            session,
            color: output::should_color(&global.color),
        })
    }

    /// Make sure requests carry a token: reuse the stored session, or log
    /// in with configured credentials.
    pub async fn ensure_session(&self) -> Result<(), CliError> {
        if self.session.is_authenticated() {
            return Ok(());
        }

        let Ok((username, password)) = config::resolve_credentials(&self.profile, &self.profile_name)
        else {
            return Err(CliError::NotLoggedIn {
                profile: self.profile_name.clone(),
            });
        };

        let outcome = self.session.login(&username, &password).await;
        if outcome.success {
            Ok(())
        } else {
            Err(CliError::AuthFailed {
                profile: self.profile_name.clone(),
                message: outcome.error.unwrap_or_default(),
            })
        }
    }
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(ctx, args).await,
        Command::Logout => {
            auth::logout(ctx);
            Ok(())
        }
        Command::Whoami => auth::whoami(ctx, global),
        Command::Refresh => auth::refresh(ctx, global).await,
        Command::Employees(args) => resource::handle(ctx, Resource::Employees, args, global).await,
        Command::Projects(args) => resource::handle(ctx, Resource::Projects, args, global).await,
        Command::Customers(args) => resource::handle(ctx, Resource::Customers, args, global).await,
        Command::Transactions(args) => {
            resource::handle(ctx, Resource::Transactions, args, global).await
        }
        Command::Assets(args) => resource::handle(ctx, Resource::Assets, args, global).await,
        Command::Summary => summary::handle(ctx, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
