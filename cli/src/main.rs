//! Terminal front-end for the Codepad services.
//!
//! Reads service configuration from the environment (and `.env`), signs in
//! with an identity token passed on the command line, and prints backend
//! results as JSON.

use std::cell::Cell;
use std::io::{self, Read};
use std::rc::Rc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use codepad::http::ReqwestTransport;
use codepad::sync::{CallbackEffects, default_destination};
use codepad::{
    AuthenticatedUser, CodeServiceGateway, ConfigError, GatewayError, Identity, IdentitySession, LocalAuthProvider,
    Role, RoleResolver, ServiceConfig, SessionSnapshot, SessionSynchronizer, SyncOutcome, Token, TransportError,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("http client setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error("failed to read source: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("timed out waiting for session state")]
    Timeout,
    #[error("session stopped before settling")]
    SessionStopped,
}

#[derive(Parser, Debug)]
#[command(name = "codepad", about = "Codepad lint, run, and autocomplete client")]
struct Cli {
    #[arg(long, env = "CODEPAD_ID_TOKEN", hide_env_values = true)]
    id_token: Option<String>,

    #[arg(long, env = "CODEPAD_UID", default_value = "cli-user")]
    uid: String,

    #[arg(long, env = "CODEPAD_EMAIL")]
    email: Option<String>,

    #[arg(long, env = "CODEPAD_SESSION_TIMEOUT_SECS", default_value_t = 15)]
    session_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct SourceArgs {
    #[arg(long)]
    language: String,

    #[arg(default_value = "-", help = "Source file path, or - for stdin")]
    input: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lint a source file.
    Lint(SourceArgs),
    /// Ask for a completion of a source file.
    Autocomplete(SourceArgs),
    /// Execute a source file in the sandbox.
    Run {
        #[arg(long)]
        language_id: u32,

        #[arg(default_value = "-", help = "Source file path, or - for stdin")]
        input: String,
    },
    /// Print the signed-in user and its role.
    Whoami,
    /// Run post-login synchronization and print the landing route.
    Login,
}

struct CliContext {
    config: ServiceConfig,
    provider: Rc<LocalAuthProvider>,
    transport: Rc<ReqwestTransport>,
    session_timeout: Duration,
}

impl CliContext {
    fn gateway(&self) -> Result<CodeServiceGateway<LocalAuthProvider, ReqwestTransport>, CliError> {
        Ok(CodeServiceGateway::new(&self.config, Rc::clone(&self.provider), Rc::clone(&self.transport))?)
    }

    fn resolver(&self) -> Result<Rc<RoleResolver<ReqwestTransport>>, CliError> {
        Ok(Rc::new(RoleResolver::from_config(&self.config, Rc::clone(&self.transport))?))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ServiceConfig::from_env()?;
    config.validate()?;

    let provider = Rc::new(LocalAuthProvider::new());
    if let Some(token) = normalized_token(cli.id_token.as_deref()) {
        provider.sign_in(cli_identity(&cli.uid, cli.email.clone()), token);
    }
    let ctx = CliContext {
        transport: Rc::new(ReqwestTransport::new(config.timeouts)?),
        config,
        provider,
        session_timeout: Duration::from_secs(cli.session_timeout_secs),
    };

    match cli.command {
        Command::Lint(args) => {
            let code = read_source(&args.input)?;
            print_json(&ctx.gateway()?.lint(&code, &args.language).await?)
        }
        Command::Autocomplete(args) => {
            let code = read_source(&args.input)?;
            print_json(&ctx.gateway()?.autocomplete(&code, &args.language).await?)
        }
        Command::Run { language_id, input } => {
            let code = read_source(&input)?;
            print_json(&ctx.gateway()?.run(&code, language_id).await?)
        }
        Command::Whoami => run_whoami(&ctx).await,
        Command::Login => run_login(&ctx).await,
    }
}

async fn run_whoami(ctx: &CliContext) -> Result<(), CliError> {
    let session = IdentitySession::new(Rc::clone(&ctx.provider), ctx.resolver()?);
    let mut rx = session.watch();
    let (subscription, driver) = session.activate();

    let settled = async {
        tokio::select! {
            biased;
            snapshot = rx.wait_for(|s| !s.loading) => snapshot.ok().map(|s| s.clone()),
            () = driver => None,
        }
    };
    let snapshot: Option<SessionSnapshot> = tokio::time::timeout(ctx.session_timeout, settled)
        .await
        .map_err(|_| CliError::Timeout)?;
    subscription.stop();

    match snapshot.ok_or(CliError::SessionStopped)?.user {
        Some(user) => print_json(&serde_json::to_value(&user)?),
        None => {
            println!("signed out");
            Ok(())
        }
    }
}

async fn run_login(ctx: &CliContext) -> Result<(), CliError> {
    let sync = SessionSynchronizer::new(Rc::clone(&ctx.provider), ctx.resolver()?);
    let destination = Cell::new(None::<&'static str>);
    let effects = CallbackEffects {
        store_user: |user: AuthenticatedUser| tracing::debug!(uid = %user.identity.uid, role = %user.role, "session user stored"),
        navigate: |role: Role| destination.set(Some(default_destination(role))),
    };

    match sync.synchronize(&effects).await {
        SyncOutcome::Completed(user) => {
            print_json(&serde_json::to_value(&user)?)?;
            if let Some(route) = destination.get() {
                println!("destination: {route}");
            }
            Ok(())
        }
        SyncOutcome::NoSession => {
            println!("no signed-in session; pass --id-token or set CODEPAD_ID_TOKEN");
            Ok(())
        }
        other => {
            tracing::warn!(outcome = ?other, "post-login sync did not complete");
            Ok(())
        }
    }
}

fn normalized_token(raw: Option<&str>) -> Option<Token> {
    raw.map(str::trim).filter(|t| !t.is_empty()).map(Token::new)
}

fn cli_identity(uid: &str, email: Option<String>) -> Identity {
    Identity::new(uid, email, "cli")
}

fn read_source(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut code = String::new();
        io::stdin().read_to_string(&mut code)?;
        Ok(code)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
