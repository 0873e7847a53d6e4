mod store;
mod transport;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use prodops_client::config::ApiConfig;
use prodops_client::net::api;
use prodops_client::net::gateway::{ApiError, CancelToken, Gateway};
use prodops_client::net::session::SessionStore;
use prodops_client::net::types::TicketStatus;
use prodops_client::state::auth::validate_login_email;
use prodops_client::state::tickets::TicketFilter;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::store::FileStore;
use crate::transport::ReqwestTransport;

type CliGateway = Gateway<ReqwestTransport, FileStore>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("not logged in; run `prodops-cli login --email <EMAIL>` first")]
    NotLoggedIn,
    #[error("{0}")]
    InvalidArgument(&'static str),
    #[error("ticket {0} not found")]
    TicketNotFound(String),
    #[error("interrupted")]
    Interrupted,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "prodops-cli", about = "ProdOps assistant and ticket CLI")]
struct Cli {
    #[arg(long, env = "PRODOPS_API_BASE")]
    base_url: Option<String>,

    #[arg(long, env = "PRODOPS_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in by email and store the issued token.
    Login {
        #[arg(long)]
        email: String,
    },
    /// Forget the stored session.
    Logout,
    /// Print the stored user profile.
    Whoami,
    /// Check that the service is up.
    Health,
    /// Ask the assistant a question.
    Chat {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    Tickets(TicketsCommand),
}

#[derive(Args, Debug)]
struct TicketsCommand {
    #[command(subcommand)]
    command: TicketsSubcommand,
}

#[derive(Subcommand, Debug)]
enum TicketsSubcommand {
    List {
        #[arg(long, default_value = "ALL", value_parser = parse_filter)]
        status: TicketFilter,
    },
    Stats,
    Show {
        ticket_no: String,
    },
    Update {
        ticket_no: String,
        #[arg(value_parser = parse_status)]
        status: TicketStatus,
    },
}

fn parse_filter(raw: &str) -> Result<TicketFilter, String> {
    TicketFilter::parse(raw).ok_or_else(|| format!("unknown status `{raw}`; expected ALL, OPEN, IN_PROGRESS or CLOSED"))
}

fn parse_status(raw: &str) -> Result<TicketStatus, String> {
    TicketStatus::parse(raw).ok_or_else(|| format!("unknown status `{raw}`; expected OPEN, IN_PROGRESS or CLOSED"))
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli
        .base_url
        .as_deref()
        .map_or_else(ApiConfig::from_build, ApiConfig::new);
    let store = FileStore::new(cli.session_file.unwrap_or_else(FileStore::default_path));
    tracing::debug!(base_url = %config.base_url, session = %store.path().display(), "starting");
    let gateway = Gateway::new(config, ReqwestTransport::new(), SessionStore::new(store));

    let cancel = CancelToken::new();
    tokio::select! {
        result = run(&gateway, cli.command, &cancel) => result,
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            Err(CliError::Interrupted)
        }
    }
}

async fn run(gateway: &CliGateway, command: Command, cancel: &CancelToken) -> Result<(), CliError> {
    match command {
        Command::Login { email } => {
            let email = validate_login_email(&email).map_err(CliError::InvalidArgument)?;
            let user = api::login(gateway, &email, cancel).await?;
            println!("logged in as {} ({})", user.email, user.roles_label());
            Ok(())
        }
        Command::Logout => {
            api::logout(gateway);
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            let session = gateway.session();
            let user = session
                .user()
                .filter(|_| session.is_authenticated())
                .ok_or(CliError::NotLoggedIn)?;
            print_json(&user)
        }
        Command::Health => {
            let health = api::check_health(gateway, cancel).await?;
            println!("{}", health.status);
            Ok(())
        }
        Command::Chat { message } => {
            require_login(gateway)?;
            let reply = api::send_chat(gateway, &message.join(" "), cancel).await?;
            println!("{reply}");
            Ok(())
        }
        Command::Tickets(tickets) => run_tickets(gateway, tickets, cancel).await,
    }
}

async fn run_tickets(gateway: &CliGateway, tickets: TicketsCommand, cancel: &CancelToken) -> Result<(), CliError> {
    require_login(gateway)?;
    match tickets.command {
        TicketsSubcommand::List { status } => {
            let items = api::fetch_tickets(gateway, status, cancel).await?;
            print_json(&items)
        }
        TicketsSubcommand::Stats => {
            let stats = api::fetch_ticket_stats(gateway, cancel).await?;
            print_json(&stats)
        }
        TicketsSubcommand::Show { ticket_no } => {
            let ticket = api::fetch_ticket(gateway, &ticket_no, cancel)
                .await?
                .ok_or_else(|| CliError::TicketNotFound(ticket_no.clone()))?;
            print_json(&ticket)
        }
        TicketsSubcommand::Update { ticket_no, status } => {
            let can_manage = gateway.session().user().is_some_and(|u| u.can_manage_tickets());
            if !can_manage {
                tracing::warn!("stored profile lacks MAINTENANCE or SUPERVISOR; the service will likely refuse");
            }
            let ack = api::update_ticket_status(gateway, &ticket_no, status, cancel).await?;
            print_json(&ack)
        }
    }
}

fn require_login(gateway: &CliGateway) -> Result<(), CliError> {
    if gateway.session().is_authenticated() {
        Ok(())
    } else {
        Err(CliError::NotLoggedIn)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
