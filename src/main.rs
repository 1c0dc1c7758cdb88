//! # Avales
//!
//! Terminal front end for the CAEDUC approval-request workflow. A scriptable
//! CLI covers every action; `avales ui` opens an interactive admin dashboard.
//!
//! ## Usage
//!
//! **Public (no session needed)**
//! ```bash
//! # Submit a request, optionally attaching the filled-in form
//! avales aval submit --applicant "Asoc. Psiquiatría" --activity "Congreso 2025" \
//!     --email contacto@asoc.gt --form ./formulario.pdf
//!
//! # Sign in as committee admin
//! avales login admin@caeduc.gt --password admin
//! ```
//!
//! **Admin**
//! ```bash
//! avales member add "Dra. Rebeca Ramírez" --role coordinadora
//! avales activity add "Curso X" --type diplomado --date 2025-03-01 --hours 40
//! avales activity tasks 1
//! avales aval approve 1
//! avales aval reject 2 --reason "Documentación incompleta"
//! avales letter 1 pago
//! avales report
//! ```
//!
//! ## Configuration
//!
//! *   `AVALES_DATA_DIR`: data directory (default `~/.local/share/avales` on Linux).
//! *   `AVALES_ADMIN_EMAIL` / `AVALES_ADMIN_PASSWORD`: admin credentials.
//! *   `AVALES_LOG`: log filter (e.g. `debug`), written to stderr.
//!
//! A `.env` file in the working directory is read first.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use avales::commands::*;
use avales::config::Config;
use avales::models::{ActivityType, AvalStatus, DocumentType, Role};
use avales::storage::Store;
use avales::tui::run_tui;

#[derive(Parser)]
#[command(name = "avales")]
#[command(about = "Activity planning and approval requests for the CAEDUC committee", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as committee admin
    Login {
        email: String,
        /// Password (prompted if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the current session
    Whoami,
    /// Plan activities
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },
    /// Manage committee members
    Member {
        #[command(subcommand)]
        command: MemberCommands,
    },
    /// Submit and decide approval requests
    Aval {
        #[command(subcommand)]
        command: AvalCommands,
    },
    /// Generate a payment or supplies letter for an activity
    Letter {
        activity_id: u64,
        kind: DocumentType,
        /// Signer recorded on the document
        #[arg(short, long)]
        author: Option<String>,
    },
    /// Show the history of avales and generated documents
    Report,
    /// Reset the data directory (delete everything)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(Subcommand)]
enum ActivityCommands {
    /// Create an activity and assign its tasks
    Add {
        /// Activity title (quoted if it has spaces)
        title: String,
        #[arg(short = 't', long = "type", value_enum, default_value_t = ActivityType::Diplomado)]
        kind: ActivityType,
        /// Date in YYYY-MM-DD
        #[arg(short, long)]
        date: String,
        /// Duration in hours
        #[arg(short = 'H', long)]
        hours: Option<f64>,
    },
    /// List activities, newest first
    List,
    /// Show the tasks generated for an activity
    Tasks {
        id: u64,
    },
}

#[derive(Subcommand)]
enum MemberCommands {
    /// Add a member holding a committee role
    Add {
        name: String,
        /// Role, e.g. coordinadora, "gestor del conocimiento", vocal-ii
        #[arg(short, long)]
        role: Role,
    },
    /// List members
    List,
    /// Mark a member as active
    Activate {
        id: u64,
    },
    /// Mark a member as inactive (no new tasks are assigned)
    Deactivate {
        id: u64,
    },
}

#[derive(Subcommand)]
enum AvalCommands {
    /// Submit a new request
    Submit {
        /// Applicant name or institution
        #[arg(long)]
        applicant: String,
        /// Activity name
        #[arg(long)]
        activity: String,
        /// Contact email
        #[arg(long)]
        email: String,
        /// Filled-in request form to attach
        #[arg(long)]
        form: Option<PathBuf>,
    },
    /// List requests, newest first
    List {
        #[arg(short, long, value_enum)]
        status: Option<AvalStatus>,
    },
    /// Approve a pending request
    Approve {
        id: u64,
    },
    /// Reject a pending request
    Reject {
        id: u64,
        /// Reason given to the applicant
        #[arg(short, long)]
        reason: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("AVALES_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut input = String::new();
    io::stdin().read_line(&mut input).context("Failed to read password")?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env();
    let store = Store::open(config.data_dir.clone())
        .with_context(|| format!("Failed to open data directory {}", config.data_dir.display()))?;
    tracing::debug!(data_dir = %config.data_dir.display(), "store opened");

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            cmd_login(&store, &config, &email, &password, false)?;
        }
        Commands::Logout => cmd_logout(&store, false)?,
        Commands::Whoami => cmd_whoami(&store)?,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "avales", &mut io::stdout());
        }
        Commands::Aval { command: AvalCommands::Submit { applicant, activity, email, form } } => {
            cmd_aval_submit(&store, applicant, activity, email, form.as_deref(), false)?;
        }
        admin => {
            require_admin(&store)?;
            run_admin(&store, admin)?;
        }
    }
    Ok(())
}

/// Runs a command that needs a signed-in admin.
fn run_admin(store: &Store, command: Commands) -> Result<()> {
    match command {
        Commands::Activity { command } => match command {
            ActivityCommands::Add { title, kind, date, hours } => {
                cmd_activity_add(store, title, kind, date, hours, false)?;
            }
            ActivityCommands::List => cmd_activity_list(store)?,
            ActivityCommands::Tasks { id } => cmd_activity_tasks(store, id)?,
        },
        Commands::Member { command } => match command {
            MemberCommands::Add { name, role } => {
                cmd_member_add(store, name, role, false)?;
            }
            MemberCommands::List => cmd_member_list(store)?,
            MemberCommands::Activate { id } => {
                cmd_member_set_active(store, id, true, false)?;
            }
            MemberCommands::Deactivate { id } => {
                cmd_member_set_active(store, id, false, false)?;
            }
        },
        Commands::Aval { command } => match command {
            AvalCommands::List { status } => cmd_aval_list(store, status)?,
            AvalCommands::Approve { id } => {
                cmd_aval_approve(store, id, false)?;
            }
            AvalCommands::Reject { id, reason } => {
                cmd_aval_reject(store, id, reason, false)?;
            }
            AvalCommands::Submit { .. } => unreachable!("submit is public"),
        },
        Commands::Letter { activity_id, kind, author } => {
            cmd_letter(store, activity_id, kind, author, false)?;
        }
        Commands::Report => cmd_report(store)?,
        Commands::Reset { force } => cmd_reset(store, force)?,
        Commands::Ui => run_tui(store.clone()).map_err(|e| anyhow::anyhow!("Error running TUI: {}", e))?,
        Commands::Login { .. } | Commands::Logout | Commands::Whoami | Commands::Completions { .. } => {
            unreachable!("public commands do not need a session")
        }
    }
    Ok(())
}

fn main() {
    let _ = dotenvy::dotenv();
    init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
