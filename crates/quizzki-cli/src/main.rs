//! quizzki CLI: terminal console for the Quizzki examination platform.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use quizzki_core::session::Role;

mod commands;

use commands::student::StudentCommand;
use commands::teacher::TeacherCommand;
use commands::Context;

#[derive(Parser)]
#[command(name = "quizzki", version, about = "Console client for Quizzki examinations")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API base URL (overrides the config file)
    #[arg(long, global = true, env = "QUIZZKI_URL")]
    url: Option<String>,

    /// Session file (default: ~/.config/quizzki/session.toml)
    #[arg(long, global = true, env = "QUIZZKI_SESSION")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter quizzki.toml
    Init,

    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Sign in to the teacher console instead of the student one
        #[arg(long)]
        teacher: bool,
    },

    /// Forget stored sessions
    Logout {
        /// Only this role (student or teacher); both when omitted
        #[arg(long)]
        role: Option<Role>,
    },

    /// Show stored sessions
    Whoami,

    /// Teacher console
    Teacher {
        #[command(subcommand)]
        command: TeacherCommand,
    },

    /// Student console
    Student {
        #[command(subcommand)]
        command: StudentCommand,
    },
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizzki=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        config,
        url,
        session_file,
        command,
    } = cli;
    let context = || Context::load(config.as_deref(), url.as_deref(), session_file.as_deref());

    match command {
        Commands::Init => commands::init::execute(),
        Commands::Login {
            email,
            password,
            teacher,
        } => {
            let role = if teacher { Role::Teacher } else { Role::Student };
            commands::login::execute(&context()?, role, &email, &password).await
        }
        Commands::Logout { role } => commands::login::logout(&context()?, role),
        Commands::Whoami => commands::login::whoami(&context()?),
        Commands::Teacher { command } => commands::teacher::execute(&context()?, command).await,
        Commands::Student { command } => commands::student::execute(&context()?, command).await,
    }
}
