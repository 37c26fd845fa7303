use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use resume_sender::api::{ApiClient, Services};
use resume_sender::clipboard::default_clipboard;
use resume_sender::commands::{self, ExportTarget};
use resume_sender::export::{ExportFormat, ExportSettings};
use resume_sender::models::Config;
use resume_sender::ui::{self, OutreachApp};

/// Resume outreach admin console
#[derive(Parser)]
#[command(name = "resume-sender")]
#[command(version)]
#[command(about = "Send resumes and track career pages, referrals and email history")]
#[command(long_about = "
Terminal front end for the resume outreach service. Without a command it opens the
dashboard; the subcommands run one action and exit.

Examples:
  resume-sender                                   # dashboard
  resume-sender send hr@acme.example              # send one resume
  resume-sender --export-format csv export careers
  resume-sender --api-base-url http://10.0.0.5:8080 ping
")]
struct Args {
    /// Base URL of the outreach service (overrides API_BASE_URL)
    #[arg(long)]
    api_base_url: Option<String>,

    /// Directory export files are written to (overrides EXPORT_DIR)
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Spreadsheet format for exports (overrides EXPORT_FORMAT)
    #[arg(long, value_enum)]
    export_format: Option<ExportFormat>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Open the dashboard (default)
    Tui,
    /// Send the resume email to one address
    Send { email: String },
    /// Write one collection to a spreadsheet
    Export {
        #[arg(value_enum)]
        target: ExportTarget,
    },
    /// Check that the service is reachable
    Ping,
}

fn init_logging(command: &Command, config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("resume_sender=info"));

    // The dashboard owns the terminal, so its logs go to a file
    let result = match command {
        Command::Tui => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.log_file)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        _ => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    result.map_err(|e| anyhow!("setting default subscriber failed: {}", e))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(url) = args.api_base_url {
        config.api_base_url = url;
    }
    if let Some(dir) = args.export_dir {
        config.export_dir = dir;
    }
    if let Some(format) = args.export_format {
        config.export_format = format;
    }

    let command = args.command.unwrap_or(Command::Tui);
    init_logging(&command, &config)?;
    info!("🚀 Starting resume-sender ({:?})", command);

    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();
    let services = Services::from_client(ApiClient::new(&config)?);
    let export = ExportSettings {
        dir: config.export_dir.clone(),
        format: config.export_format,
    };

    match command {
        Command::Tui => {
            let mut app = OutreachApp::new(services, export, default_clipboard());
            if let Err(e) = ui::run_app(&mut app) {
                error!("TUI error: {:#}", e);
                eprintln!("❌ TUI Error: {}", e);
                std::process::exit(1);
            }
        }
        Command::Send { email } => match runtime.block_on(commands::send_email(&services, &email)) {
            Ok(message) => println!("✅ {}", message),
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        },
        Command::Export { target } => {
            match runtime.block_on(commands::export(&services, target, &export))? {
                Some(path) => println!("💾 Exported to {}", path.display()),
                None => println!("Nothing to export: the collection is empty"),
            }
        }
        Command::Ping => {
            if runtime.block_on(commands::ping(services.outreach.as_ref()))? {
                println!("✅ pong from {}", config.api_base_url);
            } else {
                eprintln!("❌ {} answered, but not with pong", config.api_base_url);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
