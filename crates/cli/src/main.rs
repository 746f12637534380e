mod admin;
mod config;
mod serve;
mod survey;

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use feedback_core::{Credentials, FeedbackRecord, RecordFilter, RecordStore, SortKey};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use self::config::FeedbackConfig;
use self::survey::SurveyOutcome;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Student feedback survey and admin dashboard.
#[derive(Parser)]
#[command(
    name = "feedback",
    version,
    about = "Student feedback survey and admin dashboard"
)]
struct Cli {
    /// Path to feedback.toml (also FEEDBACK_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of the record store, overriding the config file
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Keep records in memory only; nothing is written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in the feedback form interactively
    Survey,

    /// Dashboard views over stored responses (requires an admin account)
    Admin {
        /// Admin username
        #[arg(long)]
        user: String,
        /// Admin password
        #[arg(long)]
        password: String,
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the HTTP API server
    Serve {
        /// Port to listen on, overriding the config file
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Filter and sort controls shared by `list` and `show`.
#[derive(Args, Debug, Clone)]
struct ViewArgs {
    /// Only responses from this year
    #[arg(long)]
    year: Option<String>,
    /// Case-insensitive match on student name or ID
    #[arg(long)]
    search: Option<String>,
    /// Sort by name, satisfaction or date (newest first)
    #[arg(long, default_value = "date")]
    sort: String,
}

impl ViewArgs {
    fn apply(&self, records: &[FeedbackRecord]) -> Vec<FeedbackRecord> {
        let criteria = RecordFilter {
            year: self.year.clone(),
            search: self.search.clone(),
        };
        admin::view(records, &criteria, SortKey::parse(&self.sort))
    }
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Response count, average satisfaction, latest response and rate
    Stats,
    /// List responses
    List {
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Show one response by record id or by its number in `list`
    Show {
        /// Record id, or the row number shown by `list` with the same filters
        record: String,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Export all responses as CSV
    Export {
        /// Output directory or file; `-` writes to stdout
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let mut config = match config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("error: {}", e), cli.output, cli.quiet);
            process::exit(1);
        }
    };
    if let Some(dir) = cli.store_dir {
        config.store.dir = dir;
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(
                &format!("error: failed to create tokio runtime: {}", e),
                cli.output,
                cli.quiet,
            );
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Survey => {
            cmd_survey(&rt, &config, cli.ephemeral, cli.output, cli.quiet);
        }
        Commands::Admin {
            user,
            password,
            command,
        } => {
            let credentials = Credentials::new(user, password);
            cmd_admin(
                &rt,
                &config,
                cli.ephemeral,
                &credentials,
                command,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let store = config.open_store(cli.ephemeral);
            let auth = config.authenticator();
            if auth.is_empty() {
                tracing::warn!(
                    "no [[admins]] configured; admin endpoints will reject every request"
                );
            }
            if let Err(e) = rt.block_on(serve::start_server(port, store, auth)) {
                report_error(&format!("Server error: {}", e), cli.output, cli.quiet);
                process::exit(1);
            }
        }
    }
}

/// Structured logs go to stderr; RUST_LOG overrides the default level.
fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn cmd_survey(
    rt: &tokio::runtime::Runtime,
    config: &FeedbackConfig,
    ephemeral: bool,
    output: OutputFormat,
    quiet: bool,
) {
    let store = config.open_store(ephemeral);
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();

    let outcome = match rt.block_on(survey::run_survey(&store, &mut reader, &mut writer)) {
        Ok(o) => o,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    match outcome {
        SurveyOutcome::Submitted(receipt) => {
            if output == OutputFormat::Json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&receipt).unwrap_or_default()
                );
            }
        }
        SurveyOutcome::Abandoned => process::exit(2),
    }
}

fn cmd_admin(
    rt: &tokio::runtime::Runtime,
    config: &FeedbackConfig,
    ephemeral: bool,
    credentials: &Credentials,
    command: AdminCommands,
    output: OutputFormat,
    quiet: bool,
) {
    let auth = config.authenticator();
    if let Err(e) = admin::login(&auth, credentials) {
        report_error(&e.to_string(), output, quiet);
        process::exit(1);
    }

    let store = config.open_store(ephemeral);
    let records = rt.block_on(store.fetch_all());

    match command {
        AdminCommands::Stats => admin::cmd_stats(&records, output),
        AdminCommands::List { view } => admin::cmd_list(&view.apply(&records), output),
        AdminCommands::Show { record, view } => {
            let shown = view.apply(&records);
            match admin::select(&records, &shown, &record) {
                Ok(r) => admin::cmd_show(r, output),
                Err(e) => {
                    report_error(&e.to_string(), output, quiet);
                    process::exit(1);
                }
            }
        }
        AdminCommands::Export { out } => match admin::cmd_export(&records, &out) {
            Ok(Some(path)) => {
                if !quiet {
                    match output {
                        OutputFormat::Text => {
                            println!("Exported {} responses to {}", records.len(), path.display())
                        }
                        OutputFormat::Json => println!(
                            "{}",
                            serde_json::json!({
                                "path": path.display().to_string(),
                                "rows": records.len(),
                            })
                        ),
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                report_error(&e.to_string(), output, quiet);
                process::exit(1);
            }
        },
    }
}

/// Report an error message in the requested output format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}
