mod commands;
mod output;
mod surface;

use clap::{Args, Parser, Subcommand};
use pagemark_core::config::{load_config, SessionConfig, DEFAULT_LEDGER_FILE};
use pagemark_core::error::PagemarkError;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(
    name = "pagemark",
    version,
    about = "Mark regions on document pages and extract the text under them"
)]
struct Cli {
    /// Enable verbose logging (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive session (events are read line by line from stdin or a script)
    Run {
        /// Documents to process, in order (appended after --list)
        documents: Vec<PathBuf>,

        /// File with one document path per line
        #[arg(short, long, value_name = "FILE")]
        list: Option<PathBuf>,

        /// Read events from a file instead of stdin
        #[arg(long, value_name = "FILE")]
        script: Option<PathBuf>,

        #[command(flatten)]
        session: SessionArgs,
    },
    /// Apply one stored template slot to documents without interaction
    Extract {
        /// Documents to process, in order (appended after --list)
        documents: Vec<PathBuf>,

        /// File with one document path per line
        #[arg(short, long, value_name = "FILE")]
        list: Option<PathBuf>,

        /// Template slot to apply (0-9)
        #[arg(long, default_value_t = 0)]
        slot: u8,

        #[command(flatten)]
        session: SessionArgs,
    },
    /// Report how many listed documents are recorded in the ledger
    Progress {
        /// File with one document path per line
        #[arg(short, long, value_name = "FILE")]
        list: PathBuf,

        /// Ledger file
        #[arg(long, default_value = DEFAULT_LEDGER_FILE, value_name = "FILE")]
        ledger: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Print the ledger
    Show {
        /// Ledger file
        #[arg(long, default_value = DEFAULT_LEDGER_FILE, value_name = "FILE")]
        ledger: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

/// Session settings; flags override values from --config.
#[derive(Args)]
struct SessionArgs {
    /// JSON config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Page index every document starts on (0-based)
    #[arg(short, long)]
    page: Option<usize>,

    /// Ledger file
    #[arg(long, value_name = "FILE")]
    ledger: Option<PathBuf>,

    /// Raster resolution in dots per inch
    #[arg(long)]
    dpi: Option<f64>,

    /// Template file to load from and save to
    #[arg(short, long, value_name = "FILE")]
    templates: Option<PathBuf>,

    /// Directory for rendered page rasters
    #[arg(long, value_name = "DIR")]
    raster_dir: Option<PathBuf>,

    /// Load the existing ledger and skip documents already recorded
    #[arg(long)]
    resume: bool,
}

impl SessionArgs {
    fn into_config(self) -> Result<SessionConfig, PagemarkError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => SessionConfig::default(),
        };
        if let Some(page) = self.page {
            config.start_page = page;
        }
        if let Some(ledger) = self.ledger {
            config.ledger_path = ledger;
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        if let Some(templates) = self.templates {
            config.templates_path = Some(templates);
        }
        if let Some(dir) = self.raster_dir {
            config.raster_dir = Some(dir);
        }
        config.resume |= self.resume;
        config.validate()?;
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not install logger: {e}");
    }

    let result = match cli.command {
        Commands::Run {
            documents,
            list,
            script,
            session,
        } => session
            .into_config()
            .and_then(|config| commands::run::run(documents, list, script, config)),
        Commands::Extract {
            documents,
            list,
            slot,
            session,
        } => session
            .into_config()
            .and_then(|config| commands::extract::run(documents, list, slot, config)),
        Commands::Progress {
            list,
            ledger,
            output,
        } => commands::progress::run(&list, &ledger, &output),
        Commands::Show { ledger, output } => commands::progress::show(&ledger, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
