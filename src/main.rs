use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docscan::config::{self, AppConfig};
use docscan::search::{self, SealedIndex};
use docscan::Pipeline;

#[derive(Parser)]
#[command(name = "docscan")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_TIME"), ")"))]
#[command(about = "Index a document directory and count keyword hits", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Configuration file (defaults to ./config.json)
    #[arg(long, short, global = true, env = "DOCSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides used when no subcommand is given / 未指定子命令时等同于 run
    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline (default)
    Run(RunArgs),
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Query the index left by the last run
    Search {
        /// Free-text query, same syntax as keyword lines
        query: String,
        /// Index directory (defaults to output.index_dir)
        #[arg(long)]
        index_dir: Option<PathBuf>,
    },
}

/// Per-run overrides of config.json / 覆盖配置文件的参数
#[derive(Args, Debug, Default, PartialEq)]
struct RunArgs {
    /// Keyword list, one query per line
    #[arg(long)]
    keywords: Option<String>,
    /// Directory scanned for documents
    #[arg(long)]
    documents: Option<String>,
    /// Accepted extensions, comma-separated
    #[arg(long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,
    /// Activity log file
    #[arg(long)]
    log: Option<String>,
    /// Report file
    #[arg(long)]
    report: Option<String>,
    /// Index snapshot directory
    #[arg(long)]
    index_dir: Option<String>,
    /// Worker threads (0 = CPU count)
    #[arg(long)]
    workers: Option<usize>,
    /// Keep file system order instead of natural filename order
    #[arg(long)]
    no_sort: bool,
}

impl RunArgs {
    fn apply(self, config: &mut AppConfig) {
        if let Some(v) = self.keywords {
            config.input.keywords_file = v;
        }
        if let Some(v) = self.documents {
            config.input.documents_dir = v;
        }
        if let Some(v) = self.extensions {
            config.input.extensions = v;
        }
        if let Some(v) = self.log {
            config.output.log_file = v;
        }
        if let Some(v) = self.report {
            config.output.report_file = v;
        }
        if let Some(v) = self.index_dir {
            config.output.index_dir = v;
        }
        if let Some(v) = self.workers {
            config.pipeline.workers = v;
        }
        if self.no_sort {
            config.pipeline.sort_documents = false;
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docscan=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config::default_config_path);

    match cli.command.unwrap_or(Command::Run(cli.run)) {
        Command::Run(args) => {
            let mut app_config = config::load_config(&config_path)?;
            args.apply(&mut app_config);

            tracing::info!("docscan {} (built {})", env!("CARGO_PKG_VERSION"), env!("BUILD_TIME"));
            let outcome = Pipeline::new(app_config)?.run()?;

            if !outcome.skipped_keywords.is_empty() {
                tracing::warn!("{} keyword(s) skipped", outcome.skipped_keywords.len());
            }
            if !outcome.failed_documents.is_empty() {
                tracing::warn!("{} document(s) failed extraction", outcome.failed_documents.len());
            }
        }
        Command::Init { force } => {
            if config_path.exists() && !force {
                anyhow::bail!("{:?} already exists (use --force to overwrite)", config_path);
            }
            config::save_config(&AppConfig::default(), &config_path)?;
            tracing::info!("Wrote default configuration to {:?}", config_path);
        }
        Command::Search { query, index_dir } => {
            let dir = match index_dir {
                Some(dir) => dir,
                None => config::load_config(&config_path)?.index_path(),
            };
            let index = SealedIndex::open(&dir)
                .with_context(|| format!("no usable index at {:?}, run the pipeline first", dir))?;
            let parsed = search::parse(&query)
                .with_context(|| format!("cannot parse query \"{}\"", query))?;

            for filename in index.search_filenames(&parsed)? {
                println!("{}", filename);
            }
        }
    }

    Ok(())
}
