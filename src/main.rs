use anyhow::Result;
use clap::{Parser, Subcommand};
use i18n_agent::commands;
use i18n_agent::commands::update::UpdateArgs;
use i18n_agent::config::{Config, DEFAULT_CONFIG_FILE};
use i18n_agent::logging;
use std::path::PathBuf;

/// Find, normalize, translate and upload i18n texts
#[derive(Parser)]
#[command(name = "i18n-agent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug (overrides I18N_AGENT_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan source files for translation calls or untranslated text
    Scan {
        /// Directory to scan (default: current directory)
        dir: Option<PathBuf>,

        /// File extensions to include (overrides config)
        #[arg(short, long, num_args = 1..)]
        extensions: Vec<String>,

        /// Directory names to skip (overrides config)
        #[arg(short = 'x', long, num_args = 1..)]
        exclude: Vec<String>,

        /// Write the full scan result as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Look for untranslated literal text instead of translation calls
        #[arg(long)]
        raw: bool,
    },

    /// Classify translation calls against the remote dictionary
    Check {
        /// Directory to scan (default: current directory)
        dir: Option<PathBuf>,

        /// Write the report to a file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rewrite calls that use a display value to use its key
        #[arg(long)]
        apply: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Check, normalize keys, translate missing texts and upload them
    Update {
        /// Directory to scan (default: current directory)
        dir: Option<PathBuf>,

        /// Show what would change without writing files or calling remote services
        #[arg(long)]
        dry_run: bool,

        /// Stop after key normalization
        #[arg(long)]
        skip_translate: bool,

        /// Translate but do not upload
        #[arg(long)]
        skip_upload: bool,

        /// Tag for uploaded keys (overrides lokalise.defaultTag)
        #[arg(short, long)]
        tag: Option<String>,

        /// Lokalise project ID (overrides lokalise.projectId)
        #[arg(short, long)]
        project: Option<String>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Translate texts into English, Chinese and Japanese
    Translate {
        /// Texts to translate
        texts: Vec<String>,

        /// Read texts from a file, one per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Write results as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload translations from a CSV file
    Upload {
        /// CSV file with "en","cn","ja" rows
        file: PathBuf,

        /// Lokalise project ID (overrides lokalise.projectId)
        #[arg(short, long)]
        project: Option<String>,

        /// Tag for uploaded keys (overrides lokalise.defaultTag)
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// List Lokalise projects
    Projects,

    /// Initialize a new configuration file
    Init {
        /// Overwrite existing config file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(invalid) = logging::init(cli.log_level.as_deref()) {
        logging::warn(&format!("Unknown log level '{}', using info", invalid));
    }

    if let Commands::Init { force } = cli.command {
        let path = cli
            .config
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        return commands::init::run(&path, force);
    }

    // Load configuration
    let config = Config::load_or_default(cli.config.as_ref())?;

    match cli.command {
        Commands::Scan {
            dir,
            extensions,
            exclude,
            output,
            raw,
        } => commands::scan::run(&config, dir, extensions, exclude, output, raw)?,
        Commands::Check {
            dir,
            output,
            apply,
            yes,
        } => commands::check::run(&config, dir, output, apply, yes)?,
        Commands::Update {
            dir,
            dry_run,
            skip_translate,
            skip_upload,
            tag,
            project,
            yes,
        } => commands::update::run(
            &config,
            UpdateArgs {
                dir,
                dry_run,
                skip_translate,
                skip_upload,
                tag,
                project,
                yes,
            },
        )?,
        Commands::Translate {
            texts,
            file,
            output,
        } => commands::translate::run(&config, texts, file, output)?,
        Commands::Upload { file, project, tag } => {
            commands::upload::run(&config, &file, project, tag)?
        }
        Commands::Projects => commands::projects::run(&config)?,
        Commands::Init { .. } => {}
    }

    Ok(())
}
