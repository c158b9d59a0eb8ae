// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use pagetrans::app_config::{self, Config, TranslationProvider};
use pagetrans::app_controller::{Controller, Workflow};
use pagetrans::TriggerMessage;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    Mock,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::Mock => TranslationProvider::Mock,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Trigger to deliver to the page
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAction {
    /// Translate, reusing cached translations
    Translate,
    /// Translate again, ignoring cached translations
    Force,
    /// Restore the original text
    Undo,
    /// Undo when translated, translate otherwise
    Toggle,
}

impl From<CliAction> for TriggerMessage {
    fn from(action: CliAction) -> Self {
        match action {
            CliAction::Translate => TriggerMessage::Translate { force: false },
            CliAction::Force => TriggerMessage::Translate { force: true },
            CliAction::Undo => TriggerMessage::Undo,
            CliAction::Toggle => TriggerMessage::Toggle,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate an HTML page in place (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for pagetrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// HTML page to translate
    #[arg(value_name = "INPUT_FILE")]
    input_file: PathBuf,

    /// Where to write the result (default: <name>.<target>.html next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Source language code, or 'auto'
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Triggers to deliver, in order
    #[arg(short, long = "action", value_enum)]
    actions: Vec<CliAction>,

    /// Run the page-load flow as if the page came from this URL
    #[arg(short, long, conflicts_with = "actions")]
    url: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// pagetrans - In-place HTML page translation
///
/// Translates the visible text of an HTML page while keeping its markup,
/// and restores the original text on undo.
#[derive(Parser, Debug)]
#[command(name = "pagetrans")]
#[command(version)]
#[command(about = "In-place HTML page translation")]
#[command(long_about = "pagetrans translates the visible text of an HTML page in place using an AI provider.

EXAMPLES:
    pagetrans page.html                          # Translate using default config
    pagetrans -t fr page.html                    # Translate into French
    pagetrans -p mock page.html                  # Dry run with the mock provider
    pagetrans -a translate -a undo page.html     # Translate, then restore
    pagetrans -u https://example.org page.html   # Run the auto-translate flow
    pagetrans completions bash > pagetrans.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// HTML page to translate
    #[arg(value_name = "INPUT_FILE")]
    input_file: Option<PathBuf>,

    /// Where to write the result (default: <name>.<target>.html next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Source language code, or 'auto'
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Triggers to deliver, in order
    #[arg(short, long = "action", value_enum)]
    actions: Vec<CliAction>,

    /// Run the page-load flow as if the page came from this URL
    #[arg(short, long, conflicts_with = "actions")]
    url: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now().format("%H:%M:%S.%3f");
        let mut stderr = std::io::stderr();
        let _ = writeln!(
            stderr,
            "\x1B[{}m{} {:<5} {}\x1B[0m",
            Self::color_for_level(record.level()),
            now,
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "pagetrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            let input_file = cli
                .input_file
                .ok_or_else(|| anyhow!("INPUT_FILE is required when no subcommand is specified"))?;

            run_translate(TranslateArgs {
                input_file,
                output: cli.output,
                provider: cli.provider,
                source_language: cli.source_language,
                target_language: cli.target_language,
                actions: cli.actions,
                url: cli.url,
                config_path: cli.config_path,
                log_level: cli.log_level,
            })
            .await
        }
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(level) = &options.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)
        .with_context(|| format!("Failed to load configuration from {}", options.config_path))?;

    // Command line wins over the file
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(source_language) = &options.source_language {
        config.settings.source_language = source_language.clone();
    }
    if let Some(target_language) = &options.target_language {
        config.settings.target_language = target_language.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    let workflow = match options.url {
        Some(url) => Workflow::PageLoad(url),
        None if options.actions.is_empty() => Workflow::Actions(vec![TriggerMessage::Translate { force: false }]),
        None => Workflow::Actions(options.actions.into_iter().map(TriggerMessage::from).collect()),
    };

    info!(
        "Translating {:?} with {} ({} -> {})",
        options.input_file,
        config.translation.provider.display_name(),
        config.settings.source_language,
        config.settings.target_language
    );

    let controller = Controller::with_config(config)?;
    controller.run(&options.input_file, options.output, workflow).await?;

    Ok(())
}
