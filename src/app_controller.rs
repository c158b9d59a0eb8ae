use anyhow::{Context, Result};
use log::{info, warn};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::{Config, TranslationProvider};
use crate::document::Document;
use crate::file_utils::FileManager;
use crate::providers::mock::MockTranslatorFactory;
use crate::providers::ollama::OllamaTranslatorFactory;
use crate::providers::{Capabilities, TranslatorFactory};
use crate::settings::SettingsStore;
use crate::status::{LogStatusReporter, ProgressBarStatusReporter, StatusReporter};
use crate::translation::{PassOutcome, TranslationEngine, TriggerMessage};

// @module: Application controller for page translation

/// What the command-line workflow should do with a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Workflow {
    /// Deliver these trigger messages in order
    Actions(Vec<TriggerMessage>),
    /// Run the auto-translate flow for a page loaded from this URL
    PageLoad(String),
}

/// Main application controller for page translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    /// The configuration the controller runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the capabilities for the configured provider
    pub fn capabilities(&self) -> Result<Capabilities> {
        let factory: Arc<dyn TranslatorFactory> = match self.config.translation.provider {
            TranslationProvider::Ollama => Arc::new(
                OllamaTranslatorFactory::new(&self.config.translation.ollama)
                    .context("Failed to set up the Ollama provider")?,
            ),
            TranslationProvider::Mock => Arc::new(MockTranslatorFactory::working()),
        };
        Ok(Capabilities::with_translator(factory))
    }

    /// Translate the page at `input_file` and write the result.
    ///
    /// Returns the path written and the outcome of the last trigger.
    pub async fn run(
        &self,
        input_file: &Path,
        output_file: Option<PathBuf>,
        workflow: Workflow,
    ) -> Result<(PathBuf, Option<PassOutcome>)> {
        let start_time = std::time::Instant::now();

        if !FileManager::is_html_file(input_file) {
            warn!("Input does not have an HTML extension, parsing it as HTML anyway: {:?}", input_file);
        }
        let html = FileManager::read_to_string(input_file)?;

        // A spinner only makes sense on a terminal; redirected output gets log lines
        let spinner = std::io::stderr().is_terminal().then(ProgressBarStatusReporter::new);
        let reporter: Box<dyn StatusReporter> = match &spinner {
            Some(spinner) => Box::new(spinner.clone()),
            None => Box::new(LogStatusReporter),
        };

        let (document, outcome) = self.process(Document::parse(&html), workflow, reporter).await?;
        if let Some(spinner) = spinner {
            spinner.finish();
        }

        let output_path = output_file
            .unwrap_or_else(|| FileManager::translated_output_path(input_file, &self.config.settings.normalized_target()));
        let rendered = document.to_html().context("Failed to serialize the translated page")?;
        FileManager::write_to_file(&output_path, &rendered)?;

        info!(
            "Wrote {:?} in {:.1}s",
            output_path,
            start_time.elapsed().as_secs_f64()
        );
        Ok((output_path, outcome))
    }

    /// Run `workflow` against `document` and hand the document back
    pub async fn process(
        &self,
        document: Document,
        workflow: Workflow,
        reporter: Box<dyn StatusReporter>,
    ) -> Result<(Document, Option<PassOutcome>)> {
        let engine = TranslationEngine::new(
            document,
            self.capabilities()?,
            SettingsStore::new(self.config.settings.clone()),
            self.config.engine.clone(),
            reporter,
        );

        let mut last = None;
        match workflow {
            Workflow::Actions(actions) => {
                for action in actions {
                    let outcome = engine.dispatch(action).await?;
                    log_outcome(&outcome);
                    last = Some(outcome);
                }
            }
            Workflow::PageLoad(url) => {
                let outcome = engine.on_page_load(&url).await?;
                log_outcome(&outcome);
                last = Some(outcome);
            }
        }

        Ok((engine.into_document(), last))
    }
}

fn log_outcome(outcome: &PassOutcome) {
    match outcome {
        PassOutcome::Completed(summary) if summary.failed > 0 => warn!(
            "{} text nodes translated, {} could not be translated",
            summary.translated + summary.cached,
            summary.failed
        ),
        PassOutcome::Completed(summary) => info!("{} text nodes translated", summary.translated + summary.cached),
        PassOutcome::Restored(count) => info!("{} text nodes restored", count),
        PassOutcome::Skipped(reason) => info!("Nothing to do: {}", reason),
    }
}
