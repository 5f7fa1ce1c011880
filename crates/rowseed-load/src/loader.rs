use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use rowseed_core::SchemaCatalog;
use rowseed_generate::{
    GenerationOptions, RowGenerator, SeedSource, TableSettings, options_from_defaults,
    settings_from_target,
};
use rowseed_plan::ValidatedPlan;
use tracing::info;

use crate::connection::ConnectionFactory;
use crate::errors::{LoadError, Result};
use crate::handler::ConnectionHandler;
use crate::progress::{ProgressReporter, TracingReporter};
use crate::report::LoadReport;
use crate::script::ScriptWriter;
use crate::strategy::{LoadStrategy, strategy_for};
use crate::table_loader::TableLoader;

/// Run-wide loading switches.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Applied to every table session, e.g. `"2min"`.
    pub statement_timeout: Option<String>,
    /// SQL script mirroring the run.
    pub output: Option<PathBuf>,
    /// Send statements to the database.
    pub execute: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            statement_timeout: None,
            output: None,
            execute: true,
        }
    }
}

impl LoaderConfig {
    pub fn from_plan(plan: &ValidatedPlan) -> Self {
        Self {
            statement_timeout: plan.plan.defaults.statement_timeout().map(str::to_string),
            output: plan.output.clone(),
            execute: plan.plan.defaults.execute,
        }
    }
}

/// Table settings for every plan entry, in declaration order.
pub fn tables_from_plan(plan: &ValidatedPlan) -> Vec<TableSettings> {
    let defaults = &plan.plan.defaults;
    let seeds = SeedSource::from_option(defaults.seed).child("overrides");
    plan.plan
        .tables
        .iter()
        .map(|target| settings_from_target(target, defaults, &seeds))
        .collect()
}

/// Loads tables one after another, each with a fresh row generator.
pub struct Loader {
    catalog: Arc<dyn SchemaCatalog>,
    handler: ConnectionHandler,
    options: GenerationOptions,
    output: Option<PathBuf>,
    strategy: Box<dyn LoadStrategy>,
    reporter: Arc<dyn ProgressReporter>,
}

impl Loader {
    pub async fn new(
        catalog: Arc<dyn SchemaCatalog>,
        factory: Arc<dyn ConnectionFactory>,
        options: GenerationOptions,
        config: LoaderConfig,
    ) -> Result<Self> {
        if !config.execute && config.output.is_none() {
            return Err(LoadError::Config(
                "execute is disabled and no output script is configured".to_string(),
            ));
        }

        let handler = ConnectionHandler::new(factory, config.statement_timeout)
            .await?
            .with_execute(config.execute);
        let strategy = strategy_for(handler.supports_copy());

        Ok(Self {
            catalog,
            handler,
            options,
            output: config.output,
            strategy,
            reporter: Arc::new(TracingReporter),
        })
    }

    /// Loader configured from a validated plan.
    pub async fn from_plan(
        plan: &ValidatedPlan,
        catalog: Arc<dyn SchemaCatalog>,
        factory: Arc<dyn ConnectionFactory>,
    ) -> Result<Self> {
        let options = options_from_defaults(&plan.plan.defaults);
        Self::new(catalog, factory, options, LoaderConfig::from_plan(plan)).await
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Override the strategy chosen from the connection facts.
    pub fn with_strategy(mut self, strategy: Box<dyn LoadStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn handler(&self) -> &ConnectionHandler {
        &self.handler
    }

    /// Load `tables` in order. Tables loaded before a failure stay loaded.
    pub async fn load(&self, tables: Vec<TableSettings>) -> Result<LoadReport> {
        let started = Instant::now();
        let mut report = LoadReport {
            executed: self.handler.executes(),
            ..LoadReport::default()
        };

        let mut script = match &self.output {
            Some(path) => Some(ScriptWriter::create(path)?),
            None => None,
        };
        if let (Some(script), Some(command)) =
            (script.as_mut(), self.handler.timeout_set_command())
        {
            script.statement(&command)?;
        }

        let loaded = self
            .load_tables(tables, script.as_mut(), &mut report)
            .await;

        // The script is closed even when a table fails, so it mirrors what ran.
        let finished = match script {
            Some(script) => self.finish_script(script, &mut report),
            None => Ok(()),
        };
        loaded?;
        finished?;

        report.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            tables = report.tables.len(),
            rows_loaded = report.rows_loaded,
            rows_skipped = report.rows_skipped,
            duration_ms = report.duration_ms,
            "load completed"
        );
        Ok(report)
    }

    async fn load_tables(
        &self,
        tables: Vec<TableSettings>,
        mut script: Option<&mut ScriptWriter>,
        report: &mut LoadReport,
    ) -> Result<()> {
        let loader = TableLoader::new(
            &self.handler,
            self.strategy.as_ref(),
            self.reporter.as_ref(),
        );

        for settings in tables {
            let rows = settings.rows;
            let batch_size = settings.batch_size;
            let mut generator =
                RowGenerator::prepare(self.catalog.as_ref(), settings, &self.options).await?;
            let table = loader
                .load(&mut generator, rows, batch_size, script.as_deref_mut())
                .await?;
            report.push(table);
        }
        Ok(())
    }

    fn finish_script(&self, mut script: ScriptWriter, report: &mut LoadReport) -> Result<()> {
        if let Some(command) = self.handler.timeout_reset_command() {
            script.statement(&command)?;
        }
        report.data_files = script.data_files().to_vec();
        report.script = Some(script.finish()?);
        Ok(())
    }
}
