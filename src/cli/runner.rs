//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt};
use crate::pipeline::Pipeline;
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.build_config()?;
        match &self.cli.command {
            Commands::Load { file, no_summary } => self.load(config, file, *no_summary),
            Commands::Inspect { file } => self.inspect(config, file),
            Commands::Serve { port } => {
                let config = crate::cli::ServerConfig::new(config);
                crate::cli::serve(config, *port).await
            }
        }
    }

    /// Config file (or defaults) with command-line overrides applied
    fn build_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.cli.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(database) = &self.cli.database {
            config = config.with_database(database);
        }
        if let Some(table) = &self.cli.table {
            config = config.with_table(table);
        }
        config.validate()?;
        Ok(config)
    }

    /// Run the full pipeline
    fn load(&self, config: PipelineConfig, file: &Path, no_summary: bool) -> Result<()> {
        let pipeline = Pipeline::new(config)?;
        let outcome = pipeline.run(file)?;

        println!("Data loaded successfully!");
        println!("Number of records loaded: {}", outcome.load.rows_loaded);
        if let Some(sample) = &outcome.load.sample {
            println!();
            println!("Sample record from database:");
            println!(
                "{}",
                serde_json::to_string_pretty(sample).context("Failed to render sample record")?
            );
        }

        if !no_summary {
            println!();
            print!("{}", pipeline.summary(&outcome.batch));
        }

        outcome.warehouse.close()
    }

    /// Transform without loading
    fn inspect(&self, config: PipelineConfig, file: &Path) -> Result<()> {
        let pipeline = Pipeline::new(config)?;
        let batch = pipeline.extract_and_transform(file)?;

        println!("Columns:");
        for column in &batch.columns {
            println!("  {:<24} {:?}", column.name, column.column_type);
        }
        println!("Records: {}", batch.len());
        for row in 0..batch.len().min(5) {
            if let Some(record) = batch.record_json(row) {
                println!("{}", serde_json::Value::Object(record));
            }
        }
        println!();
        print!("{}", pipeline.summary(&batch));
        Ok(())
    }
}
