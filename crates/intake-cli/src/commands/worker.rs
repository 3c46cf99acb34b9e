//! Worker command implementation.

use super::open_store;
use crate::cli::WorkerArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use intake_llm::{LlmProvider, OllamaProvider};
use intake_sheet::CsvSheet;
use intake_worker::{ExtractionWorker, JobPipeline};
use std::sync::{Arc, Mutex};

/// Execute the worker command.
pub async fn execute_worker(args: WorkerArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut worker_config = config.worker.clone();
    if let Some(pool_size) = args.pool_size {
        worker_config.pool_size = pool_size;
    }

    let store = Arc::new(Mutex::new(open_store(config)?));

    let provider: Arc<dyn LlmProvider> = Arc::new(OllamaProvider::with_timeout(
        config.llm.endpoint.clone(),
        config.llm.model.clone(),
        config.llm.timeout(),
    )?);

    let sheet = Arc::new(CsvSheet::open(
        &config.sheet.template_path,
        &config.sheet.output_path,
        config.sheet.layout(),
    )?);

    let pipeline = JobPipeline::new(provider, sheet, &worker_config, &config.extractor())?;
    let mut worker = ExtractionWorker::new(store, pipeline, worker_config)?;

    eprintln!(
        "{}",
        formatter.info(&format!(
            "Worker using {} at {}, exporting to {}",
            config.llm.model,
            config.llm.endpoint,
            config.sheet.output_path.display()
        ))
    );

    let metrics = if args.once {
        worker.run_cycles(1).await?
    } else {
        worker.run().await?
    };

    eprintln!("{}", formatter.success("Worker stopped"));
    eprintln!("{}", metrics.summary());
    Ok(())
}
