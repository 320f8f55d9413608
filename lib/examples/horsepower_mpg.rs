//! Trains on the cars dataset and prints the plot points as JSON.
//!
//! ```text
//! cargo run --example horsepower_mpg
//! MPG_DATASET_URL=http://localhost:8000/cars.json cargo run --example horsepower_mpg
//! ```

use std::error::Error;

use horsepower_mpg::backend::CpuBackend;
use horsepower_mpg::config::PipelineConfig;
use horsepower_mpg::logging::install_logger;
use horsepower_mpg::pipeline::Pipeline;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    install_logger(false)?;

    let mut config = PipelineConfig::default();
    if let Ok(url) = std::env::var("MPG_DATASET_URL") {
        config.dataset_url = url;
    }
    config.training.verbose = true;

    let pipeline = Pipeline::from_config(config)?;
    let report = pipeline.run_with_report::<CpuBackend>().await?;

    tracing::info!(
        bounds = ?report.bounds,
        final_loss = ?report.history.final_loss(),
        "done"
    );
    println!("{}", serde_json::to_string_pretty(&report.predictions)?);
    Ok(())
}
