use std::env;

use log::info;
use poisson_ring::{RunConfig, Termination, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => RunConfig::from_file(&path)?,
        None => RunConfig::default(),
    };

    let report = run(&config).await?;

    info!(iterations = report.iterations; "run finished");

    let line = report
        .field
        .iter()
        .map(|v| format!("{v:.4}"))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{line}");

    match report.termination {
        Termination::Converged => println!(
            "run completed in {} iterations with residual {:e}",
            report.iterations, report.global_residual
        ),
        Termination::IterationBudgetExhausted => println!(
            "run stopped after {} iterations without converging, residual {:e}",
            report.iterations, report.global_residual
        ),
    }

    Ok(())
}
