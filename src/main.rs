mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, SelectCliConfig};
use corrpairs::logging::init_logging;
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from the .env file
    dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.verbose, cli.json_logs)?;

    match cli.command {
        Commands::Select {
            history,
            symbols,
            config,
            lookback,
            resolution,
            min_correlation,
            ratio_threshold,
            metrics,
        } => {
            commands::run_select(SelectCliConfig {
                history_path: history,
                symbols,
                config_path: config,
                lookback,
                resolution,
                min_correlation,
                ratio_threshold,
                print_metrics: metrics,
            })
            .await?;
        }
    }

    Ok(())
}
