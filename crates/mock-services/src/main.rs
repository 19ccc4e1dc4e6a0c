//! Mock Services CLI
//!
//! 模拟服务的命令行入口点。

use clap::Parser;
use mock_services::cli::{Cli, CommandRunner, Commands};
use simplise_shared::observability::{ObservabilityConfig, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG 优先于命令行参数
    init_tracing(&ObservabilityConfig {
        log_level: cli.log_level.clone(),
        json_logs: cli.json_logs,
    })?;

    let runner = CommandRunner::new();

    match cli.command {
        Commands::Server { port } => {
            runner.run_server(port).await?;
        }
        Commands::Eval { rule, input } => {
            println!("{}", runner.run_eval(&rule, input.as_deref())?);
        }
    }

    Ok(())
}
