use anyhow::Result;
use clap::Parser;

use foundry::checkpoint::{ApprovalHandler, AutoApproval, InteractiveApproval, PresetEdits};
use foundry::cli::{Cli, Commands};
use foundry::config::FoundryFileConfig;
use foundry::handlers::{self, CommandContext};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    foundry_common::init_tracing("foundry", cli.verbose)?;

    let file_config = FoundryFileConfig::load()?;
    let ctx = CommandContext::new(cli.api_url, cli.plain, file_config);

    match cli.command {
        Commands::Generate {
            intent,
            query,
            auto_approve,
            edits_file,
        } => {
            let approval: Box<dyn ApprovalHandler> = match (auto_approve, edits_file) {
                (_, Some(path)) => {
                    Box::new(PresetEdits(handlers::read_edits_file(&path)?))
                }
                (true, None) => Box::new(AutoApproval),
                (false, None) => Box::new(InteractiveApproval),
            };
            handlers::run_generate(&ctx, &intent, query.as_deref(), approval.as_ref()).await?;
        }
        Commands::Approve {
            thread_id,
            edits_file,
        } => {
            handlers::run_approve(&ctx, &thread_id, edits_file.as_deref()).await?;
        }
        Commands::Show { thread_id } => {
            handlers::run_show(&ctx, &thread_id).await?;
        }
        Commands::List { limit } => {
            handlers::run_list(&ctx, limit).await?;
        }
        Commands::Health => {
            handlers::run_health(&ctx).await?;
        }
    }

    Ok(())
}
