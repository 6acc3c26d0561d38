use anyhow::bail;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::LogsCommands;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ClearResponse {
    deleted: u64,
}

/// Handle `arb logs`.
pub async fn handle(action: &LogsCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        LogsCommands::List => {
            let entries = ctx.service.list_usage(ctx.limit(flags)).await?;
            output(&entries, flags.format)
        }
        LogsCommands::Clear { yes } => {
            if !yes {
                bail!("refusing to clear the usage log without --yes");
            }
            let deleted = ctx.service.clear_usage().await?;
            output(&ClearResponse { deleted }, flags.format)
        }
    }
}
