use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::DeleteArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct DeleteResponse<'a> {
    topic: &'a str,
    deleted: u64,
}

/// Handle `arb delete`.
pub async fn handle(args: &DeleteArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let deleted = ctx.service.delete_topic(&args.topic).await?;
    if deleted == 0 {
        tracing::warn!(topic = %args.topic, "topic had no nodes");
    }
    output(
        &DeleteResponse {
            topic: &args.topic,
            deleted,
        },
        flags.format,
    )
}
