use anyhow::bail;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::NodesArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `arb nodes`.
pub async fn handle(args: &NodesArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let nodes = ctx.service.get_nodes(&args.topic).await?;
    if nodes.is_empty() {
        bail!("topic '{}' has no nodes", args.topic);
    }
    output(&nodes, flags.format)
}
