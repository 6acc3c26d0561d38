use arbor_engine::FlowEngine;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SearchArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `arb search`.
pub async fn handle(args: &SearchArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let engine = FlowEngine::new(&ctx.service, ctx.user()?);
    let hits = engine.search(&args.query, ctx.limit(flags)).await;
    output(&hits, flags.format)
}
