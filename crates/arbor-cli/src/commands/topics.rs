use arbor_engine::topic_summaries;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `arb topics`.
///
/// A store that cannot be read lists no topics; the cause is logged.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&topic_summaries(&ctx.service).await, flags.format)
}
