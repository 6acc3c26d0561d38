use std::io::{BufRead, Write};

use anyhow::{Context, bail};
use arbor_core::session::SessionState;
use arbor_engine::{FlowEngine, NodeView, Step};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::WalkArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct WalkResponse {
    /// Node ids shown, starting with the topic's start node.
    visited: Vec<String>,
    #[serde(flatten)]
    step: Step,
}

/// One line typed at the interactive prompt.
#[derive(Debug, PartialEq, Eq)]
enum WalkInput {
    Choose(String),
    Reset,
    Quit,
    Unknown,
}

/// Handle `arb walk`.
pub async fn handle(args: &WalkArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let engine = FlowEngine::new(&ctx.service, ctx.user()?);
    let start = engine.select_topic(&args.topic).await;
    if start.state == SessionState::NoTopicSelected {
        bail!(
            "{}",
            start
                .notice
                .unwrap_or_else(|| format!("topic '{}' has no nodes", args.topic))
        );
    }

    if args.choose.is_empty() {
        return interactive(&engine, start).await;
    }

    let response = scripted(&engine, start, &args.choose).await?;
    output(&response, flags.format)
}

/// Follow `choices` from `start`, stopping at the first error state.
async fn scripted(
    engine: &FlowEngine<'_>,
    start: Step,
    choices: &[String],
) -> anyhow::Result<WalkResponse> {
    let mut visited = Vec::with_capacity(choices.len() + 1);
    visited.extend(start.view.as_ref().map(|view| view.node_id.clone()));
    let mut step = start;
    for label in choices {
        if let Some(view) = &step.view
            && !view.options.contains(label)
        {
            bail!("node '{}' has no option '{label}'", view.node_id);
        }
        step = engine.choose(&step.state, label).await;
        if let Some(notice) = &step.notice {
            bail!("{notice}");
        }
        if step.state.last_error().is_some() {
            break;
        }
        visited.extend(step.view.as_ref().map(|view| view.node_id.clone()));
    }
    Ok(WalkResponse { visited, step })
}

async fn interactive(engine: &FlowEngine<'_>, mut step: Step) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if let Some(notice) = &step.notice {
            eprintln!("{notice}");
        }
        match &step.view {
            Some(view) => print!("{}", render_view(view)),
            None => print!("(nothing to show; r to restart, q to quit)\n> "),
        }
        std::io::stdout().flush().context("failed to write prompt")?;

        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line.context("failed to read from stdin")?;

        step = match parse_input(&line, step.view.as_ref()) {
            WalkInput::Quit => return Ok(()),
            WalkInput::Reset => engine.reset(&step.state).await,
            WalkInput::Choose(label) => engine.choose(&step.state, &label).await,
            WalkInput::Unknown => {
                eprintln!("unknown option '{}'", line.trim());
                continue;
            }
        };
    }
}

fn parse_input(line: &str, view: Option<&NodeView>) -> WalkInput {
    let input = line.trim();
    match input.to_ascii_lowercase().as_str() {
        "q" | "quit" => return WalkInput::Quit,
        "r" | "reset" => return WalkInput::Reset,
        _ => {}
    }
    let options = view.map_or(&[][..], |view| view.options.as_slice());

    if let Ok(number) = input.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(|index| options.get(index))
            .map_or(WalkInput::Unknown, |label| WalkInput::Choose(label.clone()));
    }

    options
        .iter()
        .find(|label| label.eq_ignore_ascii_case(input))
        .map_or(WalkInput::Unknown, |label| WalkInput::Choose(label.clone()))
}

fn render_view(view: &NodeView) -> String {
    let mut out = format!("\n[{}] {}\n", view.topic, view.question);
    if let Some(error) = &view.error {
        out.push_str(&format!("  ! {error}\n"));
    }
    if view.terminal {
        out.push_str("  (end of guide; r to restart, q to quit)\n");
    }
    for (number, label) in (1..).zip(&view.options) {
        out.push_str(&format!("  {number}) {label}\n"));
    }
    out.push_str("> ");
    out
}
