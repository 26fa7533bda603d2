use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use consecutive_core::{Scenario, Trace};
use consecutive_tui::app::{describe, state_name};

pub async fn run(path: &Path, json: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let scenario = Scenario::from_toml(&content)?;
    info!(
        regions = scenario.regions.len(),
        steps = scenario.steps.len(),
        "running scenario {}",
        path.display()
    );

    let trace = scenario.run()?;
    if json {
        println!("{}", trace.to_json()?);
    } else {
        print_trace(&trace);
    }
    Ok(())
}

fn print_trace(trace: &Trace) {
    for step in &trace.steps {
        println!("[{:>3}] {:<16} t={}ms", step.index, step.op, step.at_ms);
        for event in &step.events {
            println!("        {}", describe(event));
        }
    }

    let last = &trace.final_state;
    println!();
    println!(
        "Final: offset {} | container {}/{} | {}",
        last.offset,
        last.container_offset,
        last.scroll_range,
        state_name(last.state)
    );
    let visible = |id: Option<consecutive_core::RegionId>| {
        id.map_or("-".to_string(), |id| id.to_string())
    };
    println!(
        "  visible {} .. {} | pinned {:?}",
        visible(last.first_visible),
        visible(last.last_visible),
        last.pinned.iter().map(ToString::to_string).collect::<Vec<_>>()
    );
    for region in &last.regions {
        let pinned = if region.pinned { " [pinned]" } else { "" };
        println!(
            "  {:<5} top {:>6}  height {:>5}  screen {:>6}  internal {:>5}{}",
            region.id.to_string(),
            region.top,
            region.height,
            region.screen_top,
            region.internal_offset,
            pinned
        );
    }
}
