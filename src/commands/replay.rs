//! Replay a recorded event log through the pipeline

use colored::*;
use eyre::{Context, Result};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;

use netout::host::{Host, replay};
use netout::{Config, NetOut};

pub fn run(input: &Path, config: &Config) -> Result<()> {
    let netout = Arc::new(NetOut::new(config));

    let mut host = Host::new();
    netout.register(host.events_mut());
    host.init();

    let summary = if input == Path::new("-") {
        replay(io::stdin().lock(), &host)?
    } else {
        let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
        replay(BufReader::new(file), &host).with_context(|| format!("Failed to replay {}", input.display()))?
    };

    let stats = netout.stats();
    log::info!(
        "Replay finished: {} calls applied, {} rejected; {:?}",
        summary.applied,
        summary.rejected,
        stats
    );

    eprintln!(
        "{} {} calls, {} snapshots, {} matched, {} delivered, {} failed ({} sink)",
        "✓".green(),
        summary.applied,
        stats.snapshots,
        stats.matched.to_string().cyan(),
        stats.delivered.to_string().green(),
        if stats.failed > 0 { stats.failed.to_string().red() } else { stats.failed.to_string().normal() },
        netout.sink().name()
    );
    if summary.rejected > 0 {
        eprintln!("{} {} calls rejected by the host", "⚠".yellow(), summary.rejected);
    }

    Ok(())
}
