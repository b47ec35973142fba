//! Incremental sync command.

use std::sync::Arc;

use anyhow::Context;
use tokio::runtime::Runtime;

use super::{Settings, fmt_timestamp, open_db};
use crate::enrichment::MetadataResolver;
use crate::enrichment::spotify::SpotifyClient;
use crate::source::MalojaClient;
use crate::sync::{DurationPolicy, FailureKind, Reconciler, SyncOrchestrator, SyncReport};

/// Fetch new scrobbles from Maloja and store them
pub fn cmd_sync(rt: &Runtime, settings: &Settings) -> anyhow::Result<()> {
    let url = settings
        .maloja_url
        .as_deref()
        .context("No Maloja server configured (use --maloja-url or MALOJA_URL)")?;
    let source = MalojaClient::new(url)?.with_name(&settings.source_name);

    let catalog = SpotifyClient::new(
        settings.spotify_client_id.clone().unwrap_or_default(),
        settings.spotify_client_secret.clone().unwrap_or_default(),
    )
    .context("Spotify credentials required (SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET)")?;
    let reconciler = Reconciler::new(
        MetadataResolver::new(Arc::new(catalog)),
        settings.duration_policy,
    );

    rt.block_on(async {
        let pool = open_db(settings).await?;
        let orchestrator = SyncOrchestrator::new(pool, reconciler);

        println!("Syncing from {} ({})", source.name(), url);
        let report = orchestrator.run_sync(&source).await?;

        println!("Fetched:        {}", report.fetched);
        println!("  New:          {}", report.created);
        println!("  Already had:  {}", report.already_synced);
        println!("  Failed:       {}", report.failed);
        for (kind, count) in &report.failures {
            println!("    {:<20}{}", format!("{}:", kind), count);
        }
        if report.stale > 0 {
            println!("  Stale:        {}", report.stale);
        }
        if report.advanced() {
            println!(
                "Cursor: {} -> {}",
                fmt_timestamp(report.cursor_before),
                fmt_timestamp(report.cursor_after)
            );
        } else {
            println!("Cursor unchanged at {}", fmt_timestamp(report.cursor_after));
        }
        for line in failure_warnings(&report, settings.duration_policy) {
            eprintln!("warning: {}", line);
        }
        Ok(())
    })
}

/// Warnings for records this run did not store
fn failure_warnings(report: &SyncReport, policy: DurationPolicy) -> Vec<String> {
    let mut warnings = Vec::new();
    if report.failed == 0 {
        return warnings;
    }

    warnings.push(format!(
        "{} record(s) were not stored; run with RUST_LOG=scrobble_sync=debug for details",
        report.failed
    ));
    let unresolved = report
        .failures
        .get(&FailureKind::UnresolvedDuration)
        .copied()
        .unwrap_or(0);
    if unresolved > 0 && policy == DurationPolicy::Skip {
        warnings.push(format!(
            "{} play(s) were skipped because no track duration was found; once the cursor \
             moves past them they are not retried. Set unresolved_duration = \"placeholder\" \
             under [sync] to keep them",
            unresolved
        ));
    }
    warnings
}
