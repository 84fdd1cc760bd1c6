//! `run` and `tick`: drive the retention scheduler against Discord.

use std::sync::Arc;

use anyhow::Result;
use console::style;
use tokio_util::sync::CancellationToken;

use purgebot_core::retention::report::{PurgeOutcome, TickReport};
use purgebot_core::retention::scheduler::SchedulerSettings;
use purgebot_types::config::RetentionConfig;

use crate::state::AppState;

/// Scheduler settings from config, with CLI overrides applied.
fn scheduler_settings(config: &RetentionConfig, dry_run: bool, interval_secs: Option<u64>) -> SchedulerSettings {
    let mut config = config.clone();
    config.dry_run |= dry_run;
    if let Some(secs) = interval_secs {
        config.tick_interval_secs = secs;
    }
    SchedulerSettings::from_config(&config)
}

/// Run the purge loop until Ctrl+C or SIGTERM.
pub async fn run(state: &AppState, dry_run: bool, interval_secs: Option<u64>, quiet: bool) -> Result<()> {
    let settings = scheduler_settings(&state.config, dry_run, interval_secs);
    let interval = settings.interval;
    let dry_run = settings.dry_run;
    let scheduler = Arc::new(state.retention_scheduler(settings).await?);

    if !quiet {
        println!();
        println!(
            "  {} Purging registered channels every {}s{}",
            style("⚡").bold(),
            interval.as_secs(),
            if dry_run {
                style(" (dry run)").yellow().to_string()
            } else {
                String::new()
            }
        );
        println!(
            "  {}",
            style(format!("Registry: {}", state.data_dir.join("purgebot.db").display())).dim()
        );
        println!("  {}", style("Press Ctrl+C to stop").dim());
        println!();
    }

    let cancel = CancellationToken::new();
    let handle = scheduler.spawn(cancel.clone());

    crate::shutdown_signal().await;
    cancel.cancel();
    handle.await?;

    state.db_pool.close().await;
    if !quiet {
        println!("\n  Scheduler stopped.");
    }
    Ok(())
}

/// Run one purge cycle and print what happened to each channel.
pub async fn tick(state: &AppState, dry_run: bool, json: bool) -> Result<()> {
    let settings = scheduler_settings(&state.config, dry_run, None);
    let scheduler = state.retention_scheduler(settings).await?;

    let report = scheduler.run_tick().await;
    report.log();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    match report {
        TickReport::RegistryUnavailable { error, .. } => {
            anyhow::bail!("channel registry unavailable: {error}")
        }
        _ => Ok(()),
    }
}

fn print_report(report: &TickReport) {
    println!();
    match report {
        TickReport::Completed { outcomes, .. } if outcomes.is_empty() => {
            println!("  {} No channels are registered for auto purging.", style("i").blue().bold());
        }
        TickReport::Completed { outcomes, .. } => {
            for outcome in outcomes {
                let cutoff = outcome.cutoff.format("%Y-%m-%d %H:%M UTC");
                match &outcome.outcome {
                    PurgeOutcome::Purged { deleted } => println!(
                        "  {} {}: deleted {} message(s) sent before {}",
                        style("ok").green(),
                        style(outcome.channel_id).cyan(),
                        deleted,
                        cutoff
                    ),
                    PurgeOutcome::DryRun => println!(
                        "  {} {}: would delete messages sent before {}",
                        style("~").yellow().bold(),
                        style(outcome.channel_id).cyan(),
                        cutoff
                    ),
                    PurgeOutcome::Failed { error } => println!(
                        "  {} {}: {}",
                        style("x").red().bold(),
                        style(outcome.channel_id).cyan(),
                        error
                    ),
                }
            }
            println!();
            println!(
                "  {} deleted, {} failed",
                report.deleted(),
                report.failures()
            );
        }
        TickReport::RegistryUnavailable { error, .. } => {
            println!("  {} Channel registry unavailable: {}", style("x").red().bold(), error);
        }
        TickReport::Busy => {
            println!("  {} A purge cycle is already running.", style("i").blue().bold());
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn cli_flags_override_config() {
        let config = RetentionConfig::default();

        let settings = scheduler_settings(&config, true, Some(15));
        assert!(settings.dry_run);
        assert_eq!(settings.interval, Duration::from_secs(15));
    }

    #[test]
    fn dry_run_flag_cannot_disable_configured_safe_mode() {
        let config = RetentionConfig {
            dry_run: true,
            tick_interval_secs: 120,
            ..RetentionConfig::default()
        };

        let settings = scheduler_settings(&config, false, None);
        assert!(settings.dry_run);
        assert_eq!(settings.interval, Duration::from_secs(120));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let settings = scheduler_settings(&RetentionConfig::default(), false, Some(0));
        assert_eq!(settings.interval, Duration::from_secs(1));
    }
}
