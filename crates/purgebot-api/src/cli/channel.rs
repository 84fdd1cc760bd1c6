//! Channel registration subcommands: register, unregister, info, list.
//!
//! Replies use the same wording the bot sends in chat.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use purgebot_core::service::retention::policy_reply;
use purgebot_types::channel::ChannelId;
use purgebot_types::error::CommandError;

use crate::cli::register_command_text;
use crate::state::AppState;

/// Register a channel or update its max age.
pub async fn register(state: &AppState, channel: ChannelId, duration: &[String], json: bool) -> Result<()> {
    let text = register_command_text(duration);
    let registration = match state.retention_service.register_or_update(channel, &text).await {
        Ok(registration) => registration,
        Err(e) => return Err(command_failed(Some(channel), e, json)),
    };

    if json {
        let result = serde_json::json!({
            "channel_id": channel,
            "max_age_minutes": registration.max_age().minutes(),
            "max_age": registration.max_age().to_string(),
            "dry_run": state.retention_service.dry_run(),
            "reply": registration.reply(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!("  {} {}", marker(state), registration.reply());
        println!();
    }

    Ok(())
}

/// Remove a channel from auto purging.
pub async fn unregister(state: &AppState, channel: ChannelId, json: bool) -> Result<()> {
    let unregistration = match state.retention_service.unregister(channel).await {
        Ok(unregistration) => unregistration,
        Err(e) => return Err(command_failed(Some(channel), e, json)),
    };

    if json {
        let result = serde_json::json!({
            "channel_id": channel,
            "dry_run": state.retention_service.dry_run(),
            "reply": unregistration.reply(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!("  {} {}", marker(state), unregistration.reply());
        println!();
    }

    Ok(())
}

/// Show the policy of one channel.
pub async fn info(state: &AppState, channel: ChannelId, json: bool) -> Result<()> {
    let policy = match state.retention_service.query_policy(channel).await {
        Ok(policy) => policy,
        Err(e) => return Err(command_failed(Some(channel), e, json)),
    };

    if json {
        let result = serde_json::json!({
            "channel_id": channel,
            "policy": policy,
            "reply": policy_reply(policy.as_ref()),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    let symbol = if policy.is_some() {
        style("ok").green()
    } else {
        style("i").blue().bold()
    };
    println!(
        "  {} {}",
        symbol,
        policy_reply(policy.as_ref())
    );
    if let Some(updated_at) = policy.as_ref().and_then(|p| p.updated_at) {
        println!(
            "     {}",
            style(format!("last changed {}", updated_at.format("%Y-%m-%d %H:%M UTC"))).dim()
        );
    }
    println!();

    Ok(())
}

/// List every registered channel.
pub async fn list(state: &AppState, json: bool) -> Result<()> {
    let policies = match state.retention_service.list_policies().await {
        Ok(policies) => policies,
        Err(e) => return Err(command_failed(None, e, json)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&policies)?);
        return Ok(());
    }

    if policies.is_empty() {
        println!();
        println!("  {} No channels are registered for auto purging.", style("i").blue().bold());
        println!("     Register one with: purgebot register <channel> [5d|12h|10m]");
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Channel").fg(Color::White),
        Cell::new("Max Age").fg(Color::White),
        Cell::new("Registered").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    let date = |dt: Option<chrono::DateTime<chrono::Utc>>| {
        dt.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    for policy in &policies {
        table.add_row(vec![
            Cell::new(policy.channel_id).fg(Color::Cyan),
            Cell::new(policy.max_age),
            Cell::new(date(policy.registered_at)).fg(Color::DarkGrey),
            Cell::new(date(policy.updated_at)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("  {} channel(s) registered for auto purging", policies.len());
    println!();
    println!("{table}");
    println!();

    Ok(())
}

fn marker(state: &AppState) -> console::StyledObject<&'static str> {
    if state.retention_service.dry_run() {
        style("~").yellow().bold()
    } else {
        style("ok").green()
    }
}

/// Turn a command failure into the reply a chat user would see.
/// Storage details were already logged by the service.
fn command_failed(channel: Option<ChannelId>, err: CommandError, json: bool) -> anyhow::Error {
    tracing::debug!(channel = ?channel, error = %err, "command failed");
    if json {
        if let Ok(text) = serde_json::to_string_pretty(&error_json(channel, &err)) {
            println!("{text}");
        }
    }
    anyhow::anyhow!(err.user_message())
}

fn error_json(channel: Option<ChannelId>, err: &CommandError) -> serde_json::Value {
    match channel {
        Some(channel) => serde_json::json!({
            "channel_id": channel,
            "error": err.user_message(),
        }),
        None => serde_json::json!({ "error": err.user_message() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use purgebot_types::error::{ParseMaxAgeError, RepositoryError};

    #[test]
    fn test_error_json_for_channel_command() {
        let err = CommandError::from(ParseMaxAgeError::UnknownUnit('x'));
        let value = error_json(Some(ChannelId(42)), &err);
        assert_eq!(value["channel_id"], 42);
        assert!(value["error"].as_str().unwrap().contains("time format"));
    }

    #[test]
    fn test_error_json_for_list_hides_storage_details() {
        let err = CommandError::from(RepositoryError::Query("disk I/O error".to_string()));
        let value = error_json(None, &err);
        assert!(value.get("channel_id").is_none());
        assert_eq!(value["error"], "sorry, something went wrong, please try again");
    }

    #[test]
    fn test_command_failed_carries_user_message() {
        let err = command_failed(None, CommandError::from(RepositoryError::Connection), false);
        assert_eq!(err.to_string(), "sorry, something went wrong, please try again");
    }
}
