// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigDocument;
use crate::discord::utils::components::{button, button_row};
use crate::discord::utils::responses::ephemeral_message;
use crate::discord::utils::users::{display_name, interaction_user};
use crate::moderation::{ModerationAction, PlayerHistory, history_for_identifier, load_moderation_log};
use crate::pager::ContentBlock;
use chrono::Local;
use miette::IntoDiagnostic;
use std::sync::Arc;
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::channel::message::Embed;
use twilight_model::channel::message::component::{ButtonStyle, Component};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, UserMarker};
use twilight_util::builder::command::CommandBuilder;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder};
use twilight_validate::embed::EmbedValidationError;

const DM_FAILED: &str = "I couldn't send you a DM. Please make sure you have DMs enabled for this server.";

pub fn command_definition() -> Command {
	CommandBuilder::new(
		"checkhistory",
		"Checks your own history of bans, warns, and kicks",
		CommandType::ChatInput,
	)
	.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: Arc<ConfigDocument>,
) -> miette::Result<()> {
	let user = interaction_user(interaction)?;
	let user_id = user.id;
	let user_display = display_name(user).to_string();

	let identifier = format!("discord:{}", user_id);
	let log = load_moderation_log(&config.moderation_log).await?;
	let history = history_for_identifier(&log, &identifier);

	let interaction_client = http_client.interaction(application_id);

	let dm_channel = match http_client.create_private_channel(user_id).await {
		Ok(response) => response.model().await.into_diagnostic()?,
		Err(_) => {
			interaction_client
				.create_response(interaction.id, &interaction.token, &ephemeral_message(DM_FAILED))
				.await
				.into_diagnostic()?;
			return Ok(());
		}
	};

	if history.total() == 0 {
		let dm_result = http_client
			.create_message(dm_channel.id)
			.content("You have no ban, warn, or kick records.")
			.await;
		let reply = match dm_result {
			Ok(_) => "No history records found. A message has been sent to your DMs.",
			Err(_) => DM_FAILED,
		};
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(reply))
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	let embed = overview_embed(&history, &user_display, config.embed_color).into_diagnostic()?;
	let buttons = overview_buttons(&history, user_id);
	let dm_result = http_client
		.create_message(dm_channel.id)
		.embeds(&[embed])
		.components(&buttons)
		.await;
	let reply = match dm_result {
		Ok(_) => "Your history records have been sent to your DMs!",
		Err(_) => DM_FAILED,
	};
	interaction_client
		.create_response(interaction.id, &interaction.token, &ephemeral_message(reply))
		.await
		.into_diagnostic()?;

	Ok(())
}

pub(in crate::discord) fn overview_embed(
	history: &PlayerHistory,
	requester: &str,
	color: u32,
) -> Result<Embed, EmbedValidationError> {
	EmbedBuilder::new()
		.title("Your Player History")
		.color(color)
		.description("Here's a summary of your history records.")
		.field(EmbedFieldBuilder::new("Bans", format!("{} record(s)", history.bans.len())).inline())
		.field(EmbedFieldBuilder::new("Warnings", format!("{} record(s)", history.warns.len())).inline())
		.field(EmbedFieldBuilder::new("Kicks", format!("{} record(s)", history.kicks.len())).inline())
		.footer(EmbedFooterBuilder::new(format!("Requested by {}", requester)))
		.validate()
		.map(|builder| builder.build())
}

pub(in crate::discord) fn overview_buttons(history: &PlayerHistory, owner: Id<UserMarker>) -> Vec<Component> {
	let mut buttons = Vec::new();
	if !history.warns.is_empty() {
		buttons.push(button(
			format!("history/{}/warns", owner),
			format!("View Warnings ({})", history.warns.len()),
			ButtonStyle::Primary,
			false,
		));
	}
	if !history.bans.is_empty() {
		buttons.push(button(
			format!("history/{}/bans", owner),
			format!("View Bans ({})", history.bans.len()),
			ButtonStyle::Danger,
			false,
		));
	}
	if !history.kicks.is_empty() {
		buttons.push(button(
			format!("history/{}/kicks", owner),
			format!("View Kicks ({})", history.kicks.len()),
			ButtonStyle::Secondary,
			false,
		));
	}
	if buttons.is_empty() {
		return Vec::new();
	}
	vec![button_row(buttons)]
}

/// Two blocks per record: the record summary and the recorded reason.
pub(in crate::discord) fn record_blocks(records: &[ModerationAction], kind_label: &str) -> Vec<ContentBlock> {
	let now = Local::now();
	let mut blocks = Vec::new();
	for record in records {
		let mut summary = format!(
			"```diff\n+ Action ID: {}\n+ By: {}\n+ When: {}\n",
			record.id,
			record.author.as_deref().unwrap_or("Unknown Admin"),
			record.timestamp_display(),
		);
		if kind_label == "Ban" {
			summary.push_str(&format!("+ Expiration: {}\n", record.expiry_display(now)));
		}
		summary.push_str(&format!(
			"+ Player: {}\n+ Revoked: {}\n```",
			record.player_name.as_deref().unwrap_or("Unknown"),
			if record.is_revoked() { "Yes" } else { "No" },
		));
		blocks.push(ContentBlock::new(format!("{} Record: {}", kind_label, record.id), summary));
		blocks.push(ContentBlock::new(
			"Reason",
			format!("```{}```", record.reason.as_deref().unwrap_or("No reason provided")),
		));
	}
	blocks
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::moderation::ModerationLog;

	fn history() -> PlayerHistory {
		let log: ModerationLog = serde_json::from_str(
			r#"{"actions": [
				{"id": "B1", "type": "ban", "author": "admin", "reason": "RDM", "timestamp": 100,
				 "expiration": false, "playerName": "Joe", "ids": ["discord:42"]},
				{"id": "W1", "type": "warn", "timestamp": 200, "playerName": "Joe", "ids": ["discord:42"]}
			]}"#,
		)
		.unwrap();
		history_for_identifier(&log, "discord:42")
	}

	#[test]
	fn overview_buttons_skip_empty_record_types() {
		let rows = overview_buttons(&history(), Id::new(42));
		assert_eq!(rows.len(), 1);
		let Component::ActionRow(row) = &rows[0] else {
			panic!("expected action row");
		};
		// Warns and bans exist, kicks don't.
		assert_eq!(row.components.len(), 2);
		let Component::Button(warn_button) = &row.components[0] else {
			panic!("expected button");
		};
		assert_eq!(warn_button.custom_id.as_deref(), Some("history/42/warns"));
	}

	#[test]
	fn ban_records_include_expiration_line() {
		let history = history();
		let blocks = record_blocks(&history.bans, "Ban");
		assert_eq!(blocks.len(), 2);
		assert!(blocks[0].label.starts_with("Ban Record: B1"));
		assert!(blocks[0].body.contains("+ Expiration: Permanent"));
		assert!(blocks[1].body.contains("RDM"));

		let warn_blocks = record_blocks(&history.warns, "Warning");
		assert!(!warn_blocks[0].body.contains("Expiration"));
		assert!(warn_blocks[1].body.contains("No reason provided"));
	}
}
