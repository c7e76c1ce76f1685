// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::utils::responses::{NOT_SESSION_OWNER, ephemeral_message, update_to_content};
use crate::discord::utils::users::interaction_user;
use chrono::{Duration, Utc};
use miette::{IntoDiagnostic, bail};
use twilight_http::client::Client;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, MessageMarker};
use twilight_util::snowflake::Snowflake;

pub async fn route_purge_interaction(
	interaction: &InteractionCreate,
	custom_id_path: &[String],
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<()> {
	let (Some(owner), Some(amount), Some(action)) =
		(custom_id_path.get(1), custom_id_path.get(2), custom_id_path.get(3))
	else {
		bail!("Invalid custom ID for purge confirmation (parts: {:?})", custom_id_path);
	};
	let Ok(owner_id) = owner.parse::<u64>() else {
		bail!("Invalid owner in purge custom ID (parts: {:?})", custom_id_path);
	};
	let Ok(amount) = amount.parse::<u16>() else {
		bail!("Invalid amount in purge custom ID (parts: {:?})", custom_id_path);
	};

	let invoker = interaction_user(interaction)?;
	let interaction_client = http_client.interaction(application_id);

	if invoker.id.get() != owner_id {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(NOT_SESSION_OWNER))
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	if action == "cancel" {
		interaction_client
			.create_response(interaction.id, &interaction.token, &update_to_content("Purge cancelled."))
			.await
			.into_diagnostic()?;
		return Ok(());
	}
	if action != "confirm" {
		bail!("Invalid action for purge confirmation: {} (parts: {:?})", action, custom_id_path);
	}

	let Some(channel) = &interaction.channel else {
		bail!("Purge confirmation used without a channel");
	};

	interaction_client
		.create_response(
			interaction.id,
			&interaction.token,
			&update_to_content(format!("Deleting {} messages...", amount)),
		)
		.await
		.into_diagnostic()?;

	let messages = http_client
		.channel_messages(channel.id)
		.limit(amount)
		.await
		.into_diagnostic()?
		.models()
		.await
		.into_diagnostic()?;

	// Bulk deletion rejects messages older than two weeks.
	let bulk_delete_cutoff = Utc::now() - Duration::days(13);
	let message_ids: Vec<Id<MessageMarker>> = messages
		.iter()
		.filter(|message| message.id.timestamp() > bulk_delete_cutoff.timestamp_millis())
		.map(|message| message.id)
		.collect();

	let deleted = message_ids.len();
	match message_ids.len() {
		0 => (),
		1 => {
			http_client
				.delete_message(channel.id, message_ids[0])
				.await
				.into_diagnostic()?;
		}
		_ => {
			http_client
				.delete_messages(channel.id, &message_ids)
				.await
				.into_diagnostic()?;
		}
	}

	interaction_client
		.update_response(&interaction.token)
		.content(Some(&format!("Successfully deleted {} messages.", deleted)))
		.await
		.into_diagnostic()?;

	Ok(())
}
