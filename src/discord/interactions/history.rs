// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigDocument;
use crate::discord::commands::checkhistory::{overview_buttons, overview_embed, record_blocks};
use crate::discord::utils::components::{button, button_row};
use crate::discord::utils::embeds::paged_embeds;
use crate::discord::utils::responses::{NOT_SESSION_OWNER, ephemeral_message, respond_with_pages};
use crate::discord::utils::users::{display_name, interaction_user};
use crate::moderation::{history_for_identifier, load_moderation_log};
use miette::{IntoDiagnostic, bail};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Duration;
use twilight_http::client::Client;
use twilight_model::channel::message::component::ButtonStyle;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::InteractionResponseDataBuilder;
use type_map::concurrent::TypeMap;

/// Handles the buttons on the DM'd history overview. These buttons are
/// stateless; the moderation log is re-read on every click, so the details
/// always reflect the file's current contents.
pub async fn route_history_interaction(
	interaction: &InteractionCreate,
	custom_id_path: &[String],
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: &ConfigDocument,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let (Some(owner), Some(kind)) = (custom_id_path.get(1), custom_id_path.get(2)) else {
		bail!("Invalid custom ID for history view (parts: {:?})", custom_id_path);
	};
	let Ok(owner_id) = owner.parse::<u64>() else {
		bail!("Invalid owner in history custom ID (parts: {:?})", custom_id_path);
	};

	let invoker = interaction_user(interaction)?;
	let invoker_id = invoker.id;
	let interaction_client = http_client.interaction(application_id);

	if invoker_id.get() != owner_id {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(NOT_SESSION_OWNER))
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	let identifier = format!("discord:{}", owner_id);
	let log = load_moderation_log(&config.moderation_log).await?;
	let history = history_for_identifier(&log, &identifier);

	if kind == "overview" {
		let embed = overview_embed(&history, display_name(invoker), config.embed_color).into_diagnostic()?;
		let data = InteractionResponseDataBuilder::new()
			.embeds([embed])
			.components(overview_buttons(&history, invoker_id))
			.build();
		let response = InteractionResponse {
			kind: InteractionResponseType::UpdateMessage,
			data: Some(data),
		};
		interaction_client
			.create_response(interaction.id, &interaction.token, &response)
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	let (records, kind_label, title) = match kind.as_str() {
		"bans" => (&history.bans, "Ban", "Your Bans"),
		"warns" => (&history.warns, "Warning", "Your Warnings"),
		"kicks" => (&history.kicks, "Kick", "Your Kicks"),
		_ => bail!("Invalid history view kind: {} (parts: {:?})", kind, custom_id_path),
	};

	let blocks = record_blocks(records, kind_label);
	let description = format!("Showing {} record(s).", records.len());
	let embeds = paged_embeds(
		title,
		&description,
		"Game server moderation history",
		"No records of this type.",
		config.embed_color,
		&blocks,
	)
	.into_diagnostic()?;

	let back_row = button_row(vec![button(
		format!("history/{}/overview", owner_id),
		String::from("Back to Overview"),
		ButtonStyle::Secondary,
		false,
	)]);

	respond_with_pages(
		interaction,
		InteractionResponseType::UpdateMessage,
		false,
		embeds,
		vec![back_row],
		invoker_id,
		http_client,
		application_id,
		bot_state,
		Duration::from_secs(config.sessions.page_timeout_seconds),
	)
	.await
}
