// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::user_option;
use crate::config::ConfigDocument;
use crate::discord::state::{SelectionSession, SelectionSessions, expire_selection_session};
use crate::discord::utils::components::selection_rows;
use crate::discord::utils::embeds::paged_embeds;
use crate::discord::utils::permissions::require_role;
use crate::discord::utils::queries::{characters_for_account, find_game_account};
use crate::discord::utils::responses::{ephemeral_message, respond_with_pages};
use crate::discord::utils::users::interaction_user;
use crate::model::{Character, format_money};
use crate::pager::ContentBlock;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use miette::IntoDiagnostic;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::channel::message::MessageFlags;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, UserMarker};
use twilight_util::builder::InteractionResponseDataBuilder;
use twilight_util::builder::command::{CommandBuilder, UserBuilder};
use type_map::concurrent::TypeMap;

pub const NO_LINKED_ACCOUNT: &str = "No game account is linked to that Discord user.";
pub const NO_CHARACTERS: &str = "That account has no characters.";

pub fn command_definition() -> Command {
	CommandBuilder::new(
		"characterinfo",
		"Shows detailed information about a player's character",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.option(UserBuilder::new("user", "The Discord user whose characters to look up"))
	.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	db_connection_pool: Pool<ConnectionManager<MysqlConnection>>,
	config: Arc<ConfigDocument>,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	if !require_role(interaction, config.roles.staff, http_client, application_id).await? {
		return Ok(());
	}

	let invoker = interaction_user(interaction)?;
	let target_id = user_option(command_data, "user").unwrap_or(invoker.id);
	let invoker_id = invoker.id;

	let mut db_connection = db_connection_pool.get().into_diagnostic()?;
	let interaction_client = http_client.interaction(application_id);

	let Some(account) = find_game_account(&mut db_connection, target_id).into_diagnostic()? else {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(NO_LINKED_ACCOUNT))
			.await
			.into_diagnostic()?;
		return Ok(());
	};
	let mut characters = characters_for_account(&mut db_connection, &account).into_diagnostic()?;

	if characters.is_empty() {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(NO_CHARACTERS))
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	if characters.len() == 1 {
		let character = characters.remove(0);
		return respond_character_detail(
			interaction,
			InteractionResponseType::ChannelMessageWithSource,
			&character,
			invoker_id,
			http_client,
			application_id,
			&config,
			bot_state,
		)
		.await;
	}

	start_selection(
		"charinfo",
		"Select a character to view:",
		&characters,
		interaction,
		invoker_id,
		http_client,
		application_id,
		&config,
		bot_state,
	)
	.await
}

/// Posts an ephemeral selection prompt with one button per character and
/// registers the session its buttons reference.
pub(in crate::discord) async fn start_selection(
	kind: &str,
	prompt: &str,
	characters: &[Character],
	interaction: &InteractionCreate,
	owner: Id<UserMarker>,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: &ConfigDocument,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let session_id = cuid2::create_id();
	let entries: Vec<(String, String)> = characters
		.iter()
		.map(|character| {
			(
				character.citizenid.clone(),
				format!("{}. {}", character.cid, character.display_name()),
			)
		})
		.collect();
	let rows = selection_rows(kind, &session_id, &entries);

	{
		let mut state = bot_state.write().await;
		let sessions = state
			.entry::<SelectionSessions>()
			.or_insert_with(SelectionSessions::default);
		sessions.sessions.insert(
			session_id.clone(),
			SelectionSession {
				owner,
				interaction_token: interaction.token.clone(),
				expires_at: Instant::now() + Duration::from_secs(config.sessions.select_timeout_seconds),
			},
		);
	}
	tokio::spawn(expire_selection_session(
		Arc::clone(&bot_state),
		Arc::clone(http_client),
		application_id,
		session_id,
	));

	let data = InteractionResponseDataBuilder::new()
		.content(prompt)
		.components(rows)
		.flags(MessageFlags::EPHEMERAL)
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(data),
	};
	http_client
		.interaction(application_id)
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}

pub(in crate::discord) fn character_detail_blocks(character: &Character) -> Vec<ContentBlock> {
	let info = character.charinfo.value();
	let money = character.money.value();
	let job = character.job.value();
	let gang = character.gang.value();
	let position = character.position.value();

	let details = format!(
		"```\n+ Citizen ID: {}\n+ CID: {}\n+ First Name: {}\n+ Last Name: {}\n+ Birthdate: {}\n+ Gender: {}\n+ Nationality: {}\n+ Phone: {}\n```",
		character.citizenid,
		character.cid,
		info.firstname,
		info.lastname,
		info.birthdate,
		info.gender_display(),
		info.nationality,
		character.phone_number.as_deref().unwrap_or(&info.phone),
	);
	let financial = format!(
		"```\n+ Bank: {}\n+ Cash: {}\n+ Crypto: {}\n```",
		format_money(money.bank),
		format_money(money.cash),
		money.crypto,
	);
	let job_and_gang = format!(
		"```\n+ Job: {} ({}) - {}\n+ On Duty: {}\n+ Gang: {}\n```",
		job.label,
		job.name,
		job.grade.name,
		if job.onduty { "Yes" } else { "No" },
		gang.display(),
	);
	let last_position = format!(
		"```\n+ X: {:.2}\n+ Y: {:.2}\n+ Z: {:.2}\n\n+ Last Updated: {}\n```",
		position.x,
		position.y,
		position.z,
		character.last_updated.format("%Y-%m-%d %H:%M:%S"),
	);

	vec![
		ContentBlock::new("Character Details", details),
		ContentBlock::new("Financial Information", financial),
		ContentBlock::new("Job & Gang", job_and_gang),
		ContentBlock::new("Last Position", last_position),
	]
}

pub(in crate::discord) async fn respond_character_detail(
	interaction: &InteractionCreate,
	kind: InteractionResponseType,
	character: &Character,
	owner: Id<UserMarker>,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: &ConfigDocument,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let title = format!("Character: {}", character.display_name());
	let blocks = character_detail_blocks(character);
	let embeds = paged_embeds(
		&title,
		"Current character record from the game database.",
		&format!("Citizen ID: {}", character.citizenid),
		"No character data available.",
		config.embed_color,
		&blocks,
	)
	.into_diagnostic()?;

	respond_with_pages(
		interaction,
		kind,
		false,
		embeds,
		Vec::new(),
		owner,
		http_client,
		application_id,
		bot_state,
		Duration::from_secs(config.sessions.page_timeout_seconds),
	)
	.await
}
