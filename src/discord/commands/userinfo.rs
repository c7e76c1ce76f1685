// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::characterinfo::NO_LINKED_ACCOUNT;
use super::user_option;
use crate::config::ConfigDocument;
use crate::discord::utils::permissions::require_role;
use crate::discord::utils::queries::{characters_for_account, find_game_account};
use crate::discord::utils::responses::ephemeral_message;
use crate::model::{Character, User as GameAccount};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use miette::{IntoDiagnostic, bail};
use std::sync::Arc;
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::channel::message::Embed;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::InteractionResponseDataBuilder;
use twilight_util::builder::command::{CommandBuilder, UserBuilder};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder};
use twilight_validate::embed::EmbedValidationError;

pub fn command_definition() -> Command {
	CommandBuilder::new(
		"userinfo",
		"Looks up the game account linked to a Discord user",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.option(UserBuilder::new("user", "The Discord user to look up").required(true))
	.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	db_connection_pool: Pool<ConnectionManager<MysqlConnection>>,
	config: Arc<ConfigDocument>,
) -> miette::Result<()> {
	if !require_role(interaction, config.roles.staff, http_client, application_id).await? {
		return Ok(());
	}

	let Some(target_id) = user_option(command_data, "user") else {
		bail!("User info command invoked without its required user option");
	};

	let mut db_connection = db_connection_pool.get().into_diagnostic()?;
	let interaction_client = http_client.interaction(application_id);

	let Some(account) = find_game_account(&mut db_connection, target_id).into_diagnostic()? else {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(NO_LINKED_ACCOUNT))
			.await
			.into_diagnostic()?;
		return Ok(());
	};
	let characters = characters_for_account(&mut db_connection, &account).into_diagnostic()?;

	let embed = account_embed(&account, &characters, config.embed_color).into_diagnostic()?;
	let response = InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(InteractionResponseDataBuilder::new().embeds([embed]).build()),
	};
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}

/// Summary embed for a game account; also used by the ticket player info
/// button.
pub fn account_embed(
	account: &GameAccount,
	characters: &[Character],
	color: u32,
) -> Result<Embed, EmbedValidationError> {
	let account_block = format!(
		"```\n+ User ID: {}\n+ Username: {}\n+ Discord: {}\n+ FiveM: {}\n```",
		account.user_id,
		account.username,
		account.discord.as_deref().unwrap_or("Not linked"),
		account.fivem.as_deref().unwrap_or("Not linked"),
	);
	let identifiers_block = format!(
		"```\n+ License: {}\n+ License2: {}\n```",
		account.license.as_deref().unwrap_or("None"),
		account.license2.as_deref().unwrap_or("None"),
	);
	let characters_block = if characters.is_empty() {
		String::from("No characters found.")
	} else {
		characters
			.iter()
			.map(|character| format!("{}. {} (`{}`)", character.cid, character.display_name(), character.citizenid))
			.collect::<Vec<String>>()
			.join("\n")
	};

	EmbedBuilder::new()
		.title(format!("Account: {}", account.username))
		.color(color)
		.field(EmbedFieldBuilder::new("Account", account_block))
		.field(EmbedFieldBuilder::new("Identifiers", identifiers_block))
		.field(EmbedFieldBuilder::new("Characters", characters_block))
		.footer(EmbedFooterBuilder::new(format!("{} character(s)", characters.len())))
		.validate()
		.map(|builder| builder.build())
}
