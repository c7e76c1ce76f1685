// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{command_definitions, string_option};
use crate::config::ConfigDocument;
use crate::discord::utils::responses::ephemeral_message;
use miette::IntoDiagnostic;
use std::sync::Arc;
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::channel::message::MessageFlags;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::InteractionResponseDataBuilder;
use twilight_util::builder::command::{CommandBuilder, StringBuilder};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder};

pub fn command_definition() -> Command {
	CommandBuilder::new("help", "Lists the bot's commands", CommandType::ChatInput)
		.option(StringBuilder::new("command", "A command to get detailed help for"))
		.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: Arc<ConfigDocument>,
) -> miette::Result<()> {
	let interaction_client = http_client.interaction(application_id);
	let definitions = command_definitions();

	if let Some(command_name) = string_option(command_data, "command") {
		let command_name = command_name.trim_start_matches('/');
		let Some(definition) = definitions.iter().find(|definition| definition.name == command_name) else {
			interaction_client
				.create_response(
					interaction.id,
					&interaction.token,
					&ephemeral_message(format!("There's no `/{}` command.", command_name)),
				)
				.await
				.into_diagnostic()?;
			return Ok(());
		};

		let mut builder = EmbedBuilder::new()
			.title(format!("/{}", definition.name))
			.color(config.embed_color)
			.description(definition.description.clone());
		for option in &definition.options {
			let requirement = if option.required.unwrap_or(false) {
				"required"
			} else {
				"optional"
			};
			builder = builder.field(EmbedFieldBuilder::new(
				format!("{} ({})", option.name, requirement),
				option.description.clone(),
			));
		}
		let embed = builder.validate().into_diagnostic()?.build();
		let data = InteractionResponseDataBuilder::new()
			.embeds([embed])
			.flags(MessageFlags::EPHEMERAL)
			.build();
		let response = InteractionResponse {
			kind: InteractionResponseType::ChannelMessageWithSource,
			data: Some(data),
		};
		interaction_client
			.create_response(interaction.id, &interaction.token, &response)
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	let mut builder = EmbedBuilder::new()
		.title("Copper Badge Commands")
		.color(config.embed_color)
		.description("Use `/help command:<name>` for details about one command.");
	for definition in &definitions {
		builder = builder.field(EmbedFieldBuilder::new(
			format!("/{}", definition.name),
			definition.description.clone(),
		));
	}
	let embed = builder.validate().into_diagnostic()?.build();
	let data = InteractionResponseDataBuilder::new()
		.embeds([embed])
		.flags(MessageFlags::EPHEMERAL)
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(data),
	};
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}
