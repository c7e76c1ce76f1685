// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::integer_option;
use crate::config::ConfigDocument;
use crate::discord::utils::components::confirm_cancel_row;
use crate::discord::utils::permissions::require_role;
use crate::discord::utils::responses::ephemeral_message;
use crate::discord::utils::users::interaction_user;
use miette::{IntoDiagnostic, bail};
use std::sync::Arc;
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::channel::ChannelType;
use twilight_model::channel::message::MessageFlags;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::InteractionResponseDataBuilder;
use twilight_util::builder::command::{CommandBuilder, IntegerBuilder};

pub fn command_definition() -> Command {
	CommandBuilder::new("purge", "Deletes a number of recent messages", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.default_member_permissions(Permissions::MANAGE_MESSAGES)
		.option(
			IntegerBuilder::new("amount", "Number of messages to delete")
				.required(true)
				.min_value(1)
				.max_value(100),
		)
		.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: Arc<ConfigDocument>,
) -> miette::Result<()> {
	if !require_role(interaction, config.roles.staff, http_client, application_id).await? {
		return Ok(());
	}

	let Some(amount) = integer_option(command_data, "amount") else {
		bail!("Purge command invoked without its required amount option");
	};

	let interaction_client = http_client.interaction(application_id);
	let channel_is_text = interaction
		.channel
		.as_ref()
		.is_some_and(|channel| channel.kind == ChannelType::GuildText);
	if !channel_is_text {
		interaction_client
			.create_response(
				interaction.id,
				&interaction.token,
				&ephemeral_message("This command can only be used in a server text channel."),
			)
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	let invoker = interaction_user(interaction)?;
	let row = confirm_cancel_row(
		format!("purge/{}/{}/confirm", invoker.id, amount),
		format!("Delete {} Messages", amount),
		format!("purge/{}/{}/cancel", invoker.id, amount),
	);
	let data = InteractionResponseDataBuilder::new()
		.content(format!("Are you sure you want to delete the last {} messages?", amount))
		.components([row])
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
