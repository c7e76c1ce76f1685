// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigDocument;
use crate::discord::utils::permissions::require_role;
use crate::discord::utils::responses::ephemeral_message;
use miette::{IntoDiagnostic, bail};
use std::sync::Arc;
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::channel::message::component::{ActionRow, Component, SelectMenu, SelectMenuOption, SelectMenuType};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::command::CommandBuilder;
use twilight_util::builder::embed::EmbedBuilder;

pub fn command_definition() -> Command {
	CommandBuilder::new(
		"setup_tickets",
		"Posts the ticket category menu in this channel",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.default_member_permissions(Permissions::ADMINISTRATOR)
	.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: Arc<ConfigDocument>,
) -> miette::Result<()> {
	if !require_role(interaction, config.roles.admin, http_client, application_id).await? {
		return Ok(());
	}

	let Some(channel) = &interaction.channel else {
		bail!("Ticket setup command used without a channel");
	};

	let options: Vec<SelectMenuOption> = config
		.tickets
		.categories
		.iter()
		.map(|category| SelectMenuOption {
			default: false,
			description: Some(category.description.clone()),
			emoji: None,
			label: category.label.clone(),
			value: category.id.clone(),
		})
		.collect();
	if options.is_empty() {
		let interaction_client = http_client.interaction(application_id);
		interaction_client
			.create_response(
				interaction.id,
				&interaction.token,
				&ephemeral_message("No ticket categories are configured."),
			)
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	let category_menu = Component::SelectMenu(SelectMenu {
		channel_types: None,
		custom_id: String::from("ticket/create"),
		default_values: None,
		disabled: false,
		kind: SelectMenuType::Text,
		max_values: None,
		min_values: None,
		options: Some(options),
		placeholder: Some(String::from("Select a ticket category")),
	});
	let menu_row = Component::ActionRow(ActionRow {
		components: vec![category_menu],
	});

	let panel_embed = EmbedBuilder::new()
		.title("Support Tickets")
		.color(config.embed_color)
		.description("Need help from the staff team? Select a category below to open a ticket.")
		.validate()
		.into_diagnostic()?
		.build();

	http_client
		.create_message(channel.id)
		.embeds(&[panel_embed])
		.components(&[menu_row])
		.await
		.into_diagnostic()?;

	let interaction_client = http_client.interaction(application_id);
	interaction_client
		.create_response(
			interaction.id,
			&interaction.token,
			&ephemeral_message("Ticket panel posted."),
		)
		.await
		.into_diagnostic()?;

	Ok(())
}
