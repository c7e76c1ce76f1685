// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The ticket lifecycle: the category menu opens an intake modal, the modal
//! creates a private channel, and the buttons in that channel drive
//! everything until the close confirmation archives a transcript and deletes
//! the channel.

use crate::config::{ConfigDocument, TicketCategoryConfig};
use crate::discord::commands::characterinfo::NO_LINKED_ACCOUNT;
use crate::discord::commands::userinfo::account_embed;
use crate::discord::state::{ActiveTickets, TicketData};
use crate::discord::utils::components::{button, button_row, confirm_cancel_row};
use crate::discord::utils::permissions::{member_has_role, require_role};
use crate::discord::utils::queries::{characters_for_account, find_game_account};
use crate::discord::utils::responses::{ephemeral_message, update_to_content};
use crate::discord::utils::users::interaction_user;
use crate::moderation::{history_for_identifier, load_moderation_log};
use chrono::{Local, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use miette::{IntoDiagnostic, bail};
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::sync::RwLock;
use twilight_http::client::Client;
use twilight_mention::Mention;
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::application::interaction::modal::ModalInteractionData;
use twilight_model::channel::ChannelType;
use twilight_model::channel::message::MessageFlags;
use twilight_model::channel::message::component::{
	ActionRow, ButtonStyle, Component, SelectMenu, SelectMenuType, TextInput, TextInputStyle,
};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::http::attachment::Attachment;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::channel::permission_overwrite::{
	PermissionOverwrite as ChannelPermissionOverwrite, PermissionOverwriteType as ChannelPermissionOverwriteType,
};
use twilight_model::http::permission_overwrite::{PermissionOverwrite, PermissionOverwriteType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, ChannelMarker, MessageMarker, RoleMarker, UserMarker};
use twilight_util::builder::InteractionResponseDataBuilder;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder};
use type_map::concurrent::TypeMap;

const MAX_SUBJECT_LENGTH: u16 = 100;
const MAX_DETAILS_LENGTH: u16 = 2000;
const BAN_APPEAL_CATEGORY: &str = "ban_appeal";

pub async fn route_ticket_interaction(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	custom_id_path: &[String],
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	db_connection_pool: Pool<ConnectionManager<MysqlConnection>>,
	config: &ConfigDocument,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let Some(action) = custom_id_path.get(1) else {
		bail!("Invalid custom ID for ticket interaction (parts: {:?})", custom_id_path);
	};

	match action.as_str() {
		"create" => open_intake_modal(interaction, interaction_data, http_client, application_id, config, bot_state).await,
		"close" => confirm_close(interaction, http_client, application_id, config, bot_state).await,
		"close_cancel" => {
			let interaction_client = http_client.interaction(application_id);
			interaction_client
				.create_response(interaction.id, &interaction.token, &update_to_content("Ticket will stay open."))
				.await
				.into_diagnostic()?;
			Ok(())
		}
		"close_confirm" => close_ticket(interaction, http_client, application_id, config, bot_state).await,
		"player_info" => {
			send_player_info(
				interaction,
				http_client,
				application_id,
				db_connection_pool,
				config,
				bot_state,
			)
			.await
		}
		"add_user" => prompt_add_user(interaction, http_client, application_id, config).await,
		"add_user_select" => add_user(interaction, interaction_data, http_client, application_id, config).await,
		_ => bail!(
			"Invalid action for ticket interaction: {} (parts: {:?})",
			action,
			custom_id_path
		),
	}
}

pub async fn route_ticket_modal(
	interaction: &InteractionCreate,
	modal_data: &ModalInteractionData,
	custom_id_path: &[String],
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: &ConfigDocument,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let (Some(category_id), Some(action)) = (custom_id_path.get(1), custom_id_path.get(2)) else {
		bail!("Invalid custom ID for ticket modal (parts: {:?})", custom_id_path);
	};
	if action != "intake" {
		bail!("Invalid action for ticket modal: {} (parts: {:?})", action, custom_id_path);
	}

	create_ticket_channel(
		interaction,
		modal_data,
		category_id,
		http_client,
		application_id,
		config,
		bot_state,
	)
	.await
}

/// Responds to a category selection with the intake modal for that category.
/// The selected category rides along in the modal's custom ID.
async fn open_intake_modal(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: &ConfigDocument,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let Some(category_id) = interaction_data.values.first() else {
		bail!("Ticket category menu submitted without a selection");
	};
	let Some(category) = category_config(config, category_id) else {
		bail!("Ticket category menu submitted an unconfigured category: {}", category_id);
	};

	let invoker = interaction_user(interaction)?;
	let interaction_client = http_client.interaction(application_id);

	let existing_channel = {
		let state = bot_state.read().await;
		state
			.get::<ActiveTickets>()
			.and_then(|tickets| tickets.channel_for_user(invoker.id))
	};
	if let Some(channel) = existing_channel {
		interaction_client
			.create_response(
				interaction.id,
				&interaction.token,
				&ephemeral_message(format!("You already have an open ticket: {}", channel.mention())),
			)
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	let subject_input = Component::TextInput(TextInput {
		custom_id: String::from("subject"),
		label: String::from("Subject"),
		max_length: Some(MAX_SUBJECT_LENGTH),
		min_length: None,
		placeholder: Some(String::from("A short summary of your issue")),
		required: Some(true),
		style: TextInputStyle::Short,
		value: None,
	});
	let details_input = Component::TextInput(TextInput {
		custom_id: String::from("details"),
		label: String::from("Details"),
		max_length: Some(MAX_DETAILS_LENGTH),
		min_length: None,
		placeholder: Some(String::from("Describe your issue in as much detail as you can")),
		required: Some(true),
		style: TextInputStyle::Paragraph,
		value: None,
	});
	let subject_row = Component::ActionRow(ActionRow {
		components: vec![subject_input],
	});
	let details_row = Component::ActionRow(ActionRow {
		components: vec![details_input],
	});

	let data = InteractionResponseDataBuilder::new()
		.custom_id(format!("ticket/{}/intake", category.id))
		.title(category.label.clone())
		.components([subject_row, details_row])
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::Modal,
		data: Some(data),
	};
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}

/// Creates the private ticket channel from a submitted intake modal: channel
/// under the category's parent, visible only to the opener and staff, with the
/// intake answers and the ticket controls as the opening message.
async fn create_ticket_channel(
	interaction: &InteractionCreate,
	modal_data: &ModalInteractionData,
	category_id: &str,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: &ConfigDocument,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let Some(guild_id) = interaction.guild_id else {
		bail!("Ticket intake modal submitted outside of a guild");
	};
	let Some(category) = category_config(config, category_id) else {
		bail!("Ticket intake modal submitted for an unconfigured category: {}", category_id);
	};

	let mut subject: Option<String> = None;
	let mut details: Option<String> = None;
	for row in modal_data.components.iter() {
		for component in row.components.iter() {
			match component.custom_id.as_str() {
				"subject" => subject = component.value.clone(),
				"details" => details = component.value.clone(),
				_ => (),
			}
		}
	}
	let (Some(subject), Some(details)) = (subject, details) else {
		bail!("Ticket intake modal submitted without its required fields");
	};

	let opener = interaction_user(interaction)?;
	let opener_id = opener.id;
	let interaction_client = http_client.interaction(application_id);

	let existing_channel = {
		let state = bot_state.read().await;
		state
			.get::<ActiveTickets>()
			.and_then(|tickets| tickets.channel_for_user(opener_id))
	};
	if let Some(channel) = existing_channel {
		interaction_client
			.create_response(
				interaction.id,
				&interaction.token,
				&ephemeral_message(format!("You already have an open ticket: {}", channel.mention())),
			)
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	let everyone_role: Id<RoleMarker> = guild_id.cast();
	let member_permissions = Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::READ_MESSAGE_HISTORY;
	let permission_overwrites = [
		ChannelPermissionOverwrite {
			allow: Permissions::empty(),
			deny: Permissions::VIEW_CHANNEL,
			id: everyone_role.cast(),
			kind: ChannelPermissionOverwriteType::Role,
		},
		ChannelPermissionOverwrite {
			allow: member_permissions,
			deny: Permissions::empty(),
			id: opener_id.cast(),
			kind: ChannelPermissionOverwriteType::Member,
		},
		ChannelPermissionOverwrite {
			allow: member_permissions,
			deny: Permissions::empty(),
			id: Id::<RoleMarker>::new(config.roles.staff).cast(),
			kind: ChannelPermissionOverwriteType::Role,
		},
	];

	let channel_name = format!("ticket-{}", opener.name.to_lowercase());
	let channel = http_client
		.create_guild_channel(guild_id, &channel_name)
		.kind(ChannelType::GuildText)
		.parent_id(Id::new(category.parent_channel))
		.permission_overwrites(&permission_overwrites)
		.await
		.into_diagnostic()?
		.model()
		.await
		.into_diagnostic()?;

	let ticket_id = cuid2::create_id();
	let opened_at = Utc::now();

	let mut embed_builder = EmbedBuilder::new()
		.title(subject)
		.color(config.embed_color)
		.description(details)
		.field(EmbedFieldBuilder::new("Category", category.label.clone()).inline())
		.field(EmbedFieldBuilder::new("Opened By", opener_id.mention().to_string()).inline())
		.footer(EmbedFooterBuilder::new(format!("Ticket ID: {}", ticket_id)));

	// Ban appeals carry the appellant's current ban so staff don't have to go
	// dig it out of the admin panel.
	if category.id == BAN_APPEAL_CATEGORY {
		match load_moderation_log(&config.moderation_log).await {
			Ok(log) => {
				let identifier = format!("discord:{}", opener_id);
				let history = history_for_identifier(&log, &identifier);
				if let Some(ban) = history.active_ban() {
					let ban_block = format!(
						"```\nAction ID: {}\nReason: {}\nExpires: {}\n```",
						ban.id,
						ban.reason.as_deref().unwrap_or("No reason recorded"),
						ban.expiry_display(Local::now()),
					);
					embed_builder = embed_builder.field(EmbedFieldBuilder::new("Active Ban", ban_block));
				} else {
					embed_builder = embed_builder.field(EmbedFieldBuilder::new("Active Ban", "No active ban found."));
				}
			}
			Err(error) => tracing::warn!(source = ?error, "failed to read the moderation log for a ban appeal"),
		}
	}
	let intro_embed = embed_builder.validate().into_diagnostic()?.build();

	let mut intro_content = opener_id.mention().to_string();
	if let Some(ping_role) = config.roles.ticket_ping {
		let ping_role: Id<RoleMarker> = Id::new(ping_role);
		let _ = write!(intro_content, " {}", ping_role.mention());
	}

	let controls = button_row(vec![
		button(
			String::from("ticket/close"),
			String::from("Close Ticket"),
			ButtonStyle::Danger,
			false,
		),
		button(
			String::from("ticket/player_info"),
			String::from("Player Info"),
			ButtonStyle::Secondary,
			false,
		),
		button(
			String::from("ticket/add_user"),
			String::from("Add User"),
			ButtonStyle::Secondary,
			false,
		),
	]);

	http_client
		.create_message(channel.id)
		.content(&intro_content)
		.embeds(&[intro_embed])
		.components(&[controls])
		.await
		.into_diagnostic()?;

	{
		let mut state = bot_state.write().await;
		let tickets = state.entry::<ActiveTickets>().or_insert_with(ActiveTickets::default);
		tickets.by_channel.insert(
			channel.id,
			TicketData {
				ticket_id,
				opener: opener_id,
				category_id: category.id.clone(),
				opened_at,
			},
		);
	}

	interaction_client
		.create_response(
			interaction.id,
			&interaction.token,
			&ephemeral_message(format!("Your ticket has been created: {}", channel.id.mention())),
		)
		.await
		.into_diagnostic()?;

	Ok(())
}

/// Asks before closing. Only the opener and staff may close a ticket.
async fn confirm_close(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: &ConfigDocument,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let Some(ticket_channel) = ticket_channel(interaction) else {
		bail!("Ticket close button used without a channel");
	};
	let invoker = interaction_user(interaction)?;
	let interaction_client = http_client.interaction(application_id);

	let Some(opener) = ticket_opener(&bot_state, ticket_channel).await else {
		interaction_client
			.create_response(
				interaction.id,
				&interaction.token,
				&ephemeral_message("This channel is not an open ticket."),
			)
			.await
			.into_diagnostic()?;
		return Ok(());
	};
	if invoker.id != opener && !member_has_role(interaction, config.roles.staff) {
		interaction_client
			.create_response(
				interaction.id,
				&interaction.token,
				&ephemeral_message("Only staff or the ticket opener can close this ticket."),
			)
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	let data = InteractionResponseDataBuilder::new()
		.content("Close this ticket? A transcript will be saved and the channel will be deleted.")
		.components([confirm_cancel_row(
			String::from("ticket/close_confirm"),
			String::from("Close Ticket"),
			String::from("ticket/close_cancel"),
		)])
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

/// Archives the channel's full message history to the transcript channel,
/// then deletes the ticket channel.
async fn close_ticket(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: &ConfigDocument,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let Some(ticket_channel) = ticket_channel(interaction) else {
		bail!("Ticket close confirmation used without a channel");
	};
	let invoker = interaction_user(interaction)?;
	let closer_name = invoker.name.clone();
	let interaction_client = http_client.interaction(application_id);

	let ticket = {
		let mut state = bot_state.write().await;
		state
			.get_mut::<ActiveTickets>()
			.and_then(|tickets| tickets.by_channel.remove(&ticket_channel))
	};
	let Some(ticket) = ticket else {
		interaction_client
			.create_response(
				interaction.id,
				&interaction.token,
				&update_to_content("This ticket was already closed."),
			)
			.await
			.into_diagnostic()?;
		return Ok(());
	};

	interaction_client
		.create_response(
			interaction.id,
			&interaction.token,
			&update_to_content("Saving the transcript and closing this ticket..."),
		)
		.await
		.into_diagnostic()?;

	let mut messages = Vec::new();
	let mut before: Option<Id<MessageMarker>> = None;
	loop {
		let request = http_client.channel_messages(ticket_channel).limit(100);
		let batch = match before {
			Some(before_id) => request.before(before_id).await,
			None => request.await,
		}
		.into_diagnostic()?
		.models()
		.await
		.into_diagnostic()?;
		let batch_len = batch.len();
		before = batch.last().map(|message| message.id);
		messages.extend(batch);
		if batch_len < 100 {
			break;
		}
	}
	// The API hands messages back newest-first.
	messages.reverse();

	let category_label = category_config(config, &ticket.category_id)
		.map(|category| category.label.clone())
		.unwrap_or_else(|| ticket.category_id.clone());
	let closed_at = Utc::now();

	let mut transcript = format!(
		"Ticket {} ({})\nOpened by {} at {}\nClosed by {} at {}\n\n",
		ticket.ticket_id,
		category_label,
		ticket.opener,
		ticket.opened_at.format("%Y-%m-%d %H:%M:%S UTC"),
		closer_name,
		closed_at.format("%Y-%m-%d %H:%M:%S UTC"),
	);
	for message in &messages {
		let timestamp = chrono::DateTime::from_timestamp(message.timestamp.as_secs(), 0)
			.map(|time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string())
			.unwrap_or_else(|| String::from("unknown time"));
		let _ = writeln!(transcript, "[{}] {}: {}", timestamp, message.author.name, message.content);
		for attachment in &message.attachments {
			let _ = writeln!(transcript, "    [attachment] {}", attachment.url);
		}
	}

	let transcript_file = Attachment::from_bytes(
		format!("ticket-{}.txt", ticket.ticket_id),
		transcript.into_bytes(),
		1,
	);
	let summary = format!(
		"Transcript for ticket `{}` ({}), opened by {}.",
		ticket.ticket_id,
		category_label,
		ticket.opener.mention(),
	);
	let transcript_channel: Id<ChannelMarker> = Id::new(config.tickets.transcript_channel);
	http_client
		.create_message(transcript_channel)
		.content(&summary)
		.attachments(&[transcript_file])
		.await
		.into_diagnostic()?;

	http_client.delete_channel(ticket_channel).await.into_diagnostic()?;

	Ok(())
}

/// The Player Info button: looks up the opener's linked game account and
/// shows it to staff without leaving the ticket.
async fn send_player_info(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	db_connection_pool: Pool<ConnectionManager<MysqlConnection>>,
	config: &ConfigDocument,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	if !require_role(interaction, config.roles.staff, http_client, application_id).await? {
		return Ok(());
	}
	let Some(ticket_channel) = ticket_channel(interaction) else {
		bail!("Ticket player info button used without a channel");
	};
	let interaction_client = http_client.interaction(application_id);

	let Some(opener) = ticket_opener(&bot_state, ticket_channel).await else {
		interaction_client
			.create_response(
				interaction.id,
				&interaction.token,
				&ephemeral_message("This channel is not an open ticket."),
			)
			.await
			.into_diagnostic()?;
		return Ok(());
	};

	let mut db_connection = db_connection_pool.get().into_diagnostic()?;
	let Some(account) = find_game_account(&mut db_connection, opener).into_diagnostic()? else {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(NO_LINKED_ACCOUNT))
			.await
			.into_diagnostic()?;
		return Ok(());
	};
	let characters = characters_for_account(&mut db_connection, &account).into_diagnostic()?;
	let embed = account_embed(&account, &characters, config.embed_color).into_diagnostic()?;

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

async fn prompt_add_user(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: &ConfigDocument,
) -> miette::Result<()> {
	if !require_role(interaction, config.roles.staff, http_client, application_id).await? {
		return Ok(());
	}

	let user_menu = Component::SelectMenu(SelectMenu {
		channel_types: None,
		custom_id: String::from("ticket/add_user_select"),
		default_values: None,
		disabled: false,
		kind: SelectMenuType::User,
		max_values: None,
		min_values: None,
		options: None,
		placeholder: Some(String::from("Select a user to add to this ticket")),
	});
	let menu_row = Component::ActionRow(ActionRow {
		components: vec![user_menu],
	});

	let data = InteractionResponseDataBuilder::new()
		.content("Who should be added to this ticket?")
		.components([menu_row])
		.flags(MessageFlags::EPHEMERAL)
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(data),
	};
	let interaction_client = http_client.interaction(application_id);
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}

/// Grants the selected user access to the ticket channel and announces them.
async fn add_user(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	config: &ConfigDocument,
) -> miette::Result<()> {
	if !require_role(interaction, config.roles.staff, http_client, application_id).await? {
		return Ok(());
	}
	let Some(ticket_channel) = ticket_channel(interaction) else {
		bail!("Ticket add user selection used without a channel");
	};
	let Some(selected) = interaction_data.values.first() else {
		bail!("Ticket add user menu submitted without a selection");
	};
	let Ok(user_id) = selected.parse::<u64>() else {
		bail!("Ticket add user menu submitted a non-user value: {}", selected);
	};
	let user_id: Id<UserMarker> = Id::new(user_id);

	let overwrite = PermissionOverwrite {
		allow: Some(Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::READ_MESSAGE_HISTORY),
		deny: None,
		id: user_id.cast(),
		kind: PermissionOverwriteType::Member,
	};
	http_client
		.update_channel_permission(ticket_channel, &overwrite)
		.await
		.into_diagnostic()?;

	let notice = format!("{} has been added to this ticket.", user_id.mention());
	http_client
		.create_message(ticket_channel)
		.content(&notice)
		.await
		.into_diagnostic()?;

	let interaction_client = http_client.interaction(application_id);
	interaction_client
		.create_response(
			interaction.id,
			&interaction.token,
			&update_to_content(format!("Added {} to the ticket.", user_id.mention())),
		)
		.await
		.into_diagnostic()?;

	Ok(())
}

fn category_config<'a>(config: &'a ConfigDocument, category_id: &str) -> Option<&'a TicketCategoryConfig> {
	config
		.tickets
		.categories
		.iter()
		.find(|category| category.id == category_id)
}

fn ticket_channel(interaction: &InteractionCreate) -> Option<Id<ChannelMarker>> {
	interaction.channel.as_ref().map(|channel| channel.id)
}

async fn ticket_opener(bot_state: &Arc<RwLock<TypeMap>>, channel: Id<ChannelMarker>) -> Option<Id<UserMarker>> {
	let state = bot_state.read().await;
	state
		.get::<ActiveTickets>()
		.and_then(|tickets| tickets.by_channel.get(&channel))
		.map(|ticket| ticket.opener)
}
