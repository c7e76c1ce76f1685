// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::characterinfo::NO_LINKED_ACCOUNT;
use super::user_option;
use crate::config::ConfigDocument;
use crate::discord::state::{SelectionSession, SelectionSessions, expire_selection_session};
use crate::discord::utils::components::selection_rows;
use crate::discord::utils::embeds::paged_embeds;
use crate::discord::utils::permissions::require_role;
use crate::discord::utils::queries::{characters_for_account, find_game_account, vehicles_for_characters};
use crate::discord::utils::responses::{ephemeral_message, respond_with_pages};
use crate::discord::utils::users::interaction_user;
use crate::model::{InventoryItem, Vehicle};
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

pub const NO_VEHICLES: &str = "No vehicles are registered to that user's characters.";

pub fn command_definition() -> Command {
	CommandBuilder::new(
		"vehicles",
		"Shows the vehicles owned by a player's characters",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.option(UserBuilder::new("user", "The Discord user whose vehicles to look up"))
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
	let characters = characters_for_account(&mut db_connection, &account).into_diagnostic()?;
	let citizenids: Vec<String> = characters.iter().map(|character| character.citizenid.clone()).collect();
	let mut vehicles = vehicles_for_characters(&mut db_connection, &citizenids).into_diagnostic()?;

	if vehicles.is_empty() {
		interaction_client
			.create_response(interaction.id, &interaction.token, &ephemeral_message(NO_VEHICLES))
			.await
			.into_diagnostic()?;
		return Ok(());
	}

	if vehicles.len() == 1 {
		let vehicle = vehicles.remove(0);
		return respond_vehicle_detail(
			interaction,
			InteractionResponseType::ChannelMessageWithSource,
			&vehicle,
			invoker_id,
			http_client,
			application_id,
			&config,
			bot_state,
		)
		.await;
	}

	let session_id = cuid2::create_id();
	let entries: Vec<(String, String)> = vehicles
		.iter()
		.map(|vehicle| (vehicle.plate.clone(), format!("{} ({})", vehicle.model, vehicle.plate)))
		.collect();
	let rows = selection_rows("vehicle", &session_id, &entries);

	{
		let mut state = bot_state.write().await;
		let sessions = state
			.entry::<SelectionSessions>()
			.or_insert_with(SelectionSessions::default);
		sessions.sessions.insert(
			session_id.clone(),
			SelectionSession {
				owner: invoker_id,
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
		.content("Select a vehicle to view:")
		.components(rows)
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

fn inventory_lines(items: &[InventoryItem]) -> String {
	if items.is_empty() {
		return String::from("Empty");
	}
	items
		.iter()
		.map(|item| format!("{} x{} [Slot: {}]", item.name, item.amount, item.slot))
		.collect::<Vec<String>>()
		.join("\n")
}

pub(in crate::discord) fn vehicle_detail_blocks(vehicle: &Vehicle) -> Vec<ContentBlock> {
	let details = format!(
		"```\n+ Model: {}\n+ License Plate: {}\n+ Garage: {}\n+ State: {}\n+ Driving Distance: {}\n```",
		vehicle.model,
		vehicle.plate,
		vehicle.garage.as_deref().unwrap_or("Unknown"),
		vehicle.state_display(),
		vehicle
			.drivingdistance
			.map(|distance| distance.to_string())
			.unwrap_or_else(|| String::from("Unknown")),
	);
	// Engine and body health are stored on a 0-1000 scale.
	let status = format!(
		"```\n+ Fuel: {}%\n+ Engine Health: {:.1}%\n+ Body Health: {:.1}%\n```",
		vehicle.fuel,
		f64::from(vehicle.engine) / 10.0,
		f64::from(vehicle.body) / 10.0,
	);

	vec![
		ContentBlock::new("Vehicle Details", details),
		ContentBlock::new("Vehicle Status", status),
		ContentBlock::new("Trunk Contents", inventory_lines(vehicle.trunk.value())),
		ContentBlock::new("Glovebox Contents", inventory_lines(vehicle.glovebox.value())),
	]
}

pub(in crate::discord) async fn respond_vehicle_detail(
	interaction: &InteractionCreate,
	kind: InteractionResponseType,
	vehicle: &Vehicle,
	owner: Id<UserMarker>,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: &ConfigDocument,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let title = format!("Vehicle: {} ({})", vehicle.model, vehicle.plate);
	let blocks = vehicle_detail_blocks(vehicle);
	let embeds = paged_embeds(
		&title,
		"Current vehicle record from the game database.",
		&format!("Plate: {}", vehicle.plate),
		"No vehicle data available.",
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

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::Decoded;

	fn sample_vehicle() -> Vehicle {
		Vehicle {
			citizenid: Some(String::from("ABC12345")),
			model: String::from("sultan"),
			plate: String::from("COP 123"),
			garage: Some(String::from("pillboxgarage")),
			fuel: 82,
			engine: 947.3,
			body: 1000.0,
			state: 1,
			drivingdistance: Some(12034),
			trunk: Decoded::Defaulted(Vec::new()),
			glovebox: Decoded::Parsed(vec![
				serde_json::from_str(r#"{"name": "driver_license", "amount": 1, "slot": 1}"#).unwrap(),
			]),
		}
	}

	#[test]
	fn detail_blocks_cover_all_sections() {
		let blocks = vehicle_detail_blocks(&sample_vehicle());
		let labels: Vec<&str> = blocks.iter().map(|block| block.label.as_str()).collect();
		assert_eq!(
			labels,
			vec!["Vehicle Details", "Vehicle Status", "Trunk Contents", "Glovebox Contents"]
		);
		assert!(blocks[0].body.contains("+ State: Garaged"));
		assert!(blocks[1].body.contains("+ Engine Health: 94.7%"));
		assert_eq!(blocks[2].body, "Empty");
		assert!(blocks[3].body.contains("driver_license x1"));
	}
}
