// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::characterinfo::{NO_CHARACTERS, NO_LINKED_ACCOUNT, start_selection};
use super::user_option;
use crate::config::ConfigDocument;
use crate::discord::utils::embeds::paged_embeds;
use crate::discord::utils::permissions::require_role;
use crate::discord::utils::queries::{characters_for_account, find_game_account};
use crate::discord::utils::responses::{ephemeral_message, respond_with_pages};
use crate::discord::utils::users::interaction_user;
use crate::model::{Character, InventoryItem};
use crate::pager::ContentBlock;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use miette::IntoDiagnostic;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Duration;
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::InteractionResponseType;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, UserMarker};
use twilight_util::builder::command::{CommandBuilder, UserBuilder};
use type_map::concurrent::TypeMap;

pub fn command_definition() -> Command {
	CommandBuilder::new(
		"playerinventory",
		"Shows the inventory of a player's character",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.option(UserBuilder::new("user", "The Discord user whose inventory to look up"))
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
		return respond_inventory(
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
		"inventory",
		"Select a character whose inventory to view:",
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

fn item_category(item: &InventoryItem) -> &'static str {
	let name = item.name.to_lowercase();
	let contains_any = |needles: &[&str]| needles.iter().any(|needle| name.contains(needle));
	if contains_any(&["weapon", "gun", "knife", "ammo"]) {
		"Weapons"
	} else if contains_any(&["food", "drink", "water", "sandwich", "burger"]) {
		"Food & Drinks"
	} else if contains_any(&["bandage", "medkit", "pill", "firstaid", "ifak"]) {
		"Medical"
	} else if contains_any(&["id_card", "license", "card", "document", "visa"]) {
		"Documents"
	} else {
		"Items"
	}
}

/// One block per non-empty category, in a fixed category order.
pub(in crate::discord) fn inventory_blocks(items: &[InventoryItem]) -> Vec<ContentBlock> {
	const CATEGORIES: [&str; 5] = ["Weapons", "Food & Drinks", "Medical", "Documents", "Items"];

	let mut blocks = Vec::new();
	for category in CATEGORIES {
		let lines: Vec<String> = items
			.iter()
			.filter(|item| item_category(item) == category)
			.map(|item| format!("{} x{} [Slot: {}]", item.name, item.amount, item.slot))
			.collect();
		if lines.is_empty() {
			continue;
		}
		blocks.push(ContentBlock::new(
			format!("{} ({})", category, lines.len()),
			lines.join("\n"),
		));
	}
	blocks
}

pub(in crate::discord) async fn respond_inventory(
	interaction: &InteractionCreate,
	kind: InteractionResponseType,
	character: &Character,
	owner: Id<UserMarker>,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: &ConfigDocument,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let title = format!("Inventory: {}", character.display_name());
	let blocks = inventory_blocks(character.inventory.value());
	let embeds = paged_embeds(
		&title,
		"Current inventory from the game database.",
		&format!("Citizen ID: {}", character.citizenid),
		"This character is not carrying any items.",
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

	fn item(name: &str) -> InventoryItem {
		serde_json::from_str(&format!(r#"{{"name": "{}", "amount": 2, "slot": 1}}"#, name)).unwrap()
	}

	#[test]
	fn items_categorize_by_name_substring() {
		assert_eq!(item_category(&item("weapon_pistol")), "Weapons");
		assert_eq!(item_category(&item("pistol_ammo")), "Weapons");
		assert_eq!(item_category(&item("water_bottle")), "Food & Drinks");
		assert_eq!(item_category(&item("bandage")), "Medical");
		assert_eq!(item_category(&item("driver_license")), "Documents");
		assert_eq!(item_category(&item("lockpick")), "Items");
	}

	#[test]
	fn blocks_skip_empty_categories_and_keep_order() {
		let items = vec![item("lockpick"), item("weapon_pistol"), item("bandage")];
		let blocks = inventory_blocks(&items);
		let labels: Vec<&str> = blocks.iter().map(|block| block.label.as_str()).collect();
		assert_eq!(labels, vec!["Weapons (1)", "Medical (1)", "Items (1)"]);
		assert_eq!(blocks[0].body, "weapon_pistol x2 [Slot: 1]");
	}

	#[test]
	fn empty_inventory_yields_no_blocks() {
		assert!(inventory_blocks(&[]).is_empty());
	}
}
