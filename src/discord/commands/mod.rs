// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigDocument;
use crate::discord::utils::responses::notify_failure;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use miette::bail;
use std::sync::Arc;
use tokio::sync::RwLock;
use twilight_http::client::Client;
use twilight_model::application::command::Command;
use twilight_model::application::interaction::application_command::{CommandData, CommandOptionValue};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, UserMarker};
use type_map::concurrent::TypeMap;

pub mod characterinfo;
pub mod checkhistory;
pub mod help;
pub mod playerinventory;
pub mod purge;
pub mod setup_tickets;
pub mod userinfo;
pub mod vehicles;

pub fn command_definitions() -> Vec<Command> {
	vec![
		characterinfo::command_definition(),
		checkhistory::command_definition(),
		help::command_definition(),
		playerinventory::command_definition(),
		purge::command_definition(),
		setup_tickets::command_definition(),
		userinfo::command_definition(),
		vehicles::command_definition(),
	]
}

pub async fn route_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	db_connection_pool: Pool<ConnectionManager<MysqlConnection>>,
	config: Arc<ConfigDocument>,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let result = match command_data.name.as_str() {
		"characterinfo" => {
			characterinfo::handle_command(
				interaction,
				command_data,
				http_client,
				application_id,
				db_connection_pool,
				config,
				bot_state,
			)
			.await
		}
		"checkhistory" => checkhistory::handle_command(interaction, http_client, application_id, config).await,
		"help" => help::handle_command(interaction, command_data, http_client, application_id, config).await,
		"playerinventory" => {
			playerinventory::handle_command(
				interaction,
				command_data,
				http_client,
				application_id,
				db_connection_pool,
				config,
				bot_state,
			)
			.await
		}
		"purge" => purge::handle_command(interaction, command_data, http_client, application_id, config).await,
		"setup_tickets" => setup_tickets::handle_command(interaction, http_client, application_id, config).await,
		"userinfo" => {
			userinfo::handle_command(
				interaction,
				command_data,
				http_client,
				application_id,
				db_connection_pool,
				config,
			)
			.await
		}
		"vehicles" => {
			vehicles::handle_command(
				interaction,
				command_data,
				http_client,
				application_id,
				db_connection_pool,
				config,
				bot_state,
			)
			.await
		}
		_ => bail!("Unknown command encountered: {}\n{:?}", command_data.name, command_data),
	};

	// The requester gets a generic notice; the full error goes to the log.
	if result.is_err() {
		notify_failure(interaction, http_client, application_id).await;
	}
	result
}

pub(super) fn user_option(command_data: &CommandData, name: &str) -> Option<Id<UserMarker>> {
	command_data.options.iter().find_map(|option| {
		if option.name == name {
			if let CommandOptionValue::User(user_id) = option.value {
				return Some(user_id);
			}
		}
		None
	})
}

pub(super) fn integer_option(command_data: &CommandData, name: &str) -> Option<i64> {
	command_data.options.iter().find_map(|option| {
		if option.name == name {
			if let CommandOptionValue::Integer(value) = option.value {
				return Some(value);
			}
		}
		None
	})
}

pub(super) fn string_option<'a>(command_data: &'a CommandData, name: &str) -> Option<&'a str> {
	command_data.options.iter().find_map(|option| {
		if option.name == name {
			if let CommandOptionValue::String(value) = &option.value {
				return Some(value.as_str());
			}
		}
		None
	})
}
