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
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::application::interaction::modal::ModalInteractionData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use type_map::concurrent::TypeMap;

mod history;
mod pagination;
mod purge;
mod selection;
mod tickets;

pub async fn route_interaction(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	db_connection_pool: Pool<ConnectionManager<MysqlConnection>>,
	config: Arc<ConfigDocument>,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let custom_id_path: Vec<String> = interaction_data.custom_id.split('/').map(|s| s.to_string()).collect();

	let result = match custom_id_path.first().map(|s| s.as_str()) {
		Some("page") => {
			pagination::route_pagination_interaction(
				interaction,
				&custom_id_path,
				http_client,
				application_id,
				bot_state,
				&config,
			)
			.await
		}
		Some("charinfo") | Some("inventory") | Some("vehicle") => {
			selection::route_selection_interaction(
				interaction,
				&custom_id_path,
				http_client,
				application_id,
				db_connection_pool,
				&config,
				bot_state,
			)
			.await
		}
		Some("history") => {
			history::route_history_interaction(
				interaction,
				&custom_id_path,
				http_client,
				application_id,
				&config,
				bot_state,
			)
			.await
		}
		Some("purge") => purge::route_purge_interaction(interaction, &custom_id_path, http_client, application_id).await,
		Some("ticket") => {
			tickets::route_ticket_interaction(
				interaction,
				interaction_data,
				&custom_id_path,
				http_client,
				application_id,
				db_connection_pool,
				&config,
				bot_state,
			)
			.await
		}
		_ => bail!(
			"Unknown component interaction encountered: {}",
			interaction_data.custom_id
		),
	};

	if result.is_err() {
		notify_failure(interaction, http_client, application_id).await;
	}
	result
}

pub async fn route_modal_submit(
	interaction: &InteractionCreate,
	modal_data: &ModalInteractionData,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	config: Arc<ConfigDocument>,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let custom_id_path: Vec<String> = modal_data.custom_id.split('/').map(|s| s.to_string()).collect();

	let result = match custom_id_path.first().map(|s| s.as_str()) {
		Some("ticket") => {
			tickets::route_ticket_modal(
				interaction,
				modal_data,
				&custom_id_path,
				http_client,
				application_id,
				&config,
				bot_state,
			)
			.await
		}
		_ => bail!("Unknown modal submission encountered: {}", modal_data.custom_id),
	};

	if result.is_err() {
		notify_failure(interaction, http_client, application_id).await;
	}
	result
}
