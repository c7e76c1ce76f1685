// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigDocument;
use crate::discord::commands::characterinfo::respond_character_detail;
use crate::discord::commands::playerinventory::respond_inventory;
use crate::discord::commands::vehicles::respond_vehicle_detail;
use crate::discord::state::SelectionSessions;
use crate::discord::utils::queries::{character_by_citizenid, vehicle_by_plate};
use crate::discord::utils::responses::{NOT_SESSION_OWNER, SESSION_EXPIRED, ephemeral_message, update_to_content};
use crate::discord::utils::users::interaction_user;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use miette::{IntoDiagnostic, bail};
use std::sync::Arc;
use tokio::sync::RwLock;
use twilight_http::client::Client;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::InteractionResponseType;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, UserMarker};
use type_map::concurrent::TypeMap;

/// Outcome of checking a selection click against the session store.
#[derive(Debug, Eq, PartialEq)]
enum SessionClaim {
	Expired,
	NotOwner,
	Accepted,
}

/// Checks the click against the stored session and, when it is the owner's,
/// consumes the session. Runs entirely under the caller's state lock; the
/// rejection or detail response is sent after the lock is released.
fn claim_session(state: &mut TypeMap, session_id: &str, invoker_id: Id<UserMarker>) -> SessionClaim {
	let owner = state
		.get::<SelectionSessions>()
		.and_then(|sessions| sessions.sessions.get(session_id))
		.map(|session| session.owner);
	let Some(owner) = owner else {
		return SessionClaim::Expired;
	};
	if owner != invoker_id {
		return SessionClaim::NotOwner;
	}
	if let Some(sessions) = state.get_mut::<SelectionSessions>() {
		sessions.sessions.remove(session_id);
	}
	SessionClaim::Accepted
}

/// Handles a click on a character or vehicle selection button. The custom ID
/// carries the selection kind, the session, and the selected key; the session
/// is consumed by the first accepted click.
pub async fn route_selection_interaction(
	interaction: &InteractionCreate,
	custom_id_path: &[String],
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	db_connection_pool: Pool<ConnectionManager<MysqlConnection>>,
	config: &ConfigDocument,
	bot_state: Arc<RwLock<TypeMap>>,
) -> miette::Result<()> {
	let (Some(kind), Some(session_id), Some(key)) =
		(custom_id_path.first(), custom_id_path.get(1), custom_id_path.get(2))
	else {
		bail!("Invalid custom ID for selection (parts: {:?})", custom_id_path);
	};

	let invoker = interaction_user(interaction)?;
	let invoker_id = invoker.id;
	let interaction_client = http_client.interaction(application_id);

	let claim = {
		let mut state = bot_state.write().await;
		claim_session(&mut state, session_id, invoker_id)
	};
	match claim {
		SessionClaim::Expired => {
			interaction_client
				.create_response(interaction.id, &interaction.token, &update_to_content(SESSION_EXPIRED))
				.await
				.into_diagnostic()?;
			return Ok(());
		}
		SessionClaim::NotOwner => {
			interaction_client
				.create_response(interaction.id, &interaction.token, &ephemeral_message(NOT_SESSION_OWNER))
				.await
				.into_diagnostic()?;
			return Ok(());
		}
		SessionClaim::Accepted => (),
	}

	let mut db_connection = db_connection_pool.get().into_diagnostic()?;

	match kind.as_str() {
		"charinfo" => {
			let Some(character) = character_by_citizenid(&mut db_connection, key).into_diagnostic()? else {
				interaction_client
					.create_response(
						interaction.id,
						&interaction.token,
						&update_to_content("That character no longer exists."),
					)
					.await
					.into_diagnostic()?;
				return Ok(());
			};
			respond_character_detail(
				interaction,
				InteractionResponseType::UpdateMessage,
				&character,
				invoker_id,
				http_client,
				application_id,
				config,
				bot_state,
			)
			.await
		}
		"inventory" => {
			let Some(character) = character_by_citizenid(&mut db_connection, key).into_diagnostic()? else {
				interaction_client
					.create_response(
						interaction.id,
						&interaction.token,
						&update_to_content("That character no longer exists."),
					)
					.await
					.into_diagnostic()?;
				return Ok(());
			};
			respond_inventory(
				interaction,
				InteractionResponseType::UpdateMessage,
				&character,
				invoker_id,
				http_client,
				application_id,
				config,
				bot_state,
			)
			.await
		}
		"vehicle" => {
			let Some(vehicle) = vehicle_by_plate(&mut db_connection, key).into_diagnostic()? else {
				interaction_client
					.create_response(
						interaction.id,
						&interaction.token,
						&update_to_content("That vehicle no longer exists."),
					)
					.await
					.into_diagnostic()?;
				return Ok(());
			};
			respond_vehicle_detail(
				interaction,
				InteractionResponseType::UpdateMessage,
				&vehicle,
				invoker_id,
				http_client,
				application_id,
				config,
				bot_state,
			)
			.await
		}
		_ => bail!("Invalid selection kind: {} (parts: {:?})", kind, custom_id_path),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::discord::state::SelectionSession;
	use tokio::time::Instant;

	fn state_with_session(session_id: &str, owner: u64) -> TypeMap {
		let mut state = TypeMap::new();
		let mut sessions = SelectionSessions::default();
		sessions.sessions.insert(
			session_id.to_string(),
			SelectionSession {
				owner: Id::new(owner),
				interaction_token: String::from("token"),
				expires_at: Instant::now(),
			},
		);
		state.insert(sessions);
		state
	}

	#[test]
	fn missing_session_reads_as_expired() {
		let mut state = TypeMap::new();
		assert_eq!(claim_session(&mut state, "s1", Id::new(1)), SessionClaim::Expired);
	}

	#[test]
	fn other_users_cannot_consume_a_session() {
		let mut state = state_with_session("s1", 1);
		assert_eq!(claim_session(&mut state, "s1", Id::new(2)), SessionClaim::NotOwner);
		// The rejection must leave the session in place for its owner.
		assert_eq!(claim_session(&mut state, "s1", Id::new(1)), SessionClaim::Accepted);
	}

	#[test]
	fn accepted_click_consumes_the_session() {
		let mut state = state_with_session("s1", 1);
		assert_eq!(claim_session(&mut state, "s1", Id::new(1)), SessionClaim::Accepted);
		assert_eq!(claim_session(&mut state, "s1", Id::new(1)), SessionClaim::Expired);
	}
}
