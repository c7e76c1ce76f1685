// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigDocument;
use crate::discord::state::{PageSession, PageSessions};
use crate::discord::utils::components::pagination_row;
use crate::discord::utils::responses::{NOT_SESSION_OWNER, ephemeral_message};
use crate::discord::utils::users::interaction_user;
use crate::pager::NavAction;
use miette::{IntoDiagnostic, bail};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use twilight_http::client::Client;
use twilight_model::channel::message::component::Component;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::InteractionResponseDataBuilder;
use type_map::concurrent::TypeMap;

pub async fn route_pagination_interaction(
	interaction: &InteractionCreate,
	custom_id_path: &[String],
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	bot_state: Arc<RwLock<TypeMap>>,
	config: &ConfigDocument,
) -> miette::Result<()> {
	let (Some(session_id), Some(action)) = (custom_id_path.get(1), custom_id_path.get(2)) else {
		bail!("Invalid custom ID for pagination (parts: {:?})", custom_id_path);
	};
	let Some(action) = NavAction::from_id(action) else {
		bail!("Invalid pagination action: {} (parts: {:?})", action, custom_id_path);
	};

	let invoker = interaction_user(interaction)?;
	let invoker_id = invoker.id;

	// Decide on the response while holding the state lock, but only send it
	// after the lock is released; a slow or rate-limited Discord call must not
	// stall every other handler that needs the state.
	let response = {
		let mut state = bot_state.write().await;
		let session = state
			.get_mut::<PageSessions>()
			.and_then(|sessions| sessions.sessions.get_mut(session_id));
		match session {
			None => {
				// The session is gone; all that's left to do is remove the
				// now-dead buttons.
				let data = InteractionResponseDataBuilder::new().components(Vec::new()).build();
				InteractionResponse {
					kind: InteractionResponseType::UpdateMessage,
					data: Some(data),
				}
			}
			Some(session) if session.owner != invoker_id => ephemeral_message(NOT_SESSION_OWNER),
			Some(session) => transition_update(
				session,
				session_id,
				action,
				Duration::from_secs(config.sessions.page_timeout_seconds),
			),
		}
	};

	let interaction_client = http_client.interaction(application_id);
	interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}

/// Applies an accepted transition to the session, refreshes its expiry, and
/// builds the message update showing the new page.
fn transition_update(
	session: &mut PageSession,
	session_id: &str,
	action: NavAction,
	timeout: Duration,
) -> InteractionResponse {
	session.current_page = action.apply(session.current_page, session.embeds.len());
	session.expires_at = Instant::now() + timeout;

	let mut components: Vec<Component> =
		vec![pagination_row(session_id, session.current_page, session.embeds.len())];
	components.extend(session.extra_rows.iter().cloned());
	let data = InteractionResponseDataBuilder::new()
		.embeds([session.embeds[session.current_page].clone()])
		.components(components)
		.build();
	InteractionResponse {
		kind: InteractionResponseType::UpdateMessage,
		data: Some(data),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use twilight_model::channel::message::component::Button;
	use twilight_util::builder::embed::EmbedBuilder;

	fn test_session(pages: usize) -> PageSession {
		PageSession {
			owner: Id::new(1),
			interaction_token: String::from("token"),
			embeds: (0..pages)
				.map(|index| EmbedBuilder::new().description(format!("page {index}")).build())
				.collect(),
			current_page: 0,
			extra_rows: Vec::new(),
			expires_at: Instant::now(),
		}
	}

	#[test]
	fn transition_advances_page_and_rebuilds_controls() {
		let mut session = test_session(3);
		let before = session.expires_at;
		let response = transition_update(&mut session, "s1", NavAction::Next, Duration::from_secs(300));

		assert_eq!(session.current_page, 1);
		assert!(session.expires_at > before);
		assert_eq!(response.kind, InteractionResponseType::UpdateMessage);

		let data = response.data.expect("update carries data");
		let embeds = data.embeds.expect("update carries an embed");
		assert_eq!(embeds[0].description.as_deref(), Some("page 1"));

		let components = data.components.expect("update carries components");
		let Component::ActionRow(row) = &components[0] else {
			panic!("expected the navigation row");
		};
		let Component::Button(Button { label, .. }) = &row.components[2] else {
			panic!("expected the indicator button");
		};
		assert_eq!(label.as_deref(), Some("2/3"));
	}

	#[test]
	fn transition_saturates_at_the_last_page() {
		let mut session = test_session(2);
		session.current_page = 1;
		transition_update(&mut session, "s1", NavAction::Next, Duration::from_secs(300));
		assert_eq!(session.current_page, 1);
	}
}
