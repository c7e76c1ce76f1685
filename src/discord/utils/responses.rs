// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::state::{PageSession, PageSessions, expire_page_session};
use crate::discord::utils::components::pagination_row;
use miette::IntoDiagnostic;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use twilight_http::client::Client;
use twilight_model::channel::message::component::Component;
use twilight_model::channel::message::{Embed, MessageFlags};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, UserMarker};
use twilight_util::builder::InteractionResponseDataBuilder;
use type_map::concurrent::TypeMap;

pub const GENERIC_FAILURE: &str = "Something went wrong handling that. Please try again later.";
pub const SESSION_EXPIRED: &str = "This has expired. Run the command again.";
pub const NOT_SESSION_OWNER: &str = "Only the person who ran the command can use these buttons.";

pub fn ephemeral_message(content: impl Into<String>) -> InteractionResponse {
	let data = InteractionResponseDataBuilder::new()
		.content(content)
		.flags(MessageFlags::EPHEMERAL)
		.build();
	InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(data),
	}
}

/// Replaces the interacted-with message's content and removes its components.
pub fn update_to_content(content: impl Into<String>) -> InteractionResponse {
	let data = InteractionResponseDataBuilder::new()
		.content(content)
		.embeds(Vec::new())
		.components(Vec::new())
		.build();
	InteractionResponse {
		kind: InteractionResponseType::UpdateMessage,
		data: Some(data),
	}
}

/// Best-effort delivery of a generic failure notice to the requester. The
/// interaction may or may not have been responded to already, so this tries a
/// fresh response first and falls back to editing the original. Failures here
/// are logged and swallowed; the causing error is what gets propagated.
pub async fn notify_failure(interaction: &InteractionCreate, http_client: &Client, application_id: Id<ApplicationMarker>) {
	let interaction_client = http_client.interaction(application_id);
	let create_result = interaction_client
		.create_response(interaction.id, &interaction.token, &ephemeral_message(GENERIC_FAILURE))
		.await;
	if create_result.is_ok() {
		return;
	}
	let update_result = interaction_client
		.update_response(&interaction.token)
		.content(Some(GENERIC_FAILURE))
		.components(None)
		.await;
	if let Err(error) = update_result {
		tracing::debug!(source = ?error, "failed to deliver a failure notice");
	}
}

/// Responds with the first of `embeds` and, when there's more than one,
/// attaches navigation buttons and registers the page session that drives
/// them. `extra_rows` ride along under the navigation on every page.
pub async fn respond_with_pages(
	interaction: &InteractionCreate,
	kind: InteractionResponseType,
	ephemeral: bool,
	embeds: Vec<Embed>,
	extra_rows: Vec<Component>,
	owner: Id<UserMarker>,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	bot_state: Arc<RwLock<TypeMap>>,
	timeout: Duration,
) -> miette::Result<()> {
	let session_id = cuid2::create_id();
	let (response, session) = prepare_paged_response(
		&session_id,
		kind,
		ephemeral,
		embeds,
		extra_rows,
		owner,
		&interaction.token,
		timeout,
	);
	let paged = session.is_some();

	// The session has to be registered before the response goes out; a click
	// that lands right after the send must find it.
	if let Some(session) = session {
		let mut state = bot_state.write().await;
		let sessions = state.entry::<PageSessions>().or_insert_with(PageSessions::default);
		sessions.sessions.insert(session_id.clone(), session);
	}

	let interaction_client = http_client.interaction(application_id);
	let send_result = interaction_client
		.create_response(interaction.id, &interaction.token, &response)
		.await;
	if let Err(error) = send_result {
		if paged {
			let mut state = bot_state.write().await;
			if let Some(sessions) = state.get_mut::<PageSessions>() {
				sessions.sessions.remove(&session_id);
			}
		}
		return Err(error).into_diagnostic();
	}

	if paged {
		tokio::spawn(expire_page_session(
			bot_state,
			Arc::clone(http_client),
			application_id,
			session_id,
		));
	}

	Ok(())
}

/// Builds the initial response and, for multi-page results, the session that
/// the navigation buttons resolve against. The session is keyed by the same id
/// the buttons carry, so it must be stored before the response is sent.
fn prepare_paged_response(
	session_id: &str,
	kind: InteractionResponseType,
	ephemeral: bool,
	embeds: Vec<Embed>,
	extra_rows: Vec<Component>,
	owner: Id<UserMarker>,
	interaction_token: &str,
	timeout: Duration,
) -> (InteractionResponse, Option<PageSession>) {
	let paged = embeds.len() > 1;

	let mut components: Vec<Component> = Vec::new();
	if paged {
		components.push(pagination_row(session_id, 0, embeds.len()));
	}
	components.extend(extra_rows.iter().cloned());

	let mut data = InteractionResponseDataBuilder::new()
		.embeds([embeds[0].clone()])
		.components(components);
	if ephemeral {
		data = data.flags(MessageFlags::EPHEMERAL);
	}
	let response = InteractionResponse {
		kind,
		data: Some(data.build()),
	};

	let session = paged.then(|| PageSession {
		owner,
		interaction_token: interaction_token.to_string(),
		embeds,
		current_page: 0,
		extra_rows,
		expires_at: Instant::now() + timeout,
	});
	(response, session)
}

#[cfg(test)]
mod tests {
	use super::*;
	use twilight_model::channel::message::component::Button;
	use twilight_util::builder::embed::EmbedBuilder;

	fn embed_pages(count: usize) -> Vec<Embed> {
		(0..count)
			.map(|index| EmbedBuilder::new().description(format!("page {index}")).build())
			.collect()
	}

	#[test]
	fn multi_page_results_get_a_session_matching_the_buttons() {
		let (response, session) = prepare_paged_response(
			"s1",
			InteractionResponseType::ChannelMessageWithSource,
			false,
			embed_pages(3),
			Vec::new(),
			Id::new(1),
			"token",
			Duration::from_secs(300),
		);

		let session = session.expect("multi-page results carry a session");
		assert_eq!(session.embeds.len(), 3);
		assert_eq!(session.current_page, 0);

		let data = response.data.expect("response carries data");
		let components = data.components.expect("response carries components");
		let Component::ActionRow(row) = &components[0] else {
			panic!("expected the navigation row");
		};
		let Component::Button(Button { custom_id, .. }) = &row.components[0] else {
			panic!("expected a navigation button");
		};
		// Buttons resolve against the session id; the caller stores the session
		// under that id before sending.
		assert_eq!(custom_id.as_deref(), Some("page/s1/first"));
	}

	#[test]
	fn single_page_results_have_no_session_or_navigation() {
		let (response, session) = prepare_paged_response(
			"s1",
			InteractionResponseType::ChannelMessageWithSource,
			true,
			embed_pages(1),
			Vec::new(),
			Id::new(1),
			"token",
			Duration::from_secs(300),
		);
		assert!(session.is_none());
		let data = response.data.expect("response carries data");
		assert_eq!(data.components.map(|components| components.len()), Some(0));
		assert_eq!(data.flags, Some(MessageFlags::EPHEMERAL));
	}
}
