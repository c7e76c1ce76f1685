// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::IntoDiagnostic;
use twilight_http::client::Client;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, RoleMarker};

use super::responses::ephemeral_message;

const MISSING_ROLE: &str = "You don't have permission to use this.";

pub fn member_has_role(interaction: &InteractionCreate, role_id: u64) -> bool {
	let role_id: Id<RoleMarker> = Id::new(role_id);
	interaction
		.member
		.as_ref()
		.is_some_and(|member| member.roles.contains(&role_id))
}

/// Checks that the interaction comes from a guild member holding `role_id`.
/// Sends the rejection itself and returns false when the check fails, so
/// callers can just return early.
pub async fn require_role(
	interaction: &InteractionCreate,
	role_id: u64,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<bool> {
	if member_has_role(interaction, role_id) {
		return Ok(true);
	}
	let interaction_client = http_client.interaction(application_id);
	interaction_client
		.create_response(interaction.id, &interaction.token, &ephemeral_message(MISSING_ROLE))
		.await
		.into_diagnostic()?;
	Ok(false)
}
