// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::bail;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::user::User;

/// The user behind an interaction, whether it arrived from a guild (member
/// data) or a DM.
pub fn interaction_user(interaction: &InteractionCreate) -> miette::Result<&User> {
	if let Some(member) = &interaction.member {
		if let Some(user) = &member.user {
			return Ok(user);
		}
	}
	if let Some(user) = &interaction.user {
		return Ok(user);
	}
	bail!("Interaction isn't associated with a user");
}

pub fn display_name(user: &User) -> &str {
	user.global_name.as_deref().unwrap_or(&user.name)
}
