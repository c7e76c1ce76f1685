// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::pager::page_indicator;
use twilight_model::channel::message::component::{ActionRow, Button, ButtonStyle, Component};

const MAX_BUTTONS_PER_ROW: usize = 5;
const MAX_ROWS_PER_MESSAGE: usize = 5;

pub fn button(custom_id: String, label: String, style: ButtonStyle, disabled: bool) -> Component {
	Component::Button(Button {
		custom_id: Some(custom_id),
		disabled,
		emoji: None,
		label: Some(label),
		style,
		url: None,
		sku_id: None,
	})
}

/// The five-control navigation row for a page session: first, previous, the
/// page indicator, next, last. Controls that would do nothing at the current
/// page are disabled; the indicator always is.
pub fn pagination_row(session_id: &str, page: usize, page_count: usize) -> Component {
	let at_first = page == 0;
	let at_last = page + 1 >= page_count;
	Component::ActionRow(ActionRow {
		components: vec![
			button(
				format!("page/{}/first", session_id),
				String::from("≪"),
				ButtonStyle::Primary,
				at_first,
			),
			button(
				format!("page/{}/previous", session_id),
				String::from("Prev"),
				ButtonStyle::Primary,
				at_first,
			),
			button(
				format!("page/{}/indicator", session_id),
				page_indicator(page, page_count),
				ButtonStyle::Secondary,
				true,
			),
			button(
				format!("page/{}/next", session_id),
				String::from("Next"),
				ButtonStyle::Primary,
				at_last,
			),
			button(
				format!("page/{}/last", session_id),
				String::from("≫"),
				ButtonStyle::Primary,
				at_last,
			),
		],
	})
}

/// Button rows for picking one entry out of a list, five per row. Discord
/// allows five rows per message, so anything past the first twenty-five
/// entries is dropped.
pub fn selection_rows(kind: &str, session_id: &str, entries: &[(String, String)]) -> Vec<Component> {
	entries
		.chunks(MAX_BUTTONS_PER_ROW)
		.take(MAX_ROWS_PER_MESSAGE)
		.map(|chunk| {
			Component::ActionRow(ActionRow {
				components: chunk
					.iter()
					.map(|(value, label)| {
						button(
							format!("{}/{}/{}", kind, session_id, value),
							label.clone(),
							ButtonStyle::Secondary,
							false,
						)
					})
					.collect(),
			})
		})
		.collect()
}

pub fn button_row(buttons: Vec<Component>) -> Component {
	Component::ActionRow(ActionRow { components: buttons })
}

pub fn confirm_cancel_row(confirm_id: String, confirm_label: String, cancel_id: String) -> Component {
	Component::ActionRow(ActionRow {
		components: vec![
			button(confirm_id, confirm_label, ButtonStyle::Danger, false),
			button(cancel_id, String::from("Cancel"), ButtonStyle::Secondary, false),
		],
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row_buttons(component: &Component) -> Vec<&Button> {
		let Component::ActionRow(row) = component else {
			panic!("expected an action row");
		};
		row.components
			.iter()
			.map(|inner| {
				let Component::Button(button) = inner else {
					panic!("expected a button");
				};
				button
			})
			.collect()
	}

	#[test]
	fn first_page_disables_backward_controls() {
		let row = pagination_row("abc", 0, 4);
		let buttons = row_buttons(&row);
		assert_eq!(buttons.len(), 5);
		assert!(buttons[0].disabled);
		assert!(buttons[1].disabled);
		assert!(buttons[2].disabled);
		assert!(!buttons[3].disabled);
		assert!(!buttons[4].disabled);
		assert_eq!(buttons[2].label.as_deref(), Some("1/4"));
	}

	#[test]
	fn last_page_disables_forward_controls() {
		let row = pagination_row("abc", 3, 4);
		let buttons = row_buttons(&row);
		assert!(!buttons[0].disabled);
		assert!(!buttons[1].disabled);
		assert!(buttons[3].disabled);
		assert!(buttons[4].disabled);
		assert_eq!(buttons[2].label.as_deref(), Some("4/4"));
	}

	#[test]
	fn pagination_custom_ids_carry_session_and_action() {
		let row = pagination_row("session123", 1, 3);
		let buttons = row_buttons(&row);
		assert_eq!(buttons[0].custom_id.as_deref(), Some("page/session123/first"));
		assert_eq!(buttons[4].custom_id.as_deref(), Some("page/session123/last"));
	}

	#[test]
	fn selection_rows_chunk_by_five_and_cap_at_twenty_five() {
		let entries: Vec<(String, String)> = (0..30)
			.map(|index| (format!("CID{index}"), format!("Character {index}")))
			.collect();
		let rows = selection_rows("charinfo", "s1", &entries);
		assert_eq!(rows.len(), 5);
		for row in &rows {
			assert_eq!(row_buttons(row).len(), 5);
		}
		let first = row_buttons(&rows[0]);
		assert_eq!(first[0].custom_id.as_deref(), Some("charinfo/s1/CID0"));
	}
}
