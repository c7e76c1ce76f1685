// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Turns a built [PageSet] into Discord embeds. The pager limits here are
//! Discord's embed limits; they're validated once at startup.

use crate::pager::{ContentBlock, PageSet, PagerConfig, text_width};
use twilight_model::channel::message::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder};
use twilight_validate::embed::EmbedValidationError;

pub const MAX_TITLE_LENGTH: usize = 256;
pub const MAX_DESCRIPTION_LENGTH: usize = 4096;
pub const MAX_FIELD_NAME_LENGTH: usize = 256;
pub const MAX_FIELD_VALUE_LENGTH: usize = 1024;
pub const MAX_FOOTER_LENGTH: usize = 2048;
pub const MAX_EMBED_TOTAL_LENGTH: usize = 6000;
pub const MAX_FIELDS_PER_EMBED: usize = 25;

/// The pager limits for content rendered into embed fields. The overhead is
/// the combined length of the fixed parts every page repeats (title,
/// description, footer).
pub fn embed_pager_config(page_overhead: usize) -> PagerConfig {
	PagerConfig {
		max_field_size: MAX_FIELD_VALUE_LENGTH,
		max_fields_per_page: MAX_FIELDS_PER_EMBED,
		max_page_weight: MAX_EMBED_TOTAL_LENGTH,
		page_overhead,
		separator: String::from("\n"),
	}
}

pub fn page_overhead(title: &str, description: &str, footer: &str) -> usize {
	// Leave room for the " • Page nn/nn" footer suffix on multi-page sets.
	text_width(title) + text_width(description) + text_width(footer) + 16
}

/// Pages `blocks` and renders one embed per page. Empty input produces a
/// single embed whose description is `empty_text` instead of `description`.
pub fn paged_embeds(
	title: &str,
	description: &str,
	footer: &str,
	empty_text: &str,
	color: u32,
	blocks: &[ContentBlock],
) -> Result<Vec<Embed>, EmbedValidationError> {
	let config = embed_pager_config(page_overhead(title, description, footer));
	let page_set = PageSet::build(blocks, &config);

	if page_set.is_placeholder() {
		let embed = EmbedBuilder::new()
			.title(title)
			.color(color)
			.description(empty_text)
			.footer(EmbedFooterBuilder::new(footer))
			.validate()?
			.build();
		return Ok(vec![embed]);
	}

	let mut embeds = Vec::with_capacity(page_set.len());
	for page in page_set.pages() {
		let mut builder = EmbedBuilder::new().title(title).color(color).description(description);
		for field in page.fields() {
			builder = builder.field(EmbedFieldBuilder::new(&field.name, &field.value));
		}
		let footer_text = match page.trailer() {
			Some(trailer) => format!("{} • {}", footer, trailer),
			None => footer.to_string(),
		};
		builder = builder.footer(EmbedFooterBuilder::new(footer_text));
		embeds.push(builder.validate()?.build());
	}
	Ok(embeds)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pager::ContentBlock;

	#[test]
	fn empty_blocks_render_placeholder_embed() {
		let embeds = paged_embeds("Inventory", "Items", "Requested by staff", "No items found.", 0xe81d1d, &[])
			.expect("embed renders");
		assert_eq!(embeds.len(), 1);
		assert_eq!(embeds[0].description.as_deref(), Some("No items found."));
		assert!(embeds[0].fields.is_empty());
	}

	#[test]
	fn single_page_has_no_page_counter() {
		let blocks = [ContentBlock::new("Weapons", "pistol x1")];
		let embeds = paged_embeds("Inventory", "Items", "Requested by staff", "No items.", 0xe81d1d, &blocks)
			.expect("embed renders");
		assert_eq!(embeds.len(), 1);
		let footer = embeds[0].footer.as_ref().expect("footer set");
		assert_eq!(footer.text, "Requested by staff");
	}

	#[test]
	fn multi_page_footers_count_pages() {
		let blocks: Vec<ContentBlock> = (0..10)
			.map(|index| ContentBlock::new(format!("Section {index}"), "x".repeat(1000)))
			.collect();
		let embeds = paged_embeds("History", "Records", "Requested by staff", "No records.", 0xe81d1d, &blocks)
			.expect("embed renders");
		assert!(embeds.len() > 1);
		let first_footer = embeds[0].footer.as_ref().expect("footer set");
		assert_eq!(first_footer.text, format!("Requested by staff • Page 1/{}", embeds.len()));
	}

	#[test]
	fn rendered_embeds_honor_discord_limits() {
		let blocks: Vec<ContentBlock> = (0..40)
			.map(|index| ContentBlock::new(format!("Block {index}"), "line\n".repeat(300)))
			.collect();
		let embeds = paged_embeds("Big", "Lots of data", "footer", "empty", 0xe81d1d, &blocks).expect("embed renders");
		for embed in &embeds {
			assert!(embed.fields.len() <= MAX_FIELDS_PER_EMBED);
			let mut total = 0;
			total += embed.title.as_ref().map(|title| title.chars().count()).unwrap_or(0);
			total += embed
				.description
				.as_ref()
				.map(|description| description.chars().count())
				.unwrap_or(0);
			total += embed.footer.as_ref().map(|footer| footer.text.chars().count()).unwrap_or(0);
			for field in &embed.fields {
				assert!(field.value.chars().count() <= MAX_FIELD_VALUE_LENGTH);
				total += field.name.chars().count() + field.value.chars().count();
			}
			assert!(total <= MAX_EMBED_TOTAL_LENGTH);
		}
	}

	#[test]
	fn startup_config_is_valid() {
		assert!(embed_pager_config(0).validate().is_ok());
	}
}
