// © 2025 the Copper Badge development team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Splits unbounded labeled text content into size-bounded pages and models the
//! button-driven navigation over the result. Everything in this module is pure
//! bookkeeping over its arguments; callers own the platform limits, the rendered
//! representation, and the session that drives [NavAction] transitions.

use miette::Diagnostic;
use std::error::Error;
use std::fmt;

/// One logical section of output (a category of inventory items, a moderation
/// record, a stats block) before any size bounding is applied. The body may be
/// arbitrarily long.
#[derive(Clone, Debug)]
pub struct ContentBlock {
	pub label: String,
	pub body: String,
}

impl ContentBlock {
	pub fn new(label: impl Into<String>, body: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			body: body.into(),
		}
	}
}

/// A named, size-bounded unit placed onto a [Page]. The value never exceeds the
/// configured field size; the name is assumed pre-validated by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageField {
	pub name: String,
	pub value: String,
}

/// The limits under which pages are assembled. Callers supply the target
/// platform's numbers; [Self::validate] must be run once at startup so that
/// building is total afterwards.
///
/// There is deliberately no cap on the combined weight of a whole [PageSet]:
/// a set grows to as many pages as the input needs, and only one page is ever
/// rendered at a time, so a total-weight limit would have nothing to bound.
#[derive(Clone, Debug)]
pub struct PagerConfig {
	/// Maximum size of a single field value, in characters.
	pub max_field_size: usize,
	/// Maximum number of fields on one page.
	pub max_fields_per_page: usize,
	/// Maximum combined character weight of one page, including the overhead.
	pub max_page_weight: usize,
	/// Fixed weight every page starts with (title, footer, and similar
	/// per-page decoration the caller counts against the page budget).
	pub page_overhead: usize,
	/// The line separator chunking tries to keep intact.
	pub separator: String,
}

impl PagerConfig {
	pub fn validate(&self) -> Result<(), PagerConfigError> {
		if self.max_field_size == 0 {
			return Err(PagerConfigError::new("max_field_size"));
		}
		if self.max_fields_per_page == 0 {
			return Err(PagerConfigError::new("max_fields_per_page"));
		}
		if self.max_page_weight == 0 {
			return Err(PagerConfigError::new("max_page_weight"));
		}
		Ok(())
	}
}

/// The pager was handed limits under which no page could ever be built.
#[derive(Debug, Diagnostic)]
pub struct PagerConfigError {
	setting: &'static str,
}

impl PagerConfigError {
	fn new(setting: &'static str) -> Self {
		Self { setting }
	}
}

impl fmt::Display for PagerConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "invalid pager configuration: {} must be greater than zero", self.setting)
	}
}

impl Error for PagerConfigError {}

/// Character count of a string. All pager limits are counted in characters, not
/// bytes, to match how the platform counts its limits.
pub fn text_width(text: &str) -> usize {
	text.chars().count()
}

/// Splits `text` into pieces of at most `max_chunk_size` characters, keeping
/// lines (as delimited by `separator`) intact wherever possible.
///
/// A single line longer than `max_chunk_size` is hard-split at fixed
/// `max_chunk_size` boundaries; this is the one case in which rejoining the
/// output loses separator alignment (the affected pieces rejoin with no
/// separator). No characters are ever dropped, and no returned chunk is empty.
pub fn chunk(text: &str, max_chunk_size: usize, separator: &str) -> Vec<String> {
	if text_width(text) <= max_chunk_size {
		return vec![text.to_string()];
	}

	let separator_width = text_width(separator);
	let mut chunks: Vec<String> = Vec::new();
	let mut current = String::new();
	let mut current_width = 0;

	for line in text.split(separator) {
		let line_width = text_width(line);
		if line_width > max_chunk_size {
			if !current.is_empty() {
				chunks.push(std::mem::take(&mut current));
				current_width = 0;
			}
			let mut rest = line;
			while !rest.is_empty() {
				let split_at = rest
					.char_indices()
					.nth(max_chunk_size)
					.map(|(index, _)| index)
					.unwrap_or(rest.len());
				let (piece, remainder) = rest.split_at(split_at);
				chunks.push(piece.to_string());
				rest = remainder;
			}
		} else if !current.is_empty() && current_width + separator_width + line_width > max_chunk_size {
			chunks.push(std::mem::take(&mut current));
			current.push_str(line);
			current_width = line_width;
		} else {
			if !current.is_empty() {
				current.push_str(separator);
				current_width += separator_width;
			}
			current.push_str(line);
			current_width += line_width;
		}
	}

	if !current.is_empty() {
		chunks.push(current);
	}

	chunks
}

/// One screen of output: an ordered set of fields whose combined weight and
/// count honor the limits the page was built under. Closed pages are never
/// modified again except for the final trailer stamp.
#[derive(Clone, Debug)]
pub struct Page {
	fields: Vec<PageField>,
	weight: usize,
	trailer: Option<String>,
}

impl Page {
	fn new(overhead: usize) -> Self {
		Self {
			fields: Vec::new(),
			weight: overhead,
			trailer: None,
		}
	}

	pub fn fields(&self) -> &[PageField] {
		&self.fields
	}

	pub fn weight(&self) -> usize {
		self.weight
	}

	/// The "Page i/N" stamp; only present when the owning set has more than
	/// one page.
	pub fn trailer(&self) -> Option<&str> {
		self.trailer.as_deref()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

/// The complete ordered result of paging a list of [ContentBlock]s. Never
/// empty: zero input blocks produce a single fieldless page the caller is
/// expected to fill with a placeholder description.
#[derive(Clone, Debug)]
pub struct PageSet {
	pages: Vec<Page>,
}

impl PageSet {
	/// Packs `blocks` into pages under `config`.
	///
	/// Bodies longer than the field size limit are chunked with [chunk] and
	/// their fields renamed to `label (i/n)`; a field that would push the open
	/// page past its field count or weight budget closes the page and starts a
	/// new one. Block order and chunk order are preserved.
	pub fn build(blocks: &[ContentBlock], config: &PagerConfig) -> Self {
		let mut pages: Vec<Page> = Vec::new();
		let mut open_page = Page::new(config.page_overhead);

		for block in blocks {
			let fields = block_fields(block, config);
			for field in fields {
				let field_weight = text_width(&field.name) + text_width(&field.value);
				let overflows_count = open_page.fields.len() + 1 > config.max_fields_per_page;
				let overflows_weight = open_page.weight + field_weight > config.max_page_weight;
				if (overflows_count || overflows_weight) && !open_page.is_empty() {
					pages.push(std::mem::replace(&mut open_page, Page::new(config.page_overhead)));
				}
				open_page.fields.push(field);
				open_page.weight += field_weight;
			}
		}
		// The final page closes here; with zero input it is the set's single
		// empty page.
		pages.push(open_page);

		let page_count = pages.len();
		if page_count > 1 {
			for (index, page) in pages.iter_mut().enumerate() {
				page.trailer = Some(format!("Page {}/{}", index + 1, page_count));
			}
		}

		Self { pages }
	}

	pub fn pages(&self) -> &[Page] {
		&self.pages
	}

	pub fn len(&self) -> usize {
		self.pages.len()
	}

	pub fn get(&self, index: usize) -> Option<&Page> {
		self.pages.get(index)
	}

	/// True when no input block contributed a field; the set still contains
	/// exactly one (empty) page.
	pub fn is_placeholder(&self) -> bool {
		self.pages.len() == 1 && self.pages[0].is_empty()
	}
}

fn block_fields(block: &ContentBlock, config: &PagerConfig) -> Vec<PageField> {
	if text_width(&block.body) <= config.max_field_size {
		return vec![PageField {
			name: block.label.clone(),
			value: block.body.clone(),
		}];
	}

	let chunks = chunk(&block.body, config.max_field_size, &config.separator);
	let chunk_count = chunks.len();
	chunks
		.into_iter()
		.enumerate()
		.map(|(index, value)| {
			let name = if chunk_count > 1 {
				format!("{} ({}/{})", block.label, index + 1, chunk_count)
			} else {
				block.label.clone()
			};
			PageField { name, value }
		})
		.collect()
}

/// A navigation control over a [PageSet]. Every transition is total:
/// transitions that would leave the valid index range stay at the edge instead
/// of erroring, matching controls that are rendered disabled at the edges.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NavAction {
	First,
	Previous,
	Next,
	Last,
}

impl NavAction {
	pub fn from_id(id: &str) -> Option<Self> {
		match id {
			"first" => Some(Self::First),
			"previous" => Some(Self::Previous),
			"next" => Some(Self::Next),
			"last" => Some(Self::Last),
			_ => None,
		}
	}

	pub fn as_id(&self) -> &'static str {
		match self {
			Self::First => "first",
			Self::Previous => "previous",
			Self::Next => "next",
			Self::Last => "last",
		}
	}

	/// Applies the transition to a current page index within a set of
	/// `page_count` pages.
	pub fn apply(&self, page: usize, page_count: usize) -> usize {
		let last = page_count.saturating_sub(1);
		match self {
			Self::First => 0,
			Self::Previous => page.saturating_sub(1),
			Self::Next => (page + 1).min(last),
			Self::Last => last,
		}
	}
}

/// The "current/total" label shown between the navigation controls.
pub fn page_indicator(page: usize, page_count: usize) -> String {
	format!("{}/{}", page + 1, page_count)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config(max_field_size: usize, max_fields_per_page: usize, max_page_weight: usize) -> PagerConfig {
		PagerConfig {
			max_field_size,
			max_fields_per_page,
			max_page_weight,
			page_overhead: 0,
			separator: String::from("\n"),
		}
	}

	#[test]
	fn chunk_returns_short_text_unchanged() {
		assert_eq!(chunk("hello", 10, "\n"), vec!["hello"]);
		assert_eq!(chunk("", 10, "\n"), vec![""]);
	}

	#[test]
	fn chunk_round_trips_line_aligned_input() {
		let text = "alpha\nbeta\ngamma\ndelta\nepsilon\nzeta";
		let chunks = chunk(text, 12, "\n");
		assert!(chunks.len() > 1);
		assert_eq!(chunks.join("\n"), text);
	}

	#[test]
	fn chunk_respects_size_bound() {
		let text = "one\ntwo\nthree\nfour\nfive\nsix\nseven\neight";
		for max in 1..=text.len() {
			for piece in chunk(text, max, "\n") {
				assert!(piece.chars().count() <= max, "chunk {:?} exceeds {}", piece, max);
			}
		}
	}

	#[test]
	fn chunk_hard_splits_oversized_line_without_loss() {
		let line = "0123456789ABCDEF";
		let chunks = chunk(line, 10, "\n");
		assert_eq!(chunks, vec!["0123456789", "ABCDEF"]);
		assert_eq!(chunks.concat(), line);
	}

	#[test]
	fn chunk_counts_characters_not_bytes() {
		let text = "ééééé";
		let chunks = chunk(text, 2, "\n");
		assert_eq!(chunks, vec!["éé", "éé", "é"]);
		assert_eq!(chunks.concat(), text);
	}

	#[test]
	fn chunk_flushes_buffer_before_hard_split() {
		let text = "short\n0123456789ABCDEF\nend";
		let chunks = chunk(text, 10, "\n");
		assert_eq!(chunks, vec!["short", "0123456789", "ABCDEF", "end"]);
	}

	#[test]
	fn chunk_never_returns_empty_pieces() {
		let text = "a\n\nb\n\n\nc";
		for piece in chunk(text, 3, "\n") {
			assert!(!piece.is_empty());
		}
		// A full-width line right after a hard split must not flush an empty
		// buffer.
		for piece in chunk("0123456789ABCDEF\n0123456789", 10, "\n") {
			assert!(!piece.is_empty());
		}
	}

	#[test]
	fn build_empty_input_yields_single_empty_page() {
		let set = PageSet::build(&[], &config(1024, 25, 6000));
		assert_eq!(set.len(), 1);
		assert!(set.pages()[0].is_empty());
		assert!(set.is_placeholder());
		assert!(set.pages()[0].trailer().is_none());
	}

	#[test]
	fn build_single_small_block_is_one_unstamped_page() {
		let blocks = [ContentBlock::new("Items", "apple x1\nbread x2")];
		let set = PageSet::build(&blocks, &config(1024, 25, 6000));
		assert_eq!(set.len(), 1);
		let fields = set.pages()[0].fields();
		assert_eq!(fields.len(), 1);
		assert_eq!(fields[0].name, "Items");
		assert_eq!(fields[0].value, "apple x1\nbread x2");
		assert!(set.pages()[0].trailer().is_none());
	}

	#[test]
	fn build_splits_oversized_block_across_pages() {
		// Sixteen characters with a field limit of ten and one field per page:
		// two chunks, two pages, both stamped.
		let blocks = [ContentBlock::new("A", "0123456789ABCDEF")];
		let set = PageSet::build(&blocks, &config(10, 1, 1000));
		assert_eq!(set.len(), 2);
		assert_eq!(set.pages()[0].fields()[0].name, "A (1/2)");
		assert_eq!(set.pages()[0].fields()[0].value, "0123456789");
		assert_eq!(set.pages()[1].fields()[0].name, "A (2/2)");
		assert_eq!(set.pages()[1].fields()[0].value, "ABCDEF");
		assert_eq!(set.pages()[0].trailer(), Some("Page 1/2"));
		assert_eq!(set.pages()[1].trailer(), Some("Page 2/2"));
	}

	#[test]
	fn build_overflows_on_field_count() {
		// Three one-field blocks with two fields allowed per page.
		let body = "x".repeat(99);
		let blocks = [
			ContentBlock::new("1", body.clone()),
			ContentBlock::new("2", body.clone()),
			ContentBlock::new("3", body),
		];
		let set = PageSet::build(&blocks, &config(1024, 2, 10000));
		assert_eq!(set.len(), 2);
		assert_eq!(set.pages()[0].fields().len(), 2);
		assert_eq!(set.pages()[1].fields().len(), 1);
	}

	#[test]
	fn build_overflows_on_weight() {
		let blocks = [
			ContentBlock::new("a", "x".repeat(500)),
			ContentBlock::new("b", "y".repeat(500)),
			ContentBlock::new("c", "z".repeat(500)),
		];
		let set = PageSet::build(&blocks, &config(1024, 25, 1100));
		for page in set.pages() {
			assert!(page.weight() <= 1100);
			assert!(page.fields().len() <= 25);
		}
		assert_eq!(set.len(), 3);
	}

	#[test]
	fn build_keeps_field_that_exactly_fills_the_page() {
		// Name (1) + value (10) lands exactly on the weight limit; no overflow,
		// and the final partially-built page still makes it into the set.
		let blocks = [ContentBlock::new("a", "x".repeat(10))];
		let set = PageSet::build(&blocks, &config(1024, 25, 11));
		assert_eq!(set.len(), 1);
		assert_eq!(set.pages()[0].fields().len(), 1);
		assert_eq!(set.pages()[0].weight(), 11);
	}

	#[test]
	fn build_has_no_overall_set_size_cap() {
		let blocks: Vec<ContentBlock> = (0..300).map(|index| ContentBlock::new(format!("{index}"), "x".repeat(64))).collect();
		let set = PageSet::build(&blocks, &config(1024, 1, 10000));
		assert_eq!(set.len(), 300);
	}

	#[test]
	fn build_counts_page_overhead_against_weight() {
		let mut with_overhead = config(1024, 25, 1100);
		with_overhead.page_overhead = 600;
		let blocks = [ContentBlock::new("a", "x".repeat(400)), ContentBlock::new("b", "y".repeat(400))];
		let set = PageSet::build(&blocks, &with_overhead);
		assert_eq!(set.len(), 2);
	}

	#[test]
	fn build_preserves_block_and_chunk_order() {
		let blocks = [
			ContentBlock::new("first", "1\n2\n3"),
			ContentBlock::new("second", "0123456789ABCDEF"),
			ContentBlock::new("third", "done"),
		];
		let set = PageSet::build(&blocks, &config(10, 25, 6000));
		let names: Vec<&str> = set
			.pages()
			.iter()
			.flat_map(|page| page.fields())
			.map(|field| field.name.as_str())
			.collect();
		assert_eq!(names, vec!["first", "second (1/2)", "second (2/2)", "third"]);
	}

	#[test]
	fn build_field_values_stay_within_field_size() {
		let blocks = [ContentBlock::new("big", "line\n".repeat(400))];
		let set = PageSet::build(&blocks, &config(100, 25, 6000));
		for page in set.pages() {
			for field in page.fields() {
				assert!(field.value.chars().count() <= 100);
			}
		}
	}

	#[test]
	fn validate_rejects_zero_limits() {
		let mut bad = config(0, 25, 6000);
		assert!(bad.validate().is_err());
		bad = config(1024, 0, 6000);
		assert!(bad.validate().is_err());
		bad = config(1024, 25, 0);
		assert!(bad.validate().is_err());
		assert!(config(1024, 25, 6000).validate().is_ok());
	}

	#[test]
	fn nav_transitions_are_total() {
		let page_count = 5;
		assert_eq!(NavAction::First.apply(3, page_count), 0);
		assert_eq!(NavAction::Last.apply(0, page_count), 4);
		assert_eq!(NavAction::Previous.apply(0, page_count), 0);
		assert_eq!(NavAction::Next.apply(4, page_count), 4);
		assert_eq!(NavAction::Next.apply(2, page_count), 3);
		assert_eq!(NavAction::Previous.apply(2, page_count), 1);
		// Degenerate single-page set.
		assert_eq!(NavAction::Last.apply(0, 1), 0);
		assert_eq!(NavAction::Next.apply(0, 1), 0);
	}

	#[test]
	fn nav_ids_round_trip() {
		for action in [NavAction::First, NavAction::Previous, NavAction::Next, NavAction::Last] {
			assert_eq!(NavAction::from_id(action.as_id()), Some(action));
		}
		assert_eq!(NavAction::from_id("indicator"), None);
	}

	#[test]
	fn indicator_is_one_based() {
		assert_eq!(page_indicator(0, 3), "1/3");
		assert_eq!(page_indicator(2, 3), "3/3");
	}
}
