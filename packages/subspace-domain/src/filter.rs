//! Episode filtering. Each supplied criterion becomes a predicate and the predicates are folded
//! into one conjunction.

use time::Date;

use crate::catalog::EpisodeRecord;

pub type Predicate = Box<dyn Fn(&EpisodeRecord) -> bool + Send + Sync>;

/// Boolean combinator used to fold a list of predicates into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
	Any,
	All,
}
impl Combinator {
	pub fn fold(self, predicates: Vec<Predicate>) -> Predicate {
		match self {
			Self::Any => Box::new(move |record: &EpisodeRecord| {
				predicates.iter().any(|predicate| predicate(record))
			}),
			Self::All => Box::new(move |record: &EpisodeRecord| {
				predicates.iter().all(|predicate| predicate(record))
			}),
		}
	}
}

/// How the tag id list and the tag name list combine when both are supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagMatch {
	/// One match from each list.
	#[default]
	AllGroups,
	/// One match from the union of both lists.
	Merged,
}
impl TagMatch {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"all_groups" => Some(Self::AllGroups),
			"merged" => Some(Self::Merged),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeFilter {
	pub series_id: Option<i32>,
	pub season: Option<i32>,
	pub title: Option<String>,
	/// Comma-separated words; the synopsis must contain at least one.
	pub keyword: Option<String>,
	/// Comma-separated words; the synopsis must contain every one.
	pub keywords_all: Option<String>,
	/// Exclusive lower air-date bound.
	pub first_aired_after: Option<Date>,
	/// Exclusive upper air-date bound.
	pub first_aired_before: Option<Date>,
	pub tag_ids: Vec<i32>,
	/// Comma-separated tag names, matched case-insensitively.
	pub tags: Option<String>,
}
impl EpisodeFilter {
	pub fn is_empty(&self) -> bool {
		self.predicates(TagMatch::AllGroups).is_empty()
	}

	/// Builds the conjunction of every supplied criterion. Blank strings and lists without
	/// tokens are ignored.
	pub fn predicate(&self, tag_match: TagMatch) -> Predicate {
		Combinator::All.fold(self.predicates(tag_match))
	}

	pub fn apply<'a>(
		&self,
		records: &'a [EpisodeRecord],
		tag_match: TagMatch,
	) -> Vec<&'a EpisodeRecord> {
		let predicate = self.predicate(tag_match);

		records.iter().filter(|&record| predicate(record)).collect()
	}

	fn predicates(&self, tag_match: TagMatch) -> Vec<Predicate> {
		let mut predicates: Vec<Predicate> = Vec::new();

		if let Some(series_id) = self.series_id {
			predicates
				.push(Box::new(move |record: &EpisodeRecord| record.episode.series_id == series_id));
		}
		if let Some(season) = self.season {
			predicates.push(Box::new(move |record: &EpisodeRecord| record.episode.season == season));
		}
		if let Some(title) = non_blank(self.title.as_deref()) {
			let needle = title.to_lowercase();

			predicates.push(Box::new(move |record: &EpisodeRecord| {
				contains_ci(&record.episode.title, &needle)
			}));
		}
		if let Some(after) = self.first_aired_after {
			predicates.push(Box::new(move |record: &EpisodeRecord| record.episode.air_date > after));
		}
		if let Some(before) = self.first_aired_before {
			predicates.push(Box::new(move |record: &EpisodeRecord| record.episode.air_date < before));
		}

		let by_id = tag_id_predicate(&self.tag_ids);
		let by_name = tag_name_predicate(self.tags.as_deref());

		match (tag_match, by_id, by_name) {
			(TagMatch::Merged, Some(by_id), Some(by_name)) =>
				predicates.push(Combinator::Any.fold(vec![by_id, by_name])),
			(_, by_id, by_name) => predicates.extend(by_id.into_iter().chain(by_name)),
		}

		if let Some(any) = synopsis_predicate(self.keyword.as_deref(), Combinator::Any) {
			predicates.push(any);
		}
		if let Some(all) = synopsis_predicate(self.keywords_all.as_deref(), Combinator::All) {
			predicates.push(all);
		}

		predicates
	}
}

/// Splits a comma list, trims entries, drops empty ones and lower-cases the rest.
pub fn split_tokens(raw: Option<&str>) -> Vec<String> {
	raw.map(|raw| {
		raw.split(',')
			.map(str::trim)
			.filter(|token| !token.is_empty())
			.map(str::to_lowercase)
			.collect()
	})
	.unwrap_or_default()
}

pub fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
	haystack.to_lowercase().contains(lowered_needle)
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
	raw.map(str::trim).filter(|value| !value.is_empty())
}

fn tag_id_predicate(tag_ids: &[i32]) -> Option<Predicate> {
	if tag_ids.is_empty() {
		return None;
	}

	let tag_ids = tag_ids.to_vec();

	Some(Box::new(move |record: &EpisodeRecord| {
		record.tags.iter().any(|tag| tag_ids.contains(&tag.id))
	}))
}

fn tag_name_predicate(raw: Option<&str>) -> Option<Predicate> {
	let names = split_tokens(raw);

	if names.is_empty() {
		return None;
	}

	Some(Box::new(move |record: &EpisodeRecord| {
		record.tags.iter().any(|tag| names.contains(&tag.name.to_lowercase()))
	}))
}

// A missing synopsis contains no keyword.
fn synopsis_predicate(raw: Option<&str>, combinator: Combinator) -> Option<Predicate> {
	let words = split_tokens(raw);

	if words.is_empty() {
		return None;
	}

	let predicates = words
		.into_iter()
		.map(|word| -> Predicate {
			Box::new(move |record: &EpisodeRecord| {
				record.episode.synopsis.as_deref().is_some_and(|synopsis| contains_ci(synopsis, &word))
			})
		})
		.collect();

	Some(combinator.fold(predicates))
}
