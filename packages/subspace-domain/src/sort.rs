use std::cmp::Ordering;

use crate::catalog::{Episode, EpisodeRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
	Id,
	Title,
	AirDate,
	Season,
	EpisodeNumber,
}
impl SortKey {
	/// Unrecognized tokens sort by id.
	pub fn parse(token: &str) -> Self {
		match token.trim().to_ascii_lowercase().as_str() {
			"title" => Self::Title,
			"airdate" => Self::AirDate,
			"season" => Self::Season,
			"episode" => Self::EpisodeNumber,
			_ => Self::Id,
		}
	}

	fn compare(self, a: &Episode, b: &Episode) -> Ordering {
		match self {
			Self::Id => a.id.cmp(&b.id),
			Self::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
			Self::AirDate => a.air_date.cmp(&b.air_date),
			Self::Season => a.season.cmp(&b.season),
			Self::EpisodeNumber => a.episode_number.cmp(&b.episode_number),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
	#[default]
	Asc,
	Desc,
}
impl Direction {
	pub fn parse(raw: Option<&str>) -> Self {
		match raw {
			Some(raw) if raw.trim().eq_ignore_ascii_case("desc") => Self::Desc,
			_ => Self::Asc,
		}
	}

	fn apply(self, ordering: Ordering) -> Ordering {
		match self {
			Self::Asc => ordering,
			Self::Desc => ordering.reverse(),
		}
	}
}

/// Ordered sort keys sharing one direction. Ties left after the last key fall back to ascending
/// id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
	pub keys: Vec<SortKey>,
	pub direction: Direction,
}
impl SortSpec {
	pub fn parse(sort_by: Option<&str>, order: Option<&str>) -> Self {
		let mut keys: Vec<SortKey> = sort_by
			.unwrap_or_default()
			.split(',')
			.map(str::trim)
			.filter(|token| !token.is_empty())
			.map(SortKey::parse)
			.collect();

		if keys.is_empty() {
			keys.push(SortKey::Id);
		}

		Self { keys, direction: Direction::parse(order) }
	}

	pub fn compare(&self, a: &Episode, b: &Episode) -> Ordering {
		self.keys
			.iter()
			.map(|key| self.direction.apply(key.compare(a, b)))
			.find(|ordering| ordering.is_ne())
			.unwrap_or_else(|| a.id.cmp(&b.id))
	}

	pub fn sort(&self, records: &mut [&EpisodeRecord]) {
		records.sort_by(|a, b| self.compare(&a.episode, &b.episode));
	}
}
impl Default for SortSpec {
	fn default() -> Self {
		Self { keys: vec![SortKey::Id], direction: Direction::Asc }
	}
}
