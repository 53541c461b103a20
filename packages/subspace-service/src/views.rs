use serde::Serialize;

use subspace_domain::catalog::{EpisodeRecord, Series, Tag, UNKNOWN_SERIES};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesRef {
	pub id: i32,
	pub name: String,
	pub abbreviation: String,
}
impl SeriesRef {
	pub fn of(record: &EpisodeRecord) -> Self {
		match &record.series {
			Some(series) => Self::from(series),
			None => Self {
				id: record.episode.series_id,
				name: UNKNOWN_SERIES.to_string(),
				abbreviation: String::new(),
			},
		}
	}
}
impl From<&Series> for SeriesRef {
	fn from(series: &Series) -> Self {
		Self { id: series.id, name: series.name.clone(), abbreviation: series.abbreviation.clone() }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRef {
	pub id: i32,
	pub name: String,
}
impl From<&Tag> for TagRef {
	fn from(tag: &Tag) -> Self {
		Self { id: tag.id, name: tag.name.clone() }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagUsageItem {
	pub id: i32,
	pub name: String,
	pub usage_count: usize,
}
impl From<subspace_domain::aggregate::TagUsage> for TagUsageItem {
	fn from(usage: subspace_domain::aggregate::TagUsage) -> Self {
		Self { id: usage.tag_id, name: usage.name, usage_count: usage.count }
	}
}

/// Whether a single-entity lookup returns the full or the compact shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
	#[default]
	Full,
	Compact,
}
impl View {
	pub fn parse(raw: Option<&str>) -> Self {
		match raw {
			Some(raw) if raw.trim().eq_ignore_ascii_case("compact") => Self::Compact,
			_ => Self::Full,
		}
	}
}
