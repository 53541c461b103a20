//! Catalog entities as the core sees them: read-only snapshots of the persisted rows.

use std::collections::{BTreeMap, HashMap};

use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
	pub id: i32,
	pub name: String,
	pub abbreviation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
	pub id: i32,
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
	pub id: i32,
	pub title: String,
	pub synopsis: Option<String>,
	pub series_id: i32,
	pub season: i32,
	pub episode_number: i32,
	pub imdb_url: String,
	pub air_date: Date,
	pub created_at: OffsetDateTime,
}

/// One association row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeTag {
	pub episode_id: i32,
	pub tag_id: i32,
}

/// An episode with its series and tags loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRecord {
	pub episode: Episode,
	pub series: Option<Series>,
	pub tags: Vec<Tag>,
}
impl EpisodeRecord {
	pub fn series_name(&self) -> &str {
		self.series.as_ref().map(|series| series.name.as_str()).unwrap_or(UNKNOWN_SERIES)
	}

	pub fn has_tag(&self, tag_id: i32) -> bool {
		self.tags.iter().any(|tag| tag.id == tag_id)
	}
}

/// An association row joined with the episode and tag attributes the aggregations group on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagLink {
	pub episode_id: i32,
	pub tag_id: i32,
	pub tag_name: String,
	pub series_id: i32,
	pub air_date: Date,
	pub created_at: OffsetDateTime,
}

pub const UNKNOWN_SERIES: &str = "Unknown";

/// A consistent snapshot of the four catalog tables.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
	pub series: Vec<Series>,
	pub tags: Vec<Tag>,
	pub episodes: Vec<Episode>,
	pub episode_tags: Vec<EpisodeTag>,
}
impl Catalog {
	pub fn series_by_id(&self, id: i32) -> Option<&Series> {
		self.series.iter().find(|series| series.id == id)
	}

	pub fn tag_by_id(&self, id: i32) -> Option<&Tag> {
		self.tags.iter().find(|tag| tag.id == id)
	}

	/// Joins episodes with their series and tags. Records come back in episode id order and each
	/// record lists its tags in tag id order; association rows pointing at missing tags are
	/// skipped.
	pub fn records(&self) -> Vec<EpisodeRecord> {
		let series: HashMap<i32, &Series> =
			self.series.iter().map(|series| (series.id, series)).collect();
		let tags: HashMap<i32, &Tag> = self.tags.iter().map(|tag| (tag.id, tag)).collect();
		let mut tags_by_episode: HashMap<i32, Vec<&Tag>> = HashMap::new();

		for link in &self.episode_tags {
			if let Some(tag) = tags.get(&link.tag_id) {
				tags_by_episode.entry(link.episode_id).or_default().push(tag);
			}
		}

		let mut records: Vec<EpisodeRecord> = self
			.episodes
			.iter()
			.map(|episode| {
				let mut episode_tags: Vec<Tag> = tags_by_episode
					.get(&episode.id)
					.map(|tags| tags.iter().map(|tag| (*tag).clone()).collect())
					.unwrap_or_default();

				episode_tags.sort_by_key(|tag| tag.id);
				episode_tags.dedup_by_key(|tag| tag.id);

				EpisodeRecord {
					episode: episode.clone(),
					series: series.get(&episode.series_id).map(|series| (*series).clone()),
					tags: episode_tags,
				}
			})
			.collect();

		records.sort_by_key(|record| record.episode.id);

		records
	}

	/// Association rows joined with their episode and tag. Rows whose episode or tag is missing
	/// are dropped.
	pub fn links(&self) -> Vec<TagLink> {
		let episodes: HashMap<i32, &Episode> =
			self.episodes.iter().map(|episode| (episode.id, episode)).collect();
		let tags: HashMap<i32, &Tag> = self.tags.iter().map(|tag| (tag.id, tag)).collect();

		self.episode_tags
			.iter()
			.filter_map(|link| {
				let episode = episodes.get(&link.episode_id)?;
				let tag = tags.get(&link.tag_id)?;

				Some(TagLink {
					episode_id: episode.id,
					tag_id: tag.id,
					tag_name: tag.name.clone(),
					series_id: episode.series_id,
					air_date: episode.air_date,
					created_at: episode.created_at,
				})
			})
			.collect()
	}

	pub fn episode_counts_by_series(&self) -> BTreeMap<i32, usize> {
		let mut counts = BTreeMap::new();

		for episode in &self.episodes {
			*counts.entry(episode.series_id).or_insert(0) += 1;
		}

		counts
	}
}
