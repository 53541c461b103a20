use std::cmp::Reverse;

use serde::Serialize;
use time::Date;

use subspace_domain::{
	aggregate,
	catalog::EpisodeRecord,
	projection::{DisplayStyle, display_title},
};

use crate::{Result, SubspaceService, TagUsageItem};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
	pub total_series: usize,
	pub total_episodes: usize,
	pub total_tags: usize,
	pub untagged_episodes: usize,
	pub most_used_tag: Option<TagUsageItem>,
	pub most_tagged_episode: Option<MostTaggedEpisode>,
	pub first_episode: Option<EpisodeDateRef>,
	pub latest_episode: Option<EpisodeDateRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MostTaggedEpisode {
	pub id: i32,
	pub title: String,
	pub display_title: String,
	pub tag_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeDateRef {
	pub id: i32,
	pub title: String,
	#[serde(serialize_with = "crate::date_serde::serialize")]
	pub air_date: Date,
}
impl From<&EpisodeRecord> for EpisodeDateRef {
	fn from(record: &EpisodeRecord) -> Self {
		Self {
			id: record.episode.id,
			title: record.episode.title.clone(),
			air_date: record.episode.air_date,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UntaggedEpisode {
	pub id: i32,
	pub title: String,
	pub season: i32,
	pub episode_number: i32,
	pub series_abbreviation: String,
}

impl SubspaceService {
	pub async fn overview(&self) -> Result<OverviewStats> {
		let snapshot = self.snapshot().await?;
		let records = &snapshot.records;
		let links = snapshot.catalog.links();

		Ok(OverviewStats {
			total_series: snapshot.catalog.series.len(),
			total_episodes: records.len(),
			total_tags: snapshot.catalog.tags.len(),
			untagged_episodes: records.iter().filter(|record| record.tags.is_empty()).count(),
			most_used_tag: aggregate::tag_usage(&links).into_iter().next().map(TagUsageItem::from),
			most_tagged_episode: aggregate::most_tagged(records).map(|record| MostTaggedEpisode {
				id: record.episode.id,
				title: record.episode.title.clone(),
				display_title: display_title(
					record.series_name(),
					&record.episode,
					DisplayStyle::SeriesLong,
				),
				tag_count: record.tags.len(),
			}),
			first_episode: records
				.iter()
				.min_by_key(|record| (record.episode.air_date, record.episode.id))
				.map(EpisodeDateRef::from),
			latest_episode: records
				.iter()
				.min_by_key(|record| (Reverse(record.episode.air_date), record.episode.id))
				.map(EpisodeDateRef::from),
		})
	}

	/// Episodes without any tag, in id order.
	pub async fn untagged_episodes(&self) -> Result<Vec<UntaggedEpisode>> {
		let snapshot = self.snapshot().await?;

		Ok(snapshot
			.records
			.iter()
			.filter(|record| record.tags.is_empty())
			.map(|record| UntaggedEpisode {
				id: record.episode.id,
				title: record.episode.title.clone(),
				season: record.episode.season,
				episode_number: record.episode.episode_number,
				series_abbreviation: record
					.series
					.as_ref()
					.map(|series| series.abbreviation.clone())
					.unwrap_or_default(),
			})
			.collect())
	}
}
