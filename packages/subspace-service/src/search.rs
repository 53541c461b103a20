use serde::Serialize;

use subspace_domain::{
	catalog::{EpisodeRecord, Series},
	filter::contains_ci,
	paging::clamp_limit,
	projection::{DisplayStyle, display_title},
};

use crate::{Result, SeriesRef, SubspaceService, TagRef, required_query, tags::sorted_by_name};

const DEFAULT_SUGGEST_LIMIT: usize = 5;
const MAX_SUGGEST_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct SuggestResponse {
	pub tags: Vec<TagRef>,
	pub series: Vec<SeriesRef>,
	pub episodes: Vec<SuggestEpisode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestEpisode {
	pub id: i32,
	pub title: String,
	pub series: SeriesRef,
	pub display_title: String,
}

impl SubspaceService {
	/// Substring suggestions across tags, series and episodes. Each list holds at most `limit`
	/// entries.
	pub async fn suggest(&self, q: Option<&str>, limit: Option<i64>) -> Result<SuggestResponse> {
		let query = required_query(q)?.to_lowercase();
		let limit = clamp_limit(limit, DEFAULT_SUGGEST_LIMIT, 1, MAX_SUGGEST_LIMIT);
		let snapshot = self.snapshot().await?;
		let tags = sorted_by_name(
			snapshot.catalog.tags.iter().filter(|tag| contains_ci(&tag.name, &query)),
		)
		.into_iter()
		.take(limit)
		.map(TagRef::from)
		.collect();
		let mut series: Vec<&Series> = snapshot
			.catalog
			.series
			.iter()
			.filter(|series| {
				contains_ci(&series.name, &query) || contains_ci(&series.abbreviation, &query)
			})
			.collect();

		series.sort_by_cached_key(|series| (series.name.to_lowercase(), series.id));

		let mut episodes: Vec<&EpisodeRecord> = snapshot
			.records
			.iter()
			.filter(|record| {
				contains_ci(&record.episode.title, &query)
					|| record
						.episode
						.synopsis
						.as_deref()
						.is_some_and(|synopsis| contains_ci(synopsis, &query))
			})
			.collect();

		episodes.sort_by_cached_key(|record| (record.episode.title.to_lowercase(), record.episode.id));

		Ok(SuggestResponse {
			tags,
			series: series.into_iter().take(limit).map(SeriesRef::from).collect(),
			episodes: episodes
				.into_iter()
				.take(limit)
				.map(|record| SuggestEpisode {
					id: record.episode.id,
					title: record.episode.title.clone(),
					series: SeriesRef::of(record),
					display_title: display_title(
						record.series_name(),
						&record.episode,
						DisplayStyle::ShortHyphen,
					),
				})
				.collect(),
		})
	}
}
