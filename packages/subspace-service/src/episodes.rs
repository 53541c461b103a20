use std::cmp::Reverse;

use rand::{Rng, seq::SliceRandom};
use serde::Serialize;
use time::Date;

use subspace_domain::{
	aggregate,
	catalog::EpisodeRecord,
	filter::EpisodeFilter,
	paging::{PageMeta, PageRequest, clamp_limit, paginate},
	projection::{DisplayStyle, EpisodeSummary, EpisodeView, display_title, episode_code},
	sort::SortSpec,
};

use crate::{
	Error, Result, Snapshot, SubspaceService,
	views::{SeriesRef, TagRef, View},
};

pub(crate) const DEFAULT_PAGE_SIZE: usize = 25;
pub(crate) const MAX_PAGE_SIZE: usize = 100;
const DEFAULT_RANDOM_COUNT: usize = 5;
const MAX_RANDOM_COUNT: usize = 100;
const DEFAULT_RECENT_COUNT: usize = 10;
const MAX_RECENT_COUNT: usize = 50;
const DEFAULT_RELATED_LIMIT: usize = 10;
const MAX_RELATED_LIMIT: usize = 100;
const DEFAULT_TIMELINE_LIMIT: usize = 100;
const MAX_TIMELINE_LIMIT: usize = 500;

#[derive(Debug, Clone, Default)]
pub struct EpisodeListRequest {
	pub filter: EpisodeFilter,
	/// Comma-separated sort keys.
	pub sort_by: Option<String>,
	pub order: Option<String>,
	pub page: Option<i64>,
	pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EpisodePage {
	pub meta: PageMeta,
	pub data: Vec<EpisodeView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EpisodeDetail {
	Full(EpisodeView),
	Compact(EpisodeSummary),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasEpisode {
	pub id: i32,
	pub title: String,
	pub season: i32,
	pub episode_number: i32,
	#[serde(serialize_with = "crate::date_serde::serialize")]
	pub air_date: Date,
	pub series: SeriesRef,
	pub tags: Vec<TagRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedEpisodesResponse {
	pub episode_id: i32,
	pub related: Vec<RelatedEpisodeItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedEpisodeItem {
	pub id: i32,
	pub title: String,
	pub display_title: String,
	pub shared_tag_count: usize,
}

/// Air-date bounds here are inclusive, unlike the episode filter.
#[derive(Debug, Clone, Default)]
pub struct TimelineRequest {
	pub start: Option<Date>,
	pub end: Option<Date>,
	pub series_id: Option<i32>,
	pub tag_id: Option<i32>,
	pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
	pub id: i32,
	pub title: String,
	#[serde(serialize_with = "crate::date_serde::serialize")]
	pub air_date: Date,
	pub season: i32,
	pub episode_number: i32,
	pub series: SeriesRef,
	pub tags: Vec<TagRef>,
}

impl SubspaceService {
	/// Filtered, sorted and paged episodes. Keyword filters are ignored here; use
	/// [`SubspaceService::search_episodes`] for synopsis matching.
	pub async fn list_episodes(&self, mut req: EpisodeListRequest) -> Result<EpisodePage> {
		req.filter.keyword = None;
		req.filter.keywords_all = None;

		let snapshot = self.snapshot().await?;

		Ok(self.episode_page(&snapshot, &req))
	}

	pub async fn search_episodes(&self, req: EpisodeListRequest) -> Result<EpisodePage> {
		let snapshot = self.snapshot().await?;

		Ok(self.episode_page(&snapshot, &req))
	}

	pub async fn get_episode(&self, episode_id: i32, view: View) -> Result<EpisodeDetail> {
		let snapshot = self.snapshot().await?;
		let record = snapshot
			.record(episode_id)
			.ok_or_else(|| Error::not_found(format!("Episode with ID {episode_id} not found.")))?;

		Ok(match view {
			View::Full => EpisodeDetail::Full(EpisodeView::from_record(record)),
			View::Compact =>
				EpisodeDetail::Compact(EpisodeSummary::from_record(record, DisplayStyle::ShortColon)),
		})
	}

	/// Looks an episode up by series abbreviation (any case), season and episode number.
	pub async fn get_episode_by_alias(
		&self,
		series_code: &str,
		season: i32,
		episode_number: i32,
	) -> Result<AliasEpisode> {
		let snapshot = self.snapshot().await?;
		let code = series_code.trim().to_lowercase();
		let record = snapshot
			.records
			.iter()
			.find(|record| {
				record.series.as_ref().is_some_and(|series| series.abbreviation.to_lowercase() == code)
					&& record.episode.season == season
					&& record.episode.episode_number == episode_number
			})
			.ok_or_else(|| {
				Error::not_found(format!(
					"No episode found for {series_code} {}",
					episode_code(season, episode_number)
				))
			})?;

		Ok(AliasEpisode {
			id: record.episode.id,
			title: record.episode.title.clone(),
			season: record.episode.season,
			episode_number: record.episode.episode_number,
			air_date: record.episode.air_date,
			series: SeriesRef::of(record),
			tags: record.tags.iter().map(TagRef::from).collect(),
		})
	}

	/// Earliest aired match; ties go to the lowest id.
	pub async fn first_episode(&self, filter: EpisodeFilter) -> Result<EpisodeView> {
		let snapshot = self.snapshot().await?;

		filter
			.apply(&snapshot.records, self.tag_match())
			.into_iter()
			.min_by_key(|record| (record.episode.air_date, record.episode.id))
			.map(EpisodeView::from_record)
			.ok_or_else(|| Error::not_found("No matching episodes found."))
	}

	/// Latest aired match; ties go to the lowest id.
	pub async fn latest_episode(&self, filter: EpisodeFilter) -> Result<EpisodeView> {
		let snapshot = self.snapshot().await?;

		filter
			.apply(&snapshot.records, self.tag_match())
			.into_iter()
			.min_by_key(|record| (Reverse(record.episode.air_date), record.episode.id))
			.map(EpisodeView::from_record)
			.ok_or_else(|| Error::not_found("No matching episodes found."))
	}

	/// Uniform draw over the filtered episodes.
	pub async fn random_episode(&self, filter: EpisodeFilter) -> Result<EpisodeView> {
		let snapshot = self.snapshot().await?;
		let candidates = filter.apply(&snapshot.records, self.tag_match());

		pick_random(&candidates)
			.map(EpisodeView::from_record)
			.ok_or_else(|| Error::not_found("No episodes match the filters."))
	}

	/// Up to `count` distinct filtered episodes in random order.
	pub async fn random_episodes(
		&self,
		filter: EpisodeFilter,
		count: Option<i64>,
	) -> Result<Vec<EpisodeView>> {
		let count = clamp_limit(count, DEFAULT_RANDOM_COUNT, 1, MAX_RANDOM_COUNT);
		let snapshot = self.snapshot().await?;
		let mut candidates = filter.apply(&snapshot.records, self.tag_match());

		if candidates.is_empty() {
			return Err(Error::not_found("No episodes match the filters."));
		}

		candidates.shuffle(&mut rand::rng());
		candidates.truncate(count);

		Ok(candidates.into_iter().map(EpisodeView::from_record).collect())
	}

	/// Newest catalog additions first.
	pub async fn recently_added(
		&self,
		filter: EpisodeFilter,
		count: Option<i64>,
	) -> Result<Vec<EpisodeView>> {
		let count = clamp_limit(count, DEFAULT_RECENT_COUNT, 1, MAX_RECENT_COUNT);
		let snapshot = self.snapshot().await?;
		let mut matched = filter.apply(&snapshot.records, self.tag_match());

		matched.sort_by_key(|record| Reverse((record.episode.created_at, record.episode.id)));
		matched.truncate(count);

		Ok(matched.into_iter().map(EpisodeView::from_record).collect())
	}

	pub async fn related_episodes(
		&self,
		episode_id: i32,
		limit: Option<i64>,
	) -> Result<RelatedEpisodesResponse> {
		let limit = clamp_limit(limit, DEFAULT_RELATED_LIMIT, 1, MAX_RELATED_LIMIT);
		let snapshot = self.snapshot().await?;
		let related =
			aggregate::related_episodes(&snapshot.records, episode_id, limit).ok_or_else(|| {
				Error::not_found(format!(
					"Episode with ID {episode_id} has no tags or does not exist."
				))
			})?;

		Ok(RelatedEpisodesResponse {
			episode_id,
			related: related
				.into_iter()
				.map(|related| RelatedEpisodeItem {
					id: related.record.episode.id,
					title: related.record.episode.title.clone(),
					display_title: display_title(
						related.record.series_name(),
						&related.record.episode,
						DisplayStyle::SeriesLong,
					),
					shared_tag_count: related.shared_tag_count,
				})
				.collect(),
		})
	}

	/// Episodes in air-date order across series.
	pub async fn timeline(&self, req: TimelineRequest) -> Result<Vec<TimelineItem>> {
		let limit = clamp_limit(req.limit, DEFAULT_TIMELINE_LIMIT, 1, MAX_TIMELINE_LIMIT);
		let snapshot = self.snapshot().await?;
		let mut matched: Vec<&EpisodeRecord> = snapshot
			.records
			.iter()
			.filter(|record| req.start.is_none_or(|start| record.episode.air_date >= start))
			.filter(|record| req.end.is_none_or(|end| record.episode.air_date <= end))
			.filter(|record| req.series_id.is_none_or(|id| record.episode.series_id == id))
			.filter(|record| req.tag_id.is_none_or(|id| record.has_tag(id)))
			.collect();

		matched.sort_by(|a, b| {
			a.episode
				.air_date
				.cmp(&b.episode.air_date)
				.then_with(|| a.series_name().cmp(b.series_name()))
				.then_with(|| a.episode.id.cmp(&b.episode.id))
		});
		matched.truncate(limit);

		Ok(matched
			.into_iter()
			.map(|record| TimelineItem {
				id: record.episode.id,
				title: record.episode.title.clone(),
				air_date: record.episode.air_date,
				season: record.episode.season,
				episode_number: record.episode.episode_number,
				series: SeriesRef::of(record),
				tags: record.tags.iter().map(TagRef::from).collect(),
			})
			.collect())
	}

	pub(crate) fn episode_page(&self, snapshot: &Snapshot, req: &EpisodeListRequest) -> EpisodePage {
		let mut matched = req.filter.apply(&snapshot.records, self.tag_match());

		SortSpec::parse(req.sort_by.as_deref(), req.order.as_deref()).sort(&mut matched);

		let request =
			PageRequest::clamped(req.page, req.page_size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
		let page = paginate(matched, request).map(EpisodeView::from_record);

		tracing::debug!(
			candidates = snapshot.records.len(),
			matched = page.meta.total_count,
			page = page.meta.page,
			page_size = page.meta.page_size,
			"Evaluated episode query."
		);

		EpisodePage { meta: page.meta, data: page.items }
	}
}

/// Uniform pick from candidates already in id order.
pub(crate) fn pick_random<'a>(candidates: &[&'a EpisodeRecord]) -> Option<&'a EpisodeRecord> {
	if candidates.is_empty() {
		return None;
	}

	let index = rand::rng().random_range(0..candidates.len());

	candidates.get(index).copied()
}
