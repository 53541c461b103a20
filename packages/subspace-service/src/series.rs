use std::{cmp::Reverse, collections::BTreeMap};

use serde::Serialize;
use time::Date;

use subspace_domain::{
	aggregate::{self, SeasonCount},
	catalog::EpisodeRecord,
	paging::{PageRequest, paginate},
	projection::{DisplayStyle, EpisodeView, display_title, format_date},
};

use crate::{
	EpisodePage, Error, Result, Snapshot, SubspaceService, TagUsageItem,
	episodes::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, pick_random},
	views::View,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
	pub id: i32,
	pub name: String,
	pub abbreviation: String,
	pub episode_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SeriesDetail {
	Full(SeriesSummary),
	Compact { id: i32, name: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonGroup {
	pub season: i32,
	pub episodes: Vec<SeasonEpisode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonEpisode {
	pub id: i32,
	pub title: String,
	pub season: i32,
	pub episode_number: i32,
	pub display_title: String,
	#[serde(serialize_with = "crate::date_serde::serialize")]
	pub air_date: Date,
}

/// Optional constraints for a random pick inside one series. Air-date bounds are exclusive.
#[derive(Debug, Clone, Default)]
pub struct SeriesRandomRequest {
	pub season: Option<i32>,
	pub first_aired_after: Option<Date>,
	pub first_aired_before: Option<Date>,
}
impl SeriesRandomRequest {
	fn matches(&self, record: &EpisodeRecord) -> bool {
		self.season.is_none_or(|season| record.episode.season == season)
			&& self.first_aired_after.is_none_or(|after| record.episode.air_date > after)
			&& self.first_aired_before.is_none_or(|before| record.episode.air_date < before)
	}

	fn not_found_message(&self, series_id: i32) -> String {
		let mut message = format!("No episodes found for series ID {series_id}");

		if let Some(season) = self.season {
			message.push_str(&format!(" and season {season}"));
		}
		if let Some(after) = self.first_aired_after {
			message.push_str(&format!(" after {}", format_date(after)));
		}
		if let Some(before) = self.first_aired_before {
			message.push_str(&format!(" before {}", format_date(before)));
		}

		message.push('.');

		message
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonCountItem {
	pub season: i32,
	pub count: usize,
}
impl From<SeasonCount> for SeasonCountItem {
	fn from(count: SeasonCount) -> Self {
		Self { season: count.season, count: count.count }
	}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesTagsResponse {
	pub series_id: i32,
	pub tags: Vec<TagUsageItem>,
}

impl SubspaceService {
	pub async fn list_series(&self) -> Result<Vec<SeriesSummary>> {
		let snapshot = self.snapshot().await?;
		let counts = snapshot.catalog.episode_counts_by_series();
		let mut series: Vec<SeriesSummary> = snapshot
			.catalog
			.series
			.iter()
			.map(|series| SeriesSummary {
				id: series.id,
				name: series.name.clone(),
				abbreviation: series.abbreviation.clone(),
				episode_count: counts.get(&series.id).copied().unwrap_or(0),
			})
			.collect();

		series.sort_by_key(|series| series.id);

		Ok(series)
	}

	pub async fn get_series(&self, series_id: i32, view: View) -> Result<SeriesDetail> {
		let snapshot = self.snapshot().await?;
		let series = snapshot
			.catalog
			.series_by_id(series_id)
			.ok_or_else(|| series_not_found(series_id))?;

		Ok(match view {
			View::Full => SeriesDetail::Full(SeriesSummary {
				id: series.id,
				name: series.name.clone(),
				abbreviation: series.abbreviation.clone(),
				episode_count: snapshot
					.catalog
					.episodes
					.iter()
					.filter(|episode| episode.series_id == series_id)
					.count(),
			}),
			View::Compact => SeriesDetail::Compact { id: series.id, name: series.name.clone() },
		})
	}

	/// Paged episodes of one series in broadcast order. An unknown series yields an empty page.
	pub async fn series_episodes(
		&self,
		series_id: i32,
		page: Option<i64>,
		page_size: Option<i64>,
	) -> Result<EpisodePage> {
		let snapshot = self.snapshot().await?;
		let request = PageRequest::clamped(page, page_size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
		let page = paginate(broadcast_order(&snapshot, series_id), request)
			.map(EpisodeView::from_record);

		Ok(EpisodePage { meta: page.meta, data: page.items })
	}

	pub async fn series_episodes_by_season(&self, series_id: i32) -> Result<Vec<SeasonGroup>> {
		let snapshot = self.snapshot().await?;

		if !snapshot.series_exists(series_id) {
			return Err(series_not_found(series_id));
		}

		let mut groups: BTreeMap<i32, Vec<SeasonEpisode>> = BTreeMap::new();

		for record in broadcast_order(&snapshot, series_id) {
			let episode = &record.episode;

			groups.entry(episode.season).or_default().push(SeasonEpisode {
				id: episode.id,
				title: episode.title.clone(),
				season: episode.season,
				episode_number: episode.episode_number,
				display_title: display_title(
					record.series_name(),
					episode,
					DisplayStyle::ShortHyphen,
				),
				air_date: episode.air_date,
			});
		}

		Ok(groups.into_iter().map(|(season, episodes)| SeasonGroup { season, episodes }).collect())
	}

	pub async fn series_first(&self, series_id: i32) -> Result<EpisodeView> {
		let snapshot = self.snapshot().await?;

		series_records(&snapshot, series_id)
			.min_by_key(|record| (record.episode.air_date, record.episode.id))
			.map(EpisodeView::from_record)
			.ok_or_else(|| no_series_episodes(series_id))
	}

	pub async fn series_latest(&self, series_id: i32) -> Result<EpisodeView> {
		let snapshot = self.snapshot().await?;

		series_records(&snapshot, series_id)
			.min_by_key(|record| (Reverse(record.episode.air_date), record.episode.id))
			.map(EpisodeView::from_record)
			.ok_or_else(|| no_series_episodes(series_id))
	}

	pub async fn series_random(
		&self,
		series_id: i32,
		req: SeriesRandomRequest,
	) -> Result<EpisodeView> {
		let snapshot = self.snapshot().await?;
		let candidates: Vec<&EpisodeRecord> =
			series_records(&snapshot, series_id).filter(|record| req.matches(record)).collect();

		pick_random(&candidates)
			.map(EpisodeView::from_record)
			.ok_or_else(|| Error::not_found(req.not_found_message(series_id)))
	}

	pub async fn series_seasons(&self, series_id: i32) -> Result<Vec<SeasonCountItem>> {
		let snapshot = self.snapshot().await?;

		if !snapshot.series_exists(series_id) {
			return Err(series_not_found(series_id));
		}

		Ok(aggregate::season_counts(series_records(&snapshot, series_id))
			.into_iter()
			.map(SeasonCountItem::from)
			.collect())
	}

	/// Tag usage within one series. `limit` only applies when positive.
	pub async fn series_tags(
		&self,
		series_id: i32,
		limit: Option<i64>,
	) -> Result<SeriesTagsResponse> {
		let snapshot = self.snapshot().await?;

		if !snapshot.series_exists(series_id) {
			return Err(series_not_found(series_id));
		}

		let links = snapshot.catalog.links();
		let mut tags: Vec<TagUsageItem> =
			aggregate::tag_usage(links.iter().filter(|link| link.series_id == series_id))
				.into_iter()
				.map(TagUsageItem::from)
				.collect();

		if let Some(limit) = limit.filter(|limit| *limit > 0) {
			tags.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
		}

		Ok(SeriesTagsResponse { series_id, tags })
	}
}

fn series_records(snapshot: &Snapshot, series_id: i32) -> impl Iterator<Item = &EpisodeRecord> {
	snapshot.records.iter().filter(move |record| record.episode.series_id == series_id)
}

fn broadcast_order(snapshot: &Snapshot, series_id: i32) -> Vec<&EpisodeRecord> {
	let mut records: Vec<&EpisodeRecord> = series_records(snapshot, series_id).collect();

	records.sort_by_key(|record| {
		(record.episode.season, record.episode.episode_number, record.episode.id)
	});

	records
}

fn series_not_found(series_id: i32) -> Error {
	Error::not_found(format!("Series with ID {series_id} not found."))
}

fn no_series_episodes(series_id: i32) -> Error {
	Error::not_found(format!("No episodes found for series ID {series_id}."))
}
