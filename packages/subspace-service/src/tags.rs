use std::collections::HashMap;

use serde::Serialize;
use time::{Date, OffsetDateTime};

use subspace_domain::{
	aggregate::{self, TrendWindow, TrendingTag},
	catalog::{Tag, TagLink},
	filter::contains_ci,
	paging::{PageMeta, PageRequest, clamp_limit, paginate},
	projection::{DisplayStyle, display_title},
};

use crate::{
	Error, Result, SubspaceService, TagRef, TagUsageItem,
	episodes::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
	required_query,
};

const DEFAULT_RELATED_LIMIT: usize = 10;
const MAX_RELATED_LIMIT: usize = 100;
const DEFAULT_AUTOCOMPLETE_LIMIT: usize = 10;
const MAX_AUTOCOMPLETE_LIMIT: usize = 50;
const DEFAULT_PAIR_MIN_COUNT: usize = 2;
const DEFAULT_PAIR_LIMIT: usize = 50;
const MAX_PAIR_LIMIT: usize = 100;
const DEFAULT_POPULAR_PAGE_SIZE: usize = 20;
const DEFAULT_RANKING_LIMIT: usize = 10;
const MAX_RANKING_LIMIT: usize = 100;
const DEFAULT_WINDOW_DAYS: i64 = 365;

/// Pagination fields flattened next to the result list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagListPage<T> {
	#[serde(flatten)]
	pub meta: PageMeta,
	pub results: Vec<T>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagWithEpisodes {
	pub id: i32,
	pub name: String,
	#[serde(flatten)]
	pub meta: PageMeta,
	pub episodes: Vec<TagEpisodeItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagEpisodeItem {
	pub id: i32,
	pub title: String,
	pub display_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagPairItem {
	pub tag1: TagRef,
	pub tag2: TagRef,
	pub co_occurrence_count: usize,
}

/// Air-date bounds are exclusive.
#[derive(Debug, Clone, Default)]
pub struct PopularTagsRequest {
	pub page: Option<i64>,
	pub page_size: Option<i64>,
	pub series_id: Option<i32>,
	pub first_aired_after: Option<Date>,
	pub first_aired_before: Option<Date>,
}

#[derive(Debug, Clone, Default)]
pub struct TrendingTagsRequest {
	pub recent_days: Option<i64>,
	pub baseline_days: Option<i64>,
	pub series_id: Option<i32>,
	pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingTagItem {
	pub id: i32,
	pub name: String,
	pub recent_count: usize,
	pub baseline_count: usize,
	pub growth: f64,
}
impl From<TrendingTag> for TrendingTagItem {
	fn from(tag: TrendingTag) -> Self {
		Self {
			id: tag.tag_id,
			name: tag.name,
			recent_count: tag.recent_count,
			baseline_count: tag.baseline_count,
			growth: tag.growth,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagSearchMode {
	#[default]
	Contains,
	StartsWith,
	Exact,
}
impl TagSearchMode {
	/// Unknown modes fall back to `Contains`.
	pub fn parse(raw: Option<&str>) -> Self {
		match raw.map(|raw| raw.trim().to_lowercase()).as_deref() {
			Some("startswith") => Self::StartsWith,
			Some("exact") => Self::Exact,
			_ => Self::Contains,
		}
	}

	fn matches(self, name: &str, lowered_query: &str) -> bool {
		match self {
			Self::Contains => contains_ci(name, lowered_query),
			Self::StartsWith => name.to_lowercase().starts_with(lowered_query),
			Self::Exact => name.to_lowercase() == lowered_query,
		}
	}
}

impl SubspaceService {
	pub async fn list_tags(&self) -> Result<Vec<TagRef>> {
		let snapshot = self.snapshot().await?;

		Ok(sorted_by_name(snapshot.catalog.tags.iter()).into_iter().map(TagRef::from).collect())
	}

	/// A tag with a page of the episodes carrying it, ordered by episode id.
	pub async fn get_tag(
		&self,
		tag_id: i32,
		page: Option<i64>,
		page_size: Option<i64>,
	) -> Result<TagWithEpisodes> {
		let snapshot = self.snapshot().await?;
		let tag = snapshot
			.catalog
			.tag_by_id(tag_id)
			.ok_or_else(|| Error::not_found(format!("Tag with ID {tag_id} not found.")))?;
		let request = PageRequest::clamped(page, page_size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
		let page = paginate(snapshot.records.iter().filter(|record| record.has_tag(tag_id)), request)
			.map(|record| TagEpisodeItem {
				id: record.episode.id,
				title: record.episode.title.clone(),
				display_title: display_title(
					record.series_name(),
					&record.episode,
					DisplayStyle::SeriesLong,
				),
			});

		Ok(TagWithEpisodes {
			id: tag.id,
			name: tag.name.clone(),
			meta: page.meta,
			episodes: page.items,
		})
	}

	/// Tags that co-occur with `tag_id`, most frequent first.
	pub async fn related_tags(&self, tag_id: i32, limit: Option<i64>) -> Result<Vec<TagUsageItem>> {
		let limit = clamp_limit(limit, DEFAULT_RELATED_LIMIT, 1, MAX_RELATED_LIMIT);
		let snapshot = self.snapshot().await?;
		let related = aggregate::related_tags(&snapshot.catalog.links(), tag_id, limit)
			.ok_or_else(|| Error::not_found(format!("No episodes found with tag ID {tag_id}.")))?;

		Ok(related.into_iter().map(TagUsageItem::from).collect())
	}

	/// Case-insensitive prefix match on tag names.
	pub async fn autocomplete_tags(&self, q: Option<&str>, limit: Option<i64>) -> Result<Vec<TagRef>> {
		let query = required_query(q)?.to_lowercase();
		let limit = clamp_limit(limit, DEFAULT_AUTOCOMPLETE_LIMIT, 1, MAX_AUTOCOMPLETE_LIMIT);
		let snapshot = self.snapshot().await?;
		let matched = snapshot
			.catalog
			.tags
			.iter()
			.filter(|tag| TagSearchMode::StartsWith.matches(&tag.name, &query));

		Ok(sorted_by_name(matched).into_iter().take(limit).map(TagRef::from).collect())
	}

	pub async fn common_tag_pairs(
		&self,
		min_count: Option<i64>,
		limit: Option<i64>,
	) -> Result<Vec<TagPairItem>> {
		let min_count = clamp_limit(min_count, DEFAULT_PAIR_MIN_COUNT, 1, usize::MAX);
		let limit = clamp_limit(limit, DEFAULT_PAIR_LIMIT, 1, MAX_PAIR_LIMIT);
		let snapshot = self.snapshot().await?;
		let names: HashMap<i32, &str> =
			snapshot.catalog.tags.iter().map(|tag| (tag.id, tag.name.as_str())).collect();
		let tag_ref = |id: i32| TagRef {
			id,
			name: names.get(&id).map(|name| name.to_string()).unwrap_or_default(),
		};

		Ok(aggregate::common_pairs(&snapshot.catalog.links(), min_count, limit)
			.into_iter()
			.map(|pair| TagPairItem {
				tag1: tag_ref(pair.first),
				tag2: tag_ref(pair.second),
				co_occurrence_count: pair.count,
			})
			.collect())
	}

	/// Usage ranking over the episodes matching the request, paged.
	pub async fn popular_tags(
		&self,
		req: PopularTagsRequest,
	) -> Result<TagListPage<TagUsageItem>> {
		let request =
			PageRequest::clamped(req.page, req.page_size, DEFAULT_POPULAR_PAGE_SIZE, MAX_PAGE_SIZE);
		let snapshot = self.snapshot().await?;
		let links = snapshot.catalog.links();
		let usage = aggregate::tag_usage(links.iter().filter(|link| {
			in_series(link, req.series_id)
				&& req.first_aired_after.is_none_or(|after| link.air_date > after)
				&& req.first_aired_before.is_none_or(|before| link.air_date < before)
		}));
		let page = paginate(usage, request).map(TagUsageItem::from);

		Ok(TagListPage { meta: page.meta, results: page.items })
	}

	/// Usage ranking over episodes added within the last `days` days.
	pub async fn popular_recent_tags(
		&self,
		days: Option<i64>,
		series_id: Option<i32>,
		limit: Option<i64>,
	) -> Result<Vec<TagUsageItem>> {
		let limit = clamp_limit(limit, DEFAULT_RANKING_LIMIT, 1, MAX_RANKING_LIMIT);
		let since = TrendWindow {
			now: OffsetDateTime::now_utc(),
			recent_days: days.unwrap_or(DEFAULT_WINDOW_DAYS).max(1),
			baseline_days: 0,
		}
		.recent_start();
		let snapshot = self.snapshot().await?;
		let links = snapshot.catalog.links();
		let mut usage = aggregate::tag_usage(
			links.iter().filter(|link| in_series(link, series_id) && link.created_at >= since),
		);

		usage.truncate(limit);

		Ok(usage.into_iter().map(TagUsageItem::from).collect())
	}

	pub async fn trending_tags(&self, req: TrendingTagsRequest) -> Result<Vec<TrendingTagItem>> {
		self.trending_tags_at(req, OffsetDateTime::now_utc()).await
	}

	/// [`SubspaceService::trending_tags`] with an explicit reference time.
	pub async fn trending_tags_at(
		&self,
		req: TrendingTagsRequest,
		now: OffsetDateTime,
	) -> Result<Vec<TrendingTagItem>> {
		let limit = clamp_limit(req.limit, DEFAULT_RANKING_LIMIT, 1, MAX_RANKING_LIMIT);
		let window = TrendWindow {
			now,
			recent_days: req.recent_days.unwrap_or(DEFAULT_WINDOW_DAYS).max(1),
			baseline_days: req.baseline_days.unwrap_or(DEFAULT_WINDOW_DAYS).max(1),
		};
		let snapshot = self.snapshot().await?;
		let links = snapshot.catalog.links();
		let mut trending = aggregate::trending_tags(
			links.iter().filter(|link| in_series(link, req.series_id)),
			window,
		);

		trending.truncate(limit);

		tracing::debug!(
			recent_days = window.recent_days,
			baseline_days = window.baseline_days,
			returned = trending.len(),
			"Evaluated trending tags."
		);

		Ok(trending.into_iter().map(TrendingTagItem::from).collect())
	}

	pub async fn search_tags(
		&self,
		q: Option<&str>,
		mode: TagSearchMode,
		page: Option<i64>,
		page_size: Option<i64>,
	) -> Result<TagListPage<TagRef>> {
		let query = required_query(q)?.to_lowercase();
		let request = PageRequest::clamped(page, page_size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
		let snapshot = self.snapshot().await?;
		let matched = sorted_by_name(
			snapshot.catalog.tags.iter().filter(|tag| mode.matches(&tag.name, &query)),
		);
		let page = paginate(matched, request).map(TagRef::from);

		Ok(TagListPage { meta: page.meta, results: page.items })
	}
}

/// Case-insensitive name order with an id tie-break.
pub(crate) fn sorted_by_name<'a>(tags: impl Iterator<Item = &'a Tag>) -> Vec<&'a Tag> {
	let mut tags: Vec<&Tag> = tags.collect();

	tags.sort_by_cached_key(|tag| (tag.name.to_lowercase(), tag.id));

	tags
}

fn in_series(link: &TagLink, series_id: Option<i32>) -> bool {
	series_id.is_none_or(|id| link.series_id == id)
}
