use axum::{
	Json, Router,
	extract::{FromRequestParts, Path, Query, State, rejection::PathRejection},
	http::{HeaderName, HeaderValue, StatusCode, request::Parts},
	response::{IntoResponse, Response},
	routing::get,
};
use serde::{Serialize, de::DeserializeOwned};

use subspace_domain::{filter::EpisodeFilter, projection::EpisodeView};
use subspace_service::{
	AliasEpisode, EpisodeDetail, EpisodeListRequest, EpisodePage, OverviewStats,
	PopularTagsRequest, RelatedEpisodesResponse, SeasonCountItem, SeasonGroup, SeriesDetail,
	SeriesRandomRequest, SeriesSummary, SeriesTagsResponse, SuggestResponse, TagListPage,
	TagPairItem, TagRef, TagSearchMode, TagUsageItem, TagWithEpisodes, TimelineItem,
	TimelineRequest, TrendingTagItem, TrendingTagsRequest, UntaggedEpisode, View,
};

use crate::{params::Params, state::AppState};

type QueryPairs = Query<Vec<(String, String)>>;

const PAGINATION_HEADER: HeaderName = HeaderName::from_static("x-pagination");

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/episodes", get(list_episodes))
		.route("/api/episodes/{id}", get(get_episode))
		.route("/api/episodes/alias/{code}/{season}/{episode}", get(episode_by_alias))
		.route("/api/episodes/first", get(first_episode))
		.route("/api/episodes/latest", get(latest_episode))
		.route("/api/episodes/random", get(random_episode))
		.route("/api/episodes/random/multiple", get(random_episodes))
		.route("/api/episodes/recently-added", get(recently_added))
		.route("/api/episodes/related", get(related_episodes))
		.route("/api/episodes/timeline", get(timeline))
		.route("/api/series", get(list_series))
		.route("/api/series/{id}", get(get_series))
		.route("/api/series/{id}/episodes", get(series_episodes))
		.route("/api/series/{id}/episodes/grouped-by-season", get(series_episodes_by_season))
		.route("/api/series/{id}/first", get(series_first))
		.route("/api/series/{id}/latest", get(series_latest))
		.route("/api/series/{id}/random", get(series_random))
		.route("/api/series/{id}/seasons", get(series_seasons))
		.route("/api/series/{id}/tags", get(series_tags))
		.route("/api/tags", get(list_tags))
		.route("/api/tags/{id}", get(get_tag))
		.route("/api/tags/{id}/related", get(related_tags))
		.route("/api/tags/autocomplete", get(autocomplete_tags))
		.route("/api/tags/common-pairs", get(common_tag_pairs))
		.route("/api/tags/popular", get(popular_tags))
		.route("/api/tags/popular/recent", get(popular_recent_tags))
		.route("/api/tags/popular/trending", get(trending_tags))
		.route("/api/tags/search", get(search_tags))
		.route("/api/search/episodes", get(search_episodes))
		.route("/api/search/suggest", get(suggest))
		.route("/api/stats/overview", get(overview))
		.route("/api/stats/untagged", get(untagged_episodes))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_episodes(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Response, ApiError> {
	let req = episode_list_request(&Params::new(pairs))?;
	let page = state.service.list_episodes(req).await?;

	paged(page)
}

async fn get_episode(
	State(state): State<AppState>,
	PathParams(id): PathParams<i32>,
	Query(pairs): QueryPairs,
) -> Result<Json<EpisodeDetail>, ApiError> {
	let view = View::parse(Params::new(pairs).text("view"));

	Ok(Json(state.service.get_episode(id, view).await?))
}

async fn episode_by_alias(
	State(state): State<AppState>,
	PathParams((code, season, episode)): PathParams<(String, i32, i32)>,
) -> Result<Json<AliasEpisode>, ApiError> {
	Ok(Json(state.service.get_episode_by_alias(&code, season, episode).await?))
}

async fn first_episode(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Json<EpisodeView>, ApiError> {
	let filter = lookup_filter(&Params::new(pairs))?;

	Ok(Json(state.service.first_episode(filter).await?))
}

async fn latest_episode(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Json<EpisodeView>, ApiError> {
	let filter = lookup_filter(&Params::new(pairs))?;

	Ok(Json(state.service.latest_episode(filter).await?))
}

async fn random_episode(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Json<EpisodeView>, ApiError> {
	let filter = Params::new(pairs).episode_filter()?;

	Ok(Json(state.service.random_episode(filter).await?))
}

async fn random_episodes(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Json<Vec<EpisodeView>>, ApiError> {
	let params = Params::new(pairs);
	let filter = params.episode_filter()?;
	let count = params.number("count")?;

	Ok(Json(state.service.random_episodes(filter, count).await?))
}

async fn recently_added(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Json<Vec<EpisodeView>>, ApiError> {
	let params = Params::new(pairs);
	let full = params.episode_filter()?;
	let filter = EpisodeFilter {
		series_id: full.series_id,
		first_aired_after: full.first_aired_after,
		first_aired_before: full.first_aired_before,
		tag_ids: full.tag_ids,
		tags: full.tags,
		..Default::default()
	};
	let count = params.number("count")?;

	Ok(Json(state.service.recently_added(filter, count).await?))
}

async fn related_episodes(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Json<RelatedEpisodesResponse>, ApiError> {
	let params = Params::new(pairs);
	let episode_id = params.required_number("episodeId")?;
	let limit = params.number("limit")?;

	Ok(Json(state.service.related_episodes(episode_id, limit).await?))
}

async fn timeline(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Json<Vec<TimelineItem>>, ApiError> {
	let params = Params::new(pairs);
	let req = TimelineRequest {
		start: params.date("start")?,
		end: params.date("end")?,
		series_id: params.number("seriesId")?,
		tag_id: params.number("tagId")?,
		limit: params.number("limit")?,
	};

	Ok(Json(state.service.timeline(req).await?))
}

async fn list_series(State(state): State<AppState>) -> Result<Json<Vec<SeriesSummary>>, ApiError> {
	Ok(Json(state.service.list_series().await?))
}

async fn get_series(
	State(state): State<AppState>,
	PathParams(id): PathParams<i32>,
	Query(pairs): QueryPairs,
) -> Result<Json<SeriesDetail>, ApiError> {
	let view = View::parse(Params::new(pairs).text("view"));

	Ok(Json(state.service.get_series(id, view).await?))
}

async fn series_episodes(
	State(state): State<AppState>,
	PathParams(id): PathParams<i32>,
	Query(pairs): QueryPairs,
) -> Result<Response, ApiError> {
	let params = Params::new(pairs);
	let page =
		state.service.series_episodes(id, params.number("page")?, params.number("pageSize")?).await?;

	paged(page)
}

async fn series_episodes_by_season(
	State(state): State<AppState>,
	PathParams(id): PathParams<i32>,
) -> Result<Json<Vec<SeasonGroup>>, ApiError> {
	Ok(Json(state.service.series_episodes_by_season(id).await?))
}

async fn series_first(
	State(state): State<AppState>,
	PathParams(id): PathParams<i32>,
) -> Result<Json<EpisodeView>, ApiError> {
	Ok(Json(state.service.series_first(id).await?))
}

async fn series_latest(
	State(state): State<AppState>,
	PathParams(id): PathParams<i32>,
) -> Result<Json<EpisodeView>, ApiError> {
	Ok(Json(state.service.series_latest(id).await?))
}

async fn series_random(
	State(state): State<AppState>,
	PathParams(id): PathParams<i32>,
	Query(pairs): QueryPairs,
) -> Result<Json<EpisodeView>, ApiError> {
	let params = Params::new(pairs);
	let req = SeriesRandomRequest {
		season: params.number("season")?,
		first_aired_after: params.date("firstAiredAfter")?,
		first_aired_before: params.date("firstAiredBefore")?,
	};

	Ok(Json(state.service.series_random(id, req).await?))
}

async fn series_seasons(
	State(state): State<AppState>,
	PathParams(id): PathParams<i32>,
) -> Result<Json<Vec<SeasonCountItem>>, ApiError> {
	Ok(Json(state.service.series_seasons(id).await?))
}

async fn series_tags(
	State(state): State<AppState>,
	PathParams(id): PathParams<i32>,
	Query(pairs): QueryPairs,
) -> Result<Json<SeriesTagsResponse>, ApiError> {
	let limit = Params::new(pairs).number("limit")?;

	Ok(Json(state.service.series_tags(id, limit).await?))
}

async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<TagRef>>, ApiError> {
	Ok(Json(state.service.list_tags().await?))
}

async fn get_tag(
	State(state): State<AppState>,
	PathParams(id): PathParams<i32>,
	Query(pairs): QueryPairs,
) -> Result<Json<TagWithEpisodes>, ApiError> {
	let params = Params::new(pairs);

	Ok(Json(state.service.get_tag(id, params.number("page")?, params.number("pageSize")?).await?))
}

async fn related_tags(
	State(state): State<AppState>,
	PathParams(id): PathParams<i32>,
	Query(pairs): QueryPairs,
) -> Result<Json<Vec<TagUsageItem>>, ApiError> {
	let limit = Params::new(pairs).number("limit")?;

	Ok(Json(state.service.related_tags(id, limit).await?))
}

async fn autocomplete_tags(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Json<Vec<TagRef>>, ApiError> {
	let params = Params::new(pairs);
	let limit = params.number("limit")?;

	Ok(Json(state.service.autocomplete_tags(params.text("q"), limit).await?))
}

async fn common_tag_pairs(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Json<Vec<TagPairItem>>, ApiError> {
	let params = Params::new(pairs);
	let min_count = params.number("minCount")?;
	let limit = params.number("limit")?;

	Ok(Json(state.service.common_tag_pairs(min_count, limit).await?))
}

async fn popular_tags(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Json<TagListPage<TagUsageItem>>, ApiError> {
	let params = Params::new(pairs);
	let req = PopularTagsRequest {
		page: params.number("page")?,
		page_size: params.number("pageSize")?,
		series_id: params.number("seriesId")?,
		first_aired_after: params.date("firstAiredAfter")?,
		first_aired_before: params.date("firstAiredBefore")?,
	};

	Ok(Json(state.service.popular_tags(req).await?))
}

async fn popular_recent_tags(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Json<Vec<TagUsageItem>>, ApiError> {
	let params = Params::new(pairs);
	let days = params.number("days")?;
	let series_id = params.number("seriesId")?;
	let limit = params.number("limit")?;

	Ok(Json(state.service.popular_recent_tags(days, series_id, limit).await?))
}

async fn trending_tags(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Json<Vec<TrendingTagItem>>, ApiError> {
	let params = Params::new(pairs);
	let req = TrendingTagsRequest {
		recent_days: params.number("recentDays")?,
		baseline_days: params.number("baselineDays")?,
		series_id: params.number("seriesId")?,
		limit: params.number("limit")?,
	};

	Ok(Json(state.service.trending_tags(req).await?))
}

async fn search_tags(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Json<TagListPage<TagRef>>, ApiError> {
	let params = Params::new(pairs);
	let mode = TagSearchMode::parse(params.text("mode"));
	let page = params.number("page")?;
	let page_size = params.number("pageSize")?;

	Ok(Json(state.service.search_tags(params.text("q"), mode, page, page_size).await?))
}

async fn search_episodes(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Response, ApiError> {
	let req = episode_list_request(&Params::new(pairs))?;
	let page = state.service.search_episodes(req).await?;

	paged(page)
}

async fn suggest(
	State(state): State<AppState>,
	Query(pairs): QueryPairs,
) -> Result<Json<SuggestResponse>, ApiError> {
	let params = Params::new(pairs);
	let limit = params.number("limit")?;

	Ok(Json(state.service.suggest(params.text("q"), limit).await?))
}

async fn overview(State(state): State<AppState>) -> Result<Json<OverviewStats>, ApiError> {
	Ok(Json(state.service.overview().await?))
}

async fn untagged_episodes(
	State(state): State<AppState>,
) -> Result<Json<Vec<UntaggedEpisode>>, ApiError> {
	Ok(Json(state.service.untagged_episodes().await?))
}

fn episode_list_request(params: &Params) -> Result<EpisodeListRequest, ApiError> {
	Ok(EpisodeListRequest {
		filter: params.episode_filter()?,
		sort_by: params.text("sortBy").map(str::to_string),
		order: params.text("order").map(str::to_string),
		page: params.number("page")?,
		page_size: params.number("pageSize")?,
	})
}

/// Series, season and tag criteria only.
fn lookup_filter(params: &Params) -> Result<EpisodeFilter, ApiError> {
	Ok(EpisodeFilter {
		series_id: params.number("seriesId")?,
		season: params.number("season")?,
		tag_ids: params.tag_ids()?,
		tags: params.text("tags").map(str::to_string),
		..Default::default()
	})
}

/// Writes the page metadata to `X-Pagination` as well as the body.
fn paged(page: EpisodePage) -> Result<Response, ApiError> {
	let meta = serde_json::to_string(&page.meta).map_err(|err| {
		json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", err.to_string(), None)
	})?;
	let header = HeaderValue::from_str(&meta).map_err(|err| {
		json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", err.to_string(), None)
	})?;

	Ok(([(PAGINATION_HEADER, header)], Json(page)).into_response())
}

/// `Path` whose rejection uses the JSON error body.
pub struct PathParams<T>(pub T);
impl<S, T> FromRequestParts<S> for PathParams<T>
where
	S: Send + Sync,
	T: DeserializeOwned + Send,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let Path(value) = Path::<T>::from_request_parts(parts, state).await?;

		Ok(Self(value))
	}
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}

	pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "invalid_request", message, Some(vec![field.to_string()]))
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

impl From<subspace_service::Error> for ApiError {
	fn from(err: subspace_service::Error) -> Self {
		match err {
			subspace_service::Error::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message, None),
			subspace_service::Error::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "not_found", message, None),
			subspace_service::Error::Storage { message } => {
				tracing::error!(error = %message, "Catalog storage failure.");

				json_error(
					StatusCode::SERVICE_UNAVAILABLE,
					"storage_unavailable",
					"The catalog is temporarily unavailable.",
					None,
				)
			},
		}
	}
}

impl From<PathRejection> for ApiError {
	fn from(rejection: PathRejection) -> Self {
		Self::invalid_field("path", rejection.body_text())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
