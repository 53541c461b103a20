pub mod date_serde;
pub mod episodes;
pub mod memory;
pub mod search;
pub mod series;
pub mod stats;
pub mod tags;
pub mod views;

mod error;

pub use episodes::{
	AliasEpisode, EpisodeDetail, EpisodeListRequest, EpisodePage, RelatedEpisodeItem,
	RelatedEpisodesResponse, TimelineItem, TimelineRequest,
};
pub use error::{Error, Result};
pub use memory::MemoryCatalog;
pub use search::{SuggestEpisode, SuggestResponse};
pub use series::{
	SeasonCountItem, SeasonEpisode, SeasonGroup, SeriesDetail, SeriesRandomRequest,
	SeriesSummary, SeriesTagsResponse,
};
pub use stats::{EpisodeDateRef, MostTaggedEpisode, OverviewStats, UntaggedEpisode};
pub use tags::{
	PopularTagsRequest, TagEpisodeItem, TagListPage, TagPairItem, TagSearchMode, TagWithEpisodes,
	TrendingTagItem, TrendingTagsRequest,
};
pub use views::{SeriesRef, TagRef, TagUsageItem, View};

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use subspace_config::Config;
use subspace_domain::{
	catalog::{Catalog, EpisodeRecord},
	filter::TagMatch,
};
use subspace_storage::{db::Db, queries};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Source of catalog snapshots. Each call returns a consistent view of all four tables.
pub trait CatalogStore
where
	Self: Send + Sync,
{
	fn load<'a>(&'a self) -> BoxFuture<'a, Result<Catalog>>;
}

/// Postgres-backed store.
pub struct PgCatalog {
	db: Db,
}
impl PgCatalog {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}
impl CatalogStore for PgCatalog {
	fn load<'a>(&'a self) -> BoxFuture<'a, Result<Catalog>> {
		Box::pin(async move { Ok(queries::load_catalog(&self.db).await?) })
	}
}

pub struct SubspaceService {
	pub cfg: Config,
	pub store: Arc<dyn CatalogStore>,
	tag_match: TagMatch,
}
impl SubspaceService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self::with_store(cfg, Arc::new(PgCatalog::new(db)))
	}

	pub fn with_store(cfg: Config, store: Arc<dyn CatalogStore>) -> Self {
		let tag_match = TagMatch::parse(&cfg.catalog.tag_filter_mode).unwrap_or_default();

		Self { cfg, store, tag_match }
	}

	pub fn tag_match(&self) -> TagMatch {
		self.tag_match
	}

	/// Loads a snapshot, bounded by `catalog.load_timeout_ms`.
	pub(crate) async fn snapshot(&self) -> Result<Snapshot> {
		let timeout_ms = self.cfg.catalog.load_timeout_ms;
		let catalog =
			match tokio::time::timeout(Duration::from_millis(timeout_ms), self.store.load()).await {
				Ok(result) => result?,
				Err(_) => {
					tracing::warn!(timeout_ms, "Catalog load timed out.");

					return Err(Error::Storage {
						message: format!("Catalog load timed out after {timeout_ms} ms."),
					});
				},
			};

		Ok(Snapshot::new(catalog))
	}
}

pub(crate) struct Snapshot {
	pub(crate) catalog: Catalog,
	pub(crate) records: Vec<EpisodeRecord>,
}
impl Snapshot {
	fn new(catalog: Catalog) -> Self {
		let records = catalog.records();

		Self { catalog, records }
	}

	pub(crate) fn record(&self, episode_id: i32) -> Option<&EpisodeRecord> {
		self.records.iter().find(|record| record.episode.id == episode_id)
	}

	pub(crate) fn series_exists(&self, series_id: i32) -> bool {
		self.catalog.series_by_id(series_id).is_some()
	}
}

/// Rejects a missing or blank free-text query and returns it trimmed.
pub(crate) fn required_query(raw: Option<&str>) -> Result<&str> {
	raw.map(str::trim)
		.filter(|value| !value.is_empty())
		.ok_or_else(|| Error::invalid("Query parameter 'q' is required."))
}
