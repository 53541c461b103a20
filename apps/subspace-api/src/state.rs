use std::sync::Arc;

use subspace_service::{CatalogStore, SubspaceService};
use subspace_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SubspaceService>,
}
impl AppState {
	pub async fn new(config: subspace_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = SubspaceService::new(config, db);

		Ok(Self { service: Arc::new(service) })
	}

	/// Serves from an arbitrary store without touching Postgres.
	pub fn with_store(config: subspace_config::Config, store: Arc<dyn CatalogStore>) -> Self {
		Self { service: Arc::new(SubspaceService::with_store(config, store)) }
	}
}
