use subspace_domain::catalog::Catalog;

use crate::{BoxFuture, CatalogStore, Result};

/// Serves a fixed catalog from memory.
pub struct MemoryCatalog {
	catalog: Catalog,
}
impl MemoryCatalog {
	pub fn new(catalog: Catalog) -> Self {
		Self { catalog }
	}
}
impl CatalogStore for MemoryCatalog {
	fn load<'a>(&'a self) -> BoxFuture<'a, Result<Catalog>> {
		let catalog = self.catalog.clone();

		Box::pin(async move { Ok(catalog) })
	}
}
