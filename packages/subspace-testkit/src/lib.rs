mod error;

pub mod fixtures;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor, PgPool,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

use subspace_domain::catalog::Catalog;

const DSN_ENV: &str = "SUBSPACE_PG_DSN";
// Databases tried, in order, for CREATE/DROP DATABASE.
const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];
const MAX_IDENTIFIER_LEN: usize = 63;

pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok()
}

/// A catalog database created for one test on the server `SUBSPACE_PG_DSN` points at. Dropped on
/// `cleanup`, or from a helper thread when the value is dropped first.
pub struct TestDatabase {
	name: String,
	dsn: String,
	admin: AdminTarget,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("Invalid {DSN_ENV}: {err}.")))?;
		let name = database_name(base.get_database(), Uuid::new_v4());
		let admin = AdminTarget::locate(&base).await?;

		admin.create(&name).await?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, admin, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	/// Pool settings for this database, sized for a single test.
	pub fn postgres(&self) -> subspace_config::Postgres {
		subspace_config::Postgres {
			dsn: self.dsn.clone(),
			pool_max_conns: 2,
			acquire_timeout_ms: 5_000,
		}
	}

	pub async fn cleanup(mut self) -> Result<()> {
		self.admin.drop_database(&self.name).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = self.name.clone();
		let admin = self.admin.clone();
		// The test's runtime may be shutting down, so the drop runs on its own.
		let handle = thread::spawn(move || {
			let outcome = Builder::new_current_thread()
				.enable_all()
				.build()
				.map_err(|err| Error::Message(err.to_string()))
				.and_then(|runtime| runtime.block_on(admin.drop_database(&name)));

			if let Err(err) = outcome {
				eprintln!("Leaked test database {name}: {err}");
			}
		});
		let _ = handle.join();
	}
}

/// Inserts a catalog with its explicit ids. The schema must already exist.
pub async fn seed_catalog(pool: &PgPool, catalog: &Catalog) -> Result<()> {
	let mut tx = pool.begin().await?;

	for series in &catalog.series {
		sqlx::query("INSERT INTO series (series_id, name, abbreviation) VALUES ($1, $2, $3)")
			.bind(series.id)
			.bind(series.name.as_str())
			.bind(series.abbreviation.as_str())
			.execute(&mut *tx)
			.await?;
	}
	for tag in &catalog.tags {
		sqlx::query("INSERT INTO tags (tag_id, name) VALUES ($1, $2)")
			.bind(tag.id)
			.bind(tag.name.as_str())
			.execute(&mut *tx)
			.await?;
	}
	for episode in &catalog.episodes {
		sqlx::query(
			"\
INSERT INTO episodes (
	episode_id,
	title,
	synopsis,
	series_id,
	season,
	episode_number,
	imdb_url,
	air_date,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
		)
		.bind(episode.id)
		.bind(episode.title.as_str())
		.bind(episode.synopsis.as_deref())
		.bind(episode.series_id)
		.bind(episode.season)
		.bind(episode.episode_number)
		.bind(episode.imdb_url.as_str())
		.bind(episode.air_date)
		.bind(episode.created_at)
		.execute(&mut *tx)
		.await?;
	}
	for link in &catalog.episode_tags {
		sqlx::query("INSERT INTO episode_tags (episode_id, tag_id) VALUES ($1, $2)")
			.bind(link.episode_id)
			.bind(link.tag_id)
			.execute(&mut *tx)
			.await?;
	}

	tx.commit().await?;

	Ok(())
}

/// A maintenance database on the test server that accepts CREATE/DROP DATABASE.
#[derive(Clone)]
struct AdminTarget {
	options: PgConnectOptions,
}
impl AdminTarget {
	async fn locate(base: &PgConnectOptions) -> Result<Self> {
		let mut failures = Vec::new();

		for database in MAINTENANCE_DATABASES {
			let options = base.clone().database(database);

			match PgConnection::connect_with(&options).await {
				Ok(conn) => {
					let _ = conn.close().await;

					return Ok(Self { options });
				},
				Err(err) => failures.push(format!("{database}: {err}")),
			}
		}

		Err(Error::Message(format!("No maintenance database reachable ({}).", failures.join("; "))))
	}

	async fn create(&self, name: &str) -> Result<()> {
		let mut conn = PgConnection::connect_with(&self.options).await?;

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await?;

		Ok(())
	}

	// FORCE terminates pools the test left open (Postgres 13+).
	async fn drop_database(&self, name: &str) -> Result<()> {
		let mut conn = PgConnection::connect_with(&self.options).await?;

		conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#).as_str()).await?;

		Ok(())
	}
}

/// `{base}_test_{uuid}`, trimmed so the result fits a Postgres identifier.
fn database_name(base: Option<&str>, id: Uuid) -> String {
	let suffix = format!("_test_{}", id.simple());
	let mut prefix: String = base
		.unwrap_or("subspace")
		.chars()
		.filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
		.map(|ch| ch.to_ascii_lowercase())
		.collect();

	prefix.truncate(MAX_IDENTIFIER_LEN - suffix.len());

	if prefix.is_empty() {
		prefix.push_str("subspace");
	}

	prefix + &suffix
}
