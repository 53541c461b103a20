use sqlx::{PgConnection, Postgres, Transaction};

use subspace_domain::catalog::Catalog;

use crate::{
	Result,
	db::Db,
	models::{EpisodeRow, EpisodeTagRow, SeriesRow, TagRow},
};

/// Reads the four catalog tables inside one read-only snapshot so they agree with each other.
pub async fn load_catalog(db: &Db) -> Result<Catalog> {
	let mut tx = db.pool.begin().await?;

	sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
		.execute(&mut *tx)
		.await?;

	let catalog = load_catalog_tx(&mut tx).await?;

	tx.commit().await?;

	Ok(catalog)
}

async fn load_catalog_tx(tx: &mut Transaction<'_, Postgres>) -> Result<Catalog> {
	let conn: &mut PgConnection = &mut *tx;
	let series: Vec<SeriesRow> = sqlx::query_as(
		"\
SELECT series_id, name, abbreviation
FROM series
ORDER BY series_id",
	)
	.fetch_all(&mut *conn)
	.await?;
	let tags: Vec<TagRow> = sqlx::query_as(
		"\
SELECT tag_id, name
FROM tags
ORDER BY tag_id",
	)
	.fetch_all(&mut *conn)
	.await?;
	let episodes: Vec<EpisodeRow> = sqlx::query_as(
		"\
SELECT
	episode_id,
	title,
	synopsis,
	series_id,
	season,
	episode_number,
	imdb_url,
	air_date,
	created_at
FROM episodes
ORDER BY episode_id",
	)
	.fetch_all(&mut *conn)
	.await?;
	let episode_tags: Vec<EpisodeTagRow> = sqlx::query_as(
		"\
SELECT episode_id, tag_id
FROM episode_tags
ORDER BY episode_id, tag_id",
	)
	.fetch_all(&mut *conn)
	.await?;

	Ok(Catalog {
		series: series.into_iter().map(Into::into).collect(),
		tags: tags.into_iter().map(Into::into).collect(),
		episodes: episodes.into_iter().map(Into::into).collect(),
		episode_tags: episode_tags.into_iter().map(Into::into).collect(),
	})
}
