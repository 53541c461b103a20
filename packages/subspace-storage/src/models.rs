use time::{Date, OffsetDateTime};

use subspace_domain::catalog::{Episode, EpisodeTag, Series, Tag};

#[derive(Debug, sqlx::FromRow)]
pub struct SeriesRow {
	pub series_id: i32,
	pub name: String,
	pub abbreviation: String,
}
impl From<SeriesRow> for Series {
	fn from(row: SeriesRow) -> Self {
		Self { id: row.series_id, name: row.name, abbreviation: row.abbreviation }
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct EpisodeRow {
	pub episode_id: i32,
	pub title: String,
	pub synopsis: Option<String>,
	pub series_id: i32,
	pub season: i32,
	pub episode_number: i32,
	pub imdb_url: String,
	pub air_date: Date,
	pub created_at: OffsetDateTime,
}
impl From<EpisodeRow> for Episode {
	fn from(row: EpisodeRow) -> Self {
		Self {
			id: row.episode_id,
			title: row.title,
			synopsis: row.synopsis,
			series_id: row.series_id,
			season: row.season,
			episode_number: row.episode_number,
			imdb_url: row.imdb_url,
			air_date: row.air_date,
			created_at: row.created_at,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct TagRow {
	pub tag_id: i32,
	pub name: String,
}
impl From<TagRow> for Tag {
	fn from(row: TagRow) -> Self {
		Self { id: row.tag_id, name: row.name }
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct EpisodeTagRow {
	pub episode_id: i32,
	pub tag_id: i32,
}
impl From<EpisodeTagRow> for EpisodeTag {
	fn from(row: EpisodeTagRow) -> Self {
		Self { episode_id: row.episode_id, tag_id: row.tag_id }
	}
}
