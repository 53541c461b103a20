use serde::Serialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::catalog::{Episode, EpisodeRecord};

/// ISO calendar date, `YYYY-MM-DD`. Shared by projections, JSON dates and query parsing.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day]");

/// Display title layouts. Each endpoint picks one and clients match on the exact text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStyle {
	/// `{Series} S01E02 - {Title}`
	SeriesLong,
	/// `S01E02: {Title}`
	ShortColon,
	/// `S01E02 - {Title}`
	ShortHyphen,
}

/// Full episode view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeView {
	pub id: i32,
	pub title: String,
	pub synopsis: Option<String>,
	pub series_id: i32,
	pub series_name: String,
	pub season: i32,
	pub episode_number: i32,
	pub imdb_url: String,
	pub formatted_date: String,
	pub display_title: String,
	pub tags: Vec<String>,
}
impl EpisodeView {
	pub fn from_record(record: &EpisodeRecord) -> Self {
		let episode = &record.episode;
		let mut tags: Vec<String> = Vec::with_capacity(record.tags.len());

		for tag in &record.tags {
			if !tags.contains(&tag.name) {
				tags.push(tag.name.clone());
			}
		}

		Self {
			id: episode.id,
			title: episode.title.clone(),
			synopsis: episode.synopsis.clone(),
			series_id: episode.series_id,
			series_name: record.series_name().to_string(),
			season: episode.season,
			episode_number: episode.episode_number,
			imdb_url: episode.imdb_url.clone(),
			formatted_date: format_date(episode.air_date),
			display_title: display_title(record.series_name(), episode, DisplayStyle::SeriesLong),
			tags,
		}
	}
}

/// Compact episode view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSummary {
	pub id: i32,
	pub title: String,
	pub display_title: String,
}
impl EpisodeSummary {
	pub fn from_record(record: &EpisodeRecord, style: DisplayStyle) -> Self {
		Self {
			id: record.episode.id,
			title: record.episode.title.clone(),
			display_title: display_title(record.series_name(), &record.episode, style),
		}
	}
}

pub fn episode_code(season: i32, episode_number: i32) -> String {
	format!("S{season:02}E{episode_number:02}")
}

pub fn display_title(series_name: &str, episode: &Episode, style: DisplayStyle) -> String {
	let code = episode_code(episode.season, episode.episode_number);

	match style {
		DisplayStyle::SeriesLong => format!("{series_name} {code} - {}", episode.title),
		DisplayStyle::ShortColon => format!("{code}: {}", episode.title),
		DisplayStyle::ShortHyphen => format!("{code} - {}", episode.title),
	}
}

pub fn format_date(date: Date) -> String {
	// A date-only description cannot fail on a `Date`; `Display` prints the same layout.
	date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}
