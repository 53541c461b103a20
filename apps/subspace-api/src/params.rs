//! Query-string decoding. Keys match case-insensitively, blank values count as absent, and
//! malformed numbers or dates are rejected with a validation error naming the field.

use std::str::FromStr;

use time::Date;

use subspace_domain::filter::EpisodeFilter;

use crate::routes::ApiError;

#[derive(Debug, Clone, Default)]
pub struct Params {
	pairs: Vec<(String, String)>,
}
impl Params {
	pub fn new(pairs: Vec<(String, String)>) -> Self {
		Self { pairs }
	}

	pub fn text(&self, name: &str) -> Option<&str> {
		self.values(name).next()
	}

	pub fn number<T>(&self, name: &str) -> Result<Option<T>, ApiError>
	where
		T: FromStr,
	{
		self.text(name)
			.map(|raw| {
				raw.parse::<T>().map_err(|_| {
					ApiError::invalid_field(name, format!("Query parameter '{name}' must be an integer."))
				})
			})
			.transpose()
	}

	pub fn required_number<T>(&self, name: &str) -> Result<T, ApiError>
	where
		T: FromStr,
	{
		self.number(name)?.ok_or_else(|| {
			ApiError::invalid_field(name, format!("Query parameter '{name}' is required."))
		})
	}

	/// `YYYY-MM-DD`, or an RFC 3339 timestamp truncated to its date.
	pub fn date(&self, name: &str) -> Result<Option<Date>, ApiError> {
		self.text(name)
			.map(|raw| {
				subspace_service::date_serde::parse(raw).ok_or_else(|| {
					ApiError::invalid_field(
						name,
						format!("Query parameter '{name}' must be a date (YYYY-MM-DD)."),
					)
				})
			})
			.transpose()
	}

	/// Collects `tagIds` from repeated keys, `tagIds[]` keys and comma-separated lists.
	pub fn tag_ids(&self) -> Result<Vec<i32>, ApiError> {
		let mut ids = Vec::new();

		for raw in self.values("tagIds").chain(self.values("tagIds[]")) {
			for token in raw.split(',').map(str::trim).filter(|token| !token.is_empty()) {
				let id = token.parse::<i32>().map_err(|_| {
					ApiError::invalid_field(
						"tagIds",
						"Query parameter 'tagIds' must hold integers.".to_string(),
					)
				})?;

				ids.push(id);
			}
		}

		Ok(ids)
	}

	/// Every episode filter field the query string carries.
	pub fn episode_filter(&self) -> Result<EpisodeFilter, ApiError> {
		Ok(EpisodeFilter {
			series_id: self.number("seriesId")?,
			season: self.number("season")?,
			title: self.owned("title"),
			keyword: self.owned("keyword"),
			keywords_all: self.owned("keywordsAll"),
			first_aired_after: self.date("firstAiredAfter")?,
			first_aired_before: self.date("firstAiredBefore")?,
			tag_ids: self.tag_ids()?,
			tags: self.owned("tags"),
		})
	}

	fn owned(&self, name: &str) -> Option<String> {
		self.text(name).map(str::to_string)
	}

	fn values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
		self.pairs
			.iter()
			.filter(move |(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.trim())
			.filter(|value| !value.is_empty())
	}
}
