use serde::Serializer;
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339};

use subspace_domain::projection::DATE_FORMAT;

pub fn serialize<S>(value: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let formatted = value.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&formatted)
}

/// Parses `YYYY-MM-DD`. An RFC 3339 timestamp is accepted and truncated to its date.
pub fn parse(raw: &str) -> Option<Date> {
	let raw = raw.trim();

	Date::parse(raw, DATE_FORMAT)
		.ok()
		.or_else(|| OffsetDateTime::parse(raw, &Rfc3339).ok().map(OffsetDateTime::date))
}
