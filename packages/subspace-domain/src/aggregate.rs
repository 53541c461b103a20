//! Grouping and ranking over association rows. Every ranking ends in a unique key so truncation
//! to the top N is reproducible.

use std::{
	cmp::Ordering,
	collections::{BTreeMap, BTreeSet, HashMap},
};

use time::{Duration, OffsetDateTime, PrimitiveDateTime};

use crate::catalog::{EpisodeRecord, TagLink};

const MAX_WINDOW_DAYS: i64 = 3_650_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUsage {
	pub tag_id: i32,
	pub name: String,
	pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendWindow {
	pub now: OffsetDateTime,
	pub recent_days: i64,
	pub baseline_days: i64,
}
impl TrendWindow {
	pub fn recent_start(&self) -> OffsetDateTime {
		window_start(self.now, self.recent_days)
	}

	pub fn baseline_start(&self) -> OffsetDateTime {
		window_start(self.recent_start(), self.baseline_days)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendingTag {
	pub tag_id: i32,
	pub name: String,
	pub recent_count: usize,
	pub baseline_count: usize,
	pub growth: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedEpisode<'a> {
	pub record: &'a EpisodeRecord,
	pub shared_tag_count: usize,
}

/// An unordered tag pair, stored with `first < second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagPair {
	pub first: i32,
	pub second: i32,
	pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonCount {
	pub season: i32,
	pub count: usize,
}

/// Counts association rows per tag, most used first, then by name and id.
pub fn tag_usage<'a>(links: impl IntoIterator<Item = &'a TagLink>) -> Vec<TagUsage> {
	let mut counts: HashMap<i32, TagUsage> = HashMap::new();

	for link in links {
		counts
			.entry(link.tag_id)
			.or_insert_with(|| TagUsage { tag_id: link.tag_id, name: link.tag_name.clone(), count: 0 })
			.count += 1;
	}

	let mut usage: Vec<TagUsage> = counts.into_values().collect();

	usage.sort_by(|a, b| {
		b.count
			.cmp(&a.count)
			.then_with(|| name_order(&a.name, &b.name))
			.then_with(|| a.tag_id.cmp(&b.tag_id))
	});

	usage
}

/// Compares per-tag counts in the recent window (`created_at >= recent_start`) against the
/// baseline window right before it. Growth is a percentage rounded to two decimals; with an
/// empty baseline it equals the recent count. Only tags with recent use and positive growth are
/// kept.
pub fn trending_tags<'a>(
	links: impl IntoIterator<Item = &'a TagLink>,
	window: TrendWindow,
) -> Vec<TrendingTag> {
	let recent_start = window.recent_start();
	let baseline_start = window.baseline_start();
	let mut recent: Vec<&TagLink> = Vec::new();
	let mut baseline: HashMap<i32, usize> = HashMap::new();

	for link in links {
		if link.created_at >= recent_start {
			recent.push(link);
		} else if link.created_at >= baseline_start {
			*baseline.entry(link.tag_id).or_insert(0) += 1;
		}
	}

	let mut trending: Vec<TrendingTag> = tag_usage(recent)
		.into_iter()
		.map(|usage| {
			let baseline_count = baseline.get(&usage.tag_id).copied().unwrap_or(0);

			TrendingTag {
				growth: growth(usage.count, baseline_count),
				tag_id: usage.tag_id,
				name: usage.name,
				recent_count: usage.count,
				baseline_count,
			}
		})
		.filter(|tag| tag.recent_count > 0 && tag.growth > 0.0)
		.collect();

	trending.sort_by(|a, b| {
		b.growth
			.total_cmp(&a.growth)
			.then_with(|| b.recent_count.cmp(&a.recent_count))
			.then_with(|| name_order(&a.name, &b.name))
			.then_with(|| a.tag_id.cmp(&b.tag_id))
	});

	trending
}

pub fn growth(recent: usize, baseline: usize) -> f64 {
	if baseline == 0 {
		return recent as f64;
	}

	let percent = (recent as f64 - baseline as f64) / baseline as f64 * 100.0;

	(percent * 100.0).round() / 100.0
}

/// Ranks other episodes by how many tags they share with the reference. Returns `None` when the
/// reference is missing or has no tags.
pub fn related_episodes(
	records: &[EpisodeRecord],
	episode_id: i32,
	limit: usize,
) -> Option<Vec<RelatedEpisode<'_>>> {
	let reference = records.iter().find(|record| record.episode.id == episode_id)?;
	let reference_tags: BTreeSet<i32> = reference.tags.iter().map(|tag| tag.id).collect();

	if reference_tags.is_empty() {
		return None;
	}

	let mut related: Vec<RelatedEpisode<'_>> = records
		.iter()
		.filter(|record| record.episode.id != episode_id)
		.filter_map(|record| {
			let shared_tag_count = record
				.tags
				.iter()
				.map(|tag| tag.id)
				.collect::<BTreeSet<_>>()
				.intersection(&reference_tags)
				.count();

			(shared_tag_count > 0).then_some(RelatedEpisode { record, shared_tag_count })
		})
		.collect();

	related.sort_by(|a, b| {
		b.shared_tag_count
			.cmp(&a.shared_tag_count)
			.then_with(|| a.record.episode.id.cmp(&b.record.episode.id))
	});
	related.truncate(limit);

	Some(related)
}

/// Counts how often other tags appear on the episodes carrying `tag_id`. Returns `None` when no
/// episode carries the tag.
pub fn related_tags(links: &[TagLink], tag_id: i32, limit: usize) -> Option<Vec<TagUsage>> {
	let episodes: BTreeSet<i32> =
		links.iter().filter(|link| link.tag_id == tag_id).map(|link| link.episode_id).collect();

	if episodes.is_empty() {
		return None;
	}

	let mut related = tag_usage(
		links.iter().filter(|link| link.tag_id != tag_id && episodes.contains(&link.episode_id)),
	);

	related.truncate(limit);

	Some(related)
}

/// Counts co-occurring tag pairs. Rows are grouped by episode first and each episode contributes
/// one occurrence per unordered pair of its distinct tags.
pub fn common_pairs(links: &[TagLink], min_count: usize, limit: usize) -> Vec<TagPair> {
	let mut by_episode: HashMap<i32, BTreeSet<i32>> = HashMap::new();

	for link in links {
		by_episode.entry(link.episode_id).or_default().insert(link.tag_id);
	}

	let mut counts: BTreeMap<(i32, i32), usize> = BTreeMap::new();

	for tags in by_episode.values() {
		let tags: Vec<i32> = tags.iter().copied().collect();

		for (i, first) in tags.iter().enumerate() {
			for second in &tags[i + 1..] {
				*counts.entry((*first, *second)).or_insert(0) += 1;
			}
		}
	}

	let mut pairs: Vec<TagPair> = counts
		.into_iter()
		.filter(|(_, count)| *count >= min_count)
		.map(|((first, second), count)| TagPair { first, second, count })
		.collect();

	pairs.sort_by(|a, b| {
		b.count.cmp(&a.count).then_with(|| (a.first, a.second).cmp(&(b.first, b.second)))
	});
	pairs.truncate(limit);

	pairs
}

pub fn season_counts<'a>(records: impl IntoIterator<Item = &'a EpisodeRecord>) -> Vec<SeasonCount> {
	let mut counts: BTreeMap<i32, usize> = BTreeMap::new();

	for record in records {
		*counts.entry(record.episode.season).or_insert(0) += 1;
	}

	counts.into_iter().map(|(season, count)| SeasonCount { season, count }).collect()
}

/// Picks the record with the most tags; ties go to the lowest id.
pub fn most_tagged(records: &[EpisodeRecord]) -> Option<&EpisodeRecord> {
	records
		.iter()
		.filter(|record| !record.tags.is_empty())
		.min_by(|a, b| match b.tags.len().cmp(&a.tags.len()) {
			Ordering::Equal => a.episode.id.cmp(&b.episode.id),
			ordering => ordering,
		})
}

// Case-insensitive, matching how tag lists are ordered by name.
fn name_order(a: &str, b: &str) -> Ordering {
	a.to_lowercase().cmp(&b.to_lowercase())
}

fn window_start(end: OffsetDateTime, days: i64) -> OffsetDateTime {
	end.checked_sub(Duration::days(days.clamp(0, MAX_WINDOW_DAYS)))
		.unwrap_or_else(|| PrimitiveDateTime::MIN.assume_utc())
}
