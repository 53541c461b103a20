use time::{OffsetDateTime, macros::date};

use subspace_service::{Error, PopularTagsRequest, TagSearchMode, TrendingTagsRequest};
use subspace_testkit::fixtures::{DS9, HONOR, KLINGONS, TNG, UNUSED_TAG, WORF};

use super::{ids, service, service_at};

fn names<T>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<&str> {
	items.iter().map(name).collect()
}

#[tokio::test]
async fn list_tags_orders_by_name() {
	let tags = service().list_tags().await.expect("Failed to list tags.");

	assert_eq!(names(&tags, |tag| tag.name.as_str()), vec![
		"Borg",
		"Honor",
		"Klingons",
		"Q",
		"Time Travel",
		"Tribbles",
		"War",
		"Worf",
	]);
}

#[tokio::test]
async fn get_tag_pages_its_episodes() {
	let service = service();
	let tag = service.get_tag(KLINGONS, None, Some(2)).await.expect("Failed to get tag.");

	assert_eq!(tag.name, "Klingons");
	assert_eq!(ids(&tag.episodes, |episode| episode.id), vec![4, 7]);
	assert_eq!(tag.episodes[0].display_title, "Star Trek: The Next Generation S04E07 - Reunion");
	assert_eq!(tag.meta.total_count, 3);
	assert_eq!(tag.meta.total_pages, 2);

	let json = serde_json::to_value(&tag).expect("Failed to serialize tag.");

	assert_eq!(json["totalCount"], 3);
	assert_eq!(json["pageSize"], 2);
	assert!(json.get("meta").is_none());

	let unused = service.get_tag(UNUSED_TAG, None, None).await.expect("Failed to get tag.");

	assert!(unused.episodes.is_empty());
	assert_eq!(unused.meta.total_pages, 0);

	let err = service.get_tag(99, None, None).await.expect_err("Expected not found.");

	match err {
		Error::NotFound { message } => assert_eq!(message, "Tag with ID 99 not found."),
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn related_tags_count_co_occurrence() {
	let service = service();
	let related = service.related_tags(KLINGONS, None).await.expect("Failed to rank tags.");

	assert_eq!(
		related.iter().map(|tag| (tag.name.as_str(), tag.usage_count)).collect::<Vec<_>>(),
		vec![("Honor", 2), ("Worf", 2), ("War", 1)]
	);

	let err = service.related_tags(UNUSED_TAG, None).await.expect_err("Expected not found.");

	match err {
		Error::NotFound { message } => assert_eq!(message, "No episodes found with tag ID 8."),
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn autocomplete_matches_prefixes_and_requires_a_query() {
	let service = service();
	let tags = service.autocomplete_tags(Some("t"), None).await.expect("Failed to autocomplete.");

	assert_eq!(names(&tags, |tag| tag.name.as_str()), vec!["Time Travel", "Tribbles"]);

	for q in [None, Some("   ")] {
		let err = service.autocomplete_tags(q, None).await.expect_err("Expected a validation error.");

		match err {
			Error::InvalidRequest { message } =>
				assert_eq!(message, "Query parameter 'q' is required."),
			other => panic!("Unexpected error: {other:?}"),
		}
	}
}

#[tokio::test]
async fn common_pairs_respect_minimum_and_order() {
	let service = service();
	let pairs = service.common_tag_pairs(None, None).await.expect("Failed to count pairs.");

	assert_eq!(
		pairs
			.iter()
			.map(|pair| (pair.tag1.id, pair.tag2.id, pair.co_occurrence_count))
			.collect::<Vec<_>>(),
		vec![(KLINGONS, HONOR, 2), (KLINGONS, WORF, 2)]
	);
	assert_eq!(pairs[0].tag1.name, "Klingons");

	let loose = service.common_tag_pairs(Some(1), Some(3)).await.expect("Failed to count pairs.");

	assert_eq!(loose.len(), 3);
	assert_eq!((loose[2].tag1.name.as_str(), loose[2].tag2.name.as_str()), ("Klingons", "War"));

	let json = serde_json::to_value(&pairs[0]).expect("Failed to serialize pair.");

	assert_eq!(json["coOccurrenceCount"], 2);
}

#[tokio::test]
async fn popular_tags_rank_and_filter() {
	let service = service();
	let all = service
		.popular_tags(PopularTagsRequest::default())
		.await
		.expect("Failed to rank tags.");

	assert_eq!(names(&all.results, |tag| tag.name.as_str()), vec![
		"Klingons",
		"Borg",
		"Honor",
		"Q",
		"Time Travel",
		"War",
		"Worf",
	]);
	assert_eq!(all.meta.page_size, 20);
	assert_eq!(all.results[0].usage_count, 3);

	let tng = service
		.popular_tags(PopularTagsRequest { series_id: Some(TNG), ..Default::default() })
		.await
		.expect("Failed to rank tags.");

	assert_eq!(names(&tng.results[..2], |tag| tag.name.as_str()), vec!["Borg", "Q"]);

	let late = service
		.popular_tags(PopularTagsRequest {
			page: Some(2),
			page_size: Some(2),
			first_aired_after: Some(date!(1995 - 10 - 02)),
			..Default::default()
		})
		.await
		.expect("Failed to rank tags.");

	assert_eq!(names(&late.results, |tag| tag.name.as_str()), vec!["Time Travel", "War"]);
	assert_eq!(late.meta.total_count, 4);
	assert_eq!(late.meta.total_pages, 2);
}

#[tokio::test]
async fn popular_recent_tags_look_at_creation_window() {
	let service = service();
	let year = service.popular_recent_tags(None, None, None).await.expect("Failed to rank tags.");
	let fortnight =
		service.popular_recent_tags(Some(15), None, None).await.expect("Failed to rank tags.");

	assert_eq!(names(&year, |tag| tag.name.as_str()), vec![
		"Klingons",
		"Time Travel",
		"War",
		"Honor",
		"Worf",
	]);
	assert_eq!(names(&fortnight, |tag| tag.name.as_str()), vec![
		"Honor",
		"Klingons",
		"Time Travel",
		"War",
	]);
}

#[tokio::test]
async fn trending_tags_compare_windows() {
	let now = OffsetDateTime::now_utc();
	let service = service_at(now);
	let trending = service
		.trending_tags_at(TrendingTagsRequest::default(), now)
		.await
		.expect("Failed to compute trending tags.");

	assert_eq!(
		trending
			.iter()
			.map(|tag| (tag.name.as_str(), tag.recent_count, tag.baseline_count))
			.collect::<Vec<_>>(),
		vec![("Klingons", 2, 1), ("Time Travel", 2, 0), ("War", 2, 0)]
	);
	assert_eq!(trending[0].growth, 100.0);
	assert_eq!(trending[1].growth, 2.0);

	let ds9 = service
		.trending_tags_at(
			TrendingTagsRequest { series_id: Some(DS9), limit: Some(2), ..Default::default() },
			now,
		)
		.await
		.expect("Failed to compute trending tags.");

	assert_eq!(names(&ds9, |tag| tag.name.as_str()), vec!["Klingons", "War"]);
}

#[tokio::test]
async fn search_tags_supports_modes() {
	let service = service();
	let contains = service
		.search_tags(Some("OR"), TagSearchMode::Contains, None, None)
		.await
		.expect("Failed to search tags.");
	let starts = service
		.search_tags(Some("t"), TagSearchMode::parse(Some("startsWith")), None, None)
		.await
		.expect("Failed to search tags.");
	let exact = service
		.search_tags(Some(" WAR "), TagSearchMode::Exact, None, None)
		.await
		.expect("Failed to search tags.");

	assert_eq!(names(&contains.results, |tag| tag.name.as_str()), vec!["Borg", "Honor", "Worf"]);
	assert_eq!(names(&starts.results, |tag| tag.name.as_str()), vec!["Time Travel", "Tribbles"]);
	assert_eq!(names(&exact.results, |tag| tag.name.as_str()), vec!["War"]);
	assert_eq!(contains.meta.page_size, 25);
	assert_eq!(TagSearchMode::parse(Some("fuzzy")), TagSearchMode::Contains);
}
