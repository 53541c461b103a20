use time::macros::date;

use subspace_service::{Error, SeriesDetail, SeriesRandomRequest, View};
use subspace_testkit::fixtures::{DS9, TNG, VOY};

use super::{ids, service};

#[tokio::test]
async fn list_series_counts_episodes() {
	let series = service().list_series().await.expect("Failed to list series.");

	assert_eq!(ids(&series, |series| series.id), vec![TNG, DS9, VOY]);
	assert_eq!(
		series.iter().map(|series| series.episode_count).collect::<Vec<_>>(),
		vec![5, 5, 0]
	);
}

#[tokio::test]
async fn get_series_supports_compact_view() {
	let service = service();
	let full = service.get_series(VOY, View::Full).await.expect("Failed to get series.");
	let compact = service.get_series(DS9, View::Compact).await.expect("Failed to get series.");

	match full {
		SeriesDetail::Full(summary) => {
			assert_eq!(summary.abbreviation, "VOY");
			assert_eq!(summary.episode_count, 0);
		},
		other => panic!("Unexpected view: {other:?}"),
	}

	assert_eq!(
		serde_json::to_value(&compact).expect("Failed to serialize series."),
		serde_json::json!({ "id": DS9, "name": "Star Trek: Deep Space Nine" })
	);
}

#[tokio::test]
async fn get_missing_series_is_not_found() {
	let err = service().get_series(99, View::Full).await.expect_err("Expected not found.");

	match err {
		Error::NotFound { message } => assert_eq!(message, "Series with ID 99 not found."),
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn series_episodes_page_in_broadcast_order() {
	let service = service();
	let page = service.series_episodes(DS9, None, Some(2)).await.expect("Failed to page series.");
	let all = service.series_episodes(DS9, None, None).await.expect("Failed to page series.");
	let unknown = service.series_episodes(99, None, None).await.expect("Failed to page series.");

	assert_eq!(ids(&page.data, |view| view.id), vec![6, 7]);
	assert_eq!(page.meta.total_count, 5);
	assert_eq!(page.meta.total_pages, 3);
	assert_eq!(ids(&all.data, |view| view.id), vec![6, 7, 8, 10, 9]);
	assert!(unknown.data.is_empty());
	assert_eq!(unknown.meta.total_count, 0);
}

#[tokio::test]
async fn episodes_group_by_season() {
	let service = service();
	let groups = service.series_episodes_by_season(DS9).await.expect("Failed to group episodes.");

	assert_eq!(ids(&groups, |group| group.season), vec![1, 4, 5, 6]);
	assert_eq!(ids(&groups[1].episodes, |episode| episode.id), vec![7, 8]);
	assert_eq!(groups[1].episodes[0].display_title, "S04E01 - The Way of the Warrior");

	let empty = service.series_episodes_by_season(VOY).await.expect("Failed to group episodes.");

	assert!(empty.is_empty());

	let err = service.series_episodes_by_season(99).await.expect_err("Expected not found.");

	assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn first_and_latest_per_series() {
	let service = service();
	let first = service.series_first(TNG).await.expect("Failed to get first episode.");
	let latest = service.series_latest(DS9).await.expect("Failed to get latest episode.");

	assert_eq!(first.id, 1);
	assert_eq!(latest.id, 9);

	let err = service.series_first(VOY).await.expect_err("Expected not found.");

	match err {
		Error::NotFound { message } => assert_eq!(message, "No episodes found for series ID 3."),
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn series_random_respects_constraints() {
	let service = service();
	let req = SeriesRandomRequest { season: Some(4), ..Default::default() };

	for _ in 0..20 {
		let episode = service.series_random(DS9, req.clone()).await.expect("Failed to pick.");

		assert!([7, 8].contains(&episode.id));
	}

	let req = SeriesRandomRequest {
		season: Some(4),
		first_aired_after: Some(date!(1991 - 01 - 01)),
		..Default::default()
	};
	let err = service.series_random(TNG, req).await.expect_err("Expected not found.");

	match err {
		Error::NotFound { message } => assert_eq!(
			message,
			"No episodes found for series ID 1 and season 4 after 1991-01-01."
		),
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn seasons_count_episodes() {
	let seasons = service().series_seasons(DS9).await.expect("Failed to count seasons.");

	assert_eq!(
		seasons.iter().map(|item| (item.season, item.count)).collect::<Vec<_>>(),
		vec![(1, 1), (4, 2), (5, 1), (6, 1)]
	);
}

#[tokio::test]
async fn series_tags_rank_usage_and_apply_positive_limits() {
	let service = service();
	let all = service.series_tags(DS9, Some(0)).await.expect("Failed to rank tags.");
	let top = service.series_tags(DS9, Some(2)).await.expect("Failed to rank tags.");

	assert_eq!(all.series_id, DS9);
	assert_eq!(
		all.tags.iter().map(|tag| (tag.name.as_str(), tag.usage_count)).collect::<Vec<_>>(),
		vec![("Klingons", 2), ("War", 2), ("Honor", 1), ("Time Travel", 1), ("Worf", 1)]
	);
	assert_eq!(top.tags.len(), 2);

	let err = service.series_tags(99, None).await.expect_err("Expected not found.");

	assert!(matches!(err, Error::NotFound { .. }));
}
