use std::{collections::BTreeSet, sync::Arc};

use time::macros::date;

use subspace_domain::{filter::EpisodeFilter, projection::EpisodeView};
use subspace_service::{
	EpisodeDetail, EpisodeListRequest, Error, MemoryCatalog, SubspaceService, TimelineRequest, View,
};
use subspace_testkit::fixtures::{self, DS9, HONOR, KLINGONS, UNUSED_TAG};

use super::{ids, service, test_config};

fn view_ids(views: &[EpisodeView]) -> Vec<i32> {
	ids(views, |view| view.id)
}

#[tokio::test]
async fn list_defaults_to_first_page_in_id_order() {
	let page = service()
		.list_episodes(EpisodeListRequest::default())
		.await
		.expect("Failed to list episodes.");

	assert_eq!(view_ids(&page.data), (1..=10).collect::<Vec<_>>());
	assert_eq!(page.meta.total_count, 10);
	assert_eq!(page.meta.page, 1);
	assert_eq!(page.meta.page_size, 25);
	assert_eq!(page.meta.total_pages, 1);
}

#[tokio::test]
async fn list_slices_requested_page() {
	let req = EpisodeListRequest { page: Some(2), page_size: Some(3), ..Default::default() };
	let page = service().list_episodes(req).await.expect("Failed to list episodes.");

	assert_eq!(view_ids(&page.data), vec![4, 5, 6]);
	assert_eq!(page.meta.total_pages, 4);
}

#[tokio::test]
async fn list_clamps_page_and_page_size() {
	let req = EpisodeListRequest { page: Some(-4), page_size: Some(1_000), ..Default::default() };
	let page = service().list_episodes(req).await.expect("Failed to list episodes.");

	assert_eq!(page.meta.page, 1);
	assert_eq!(page.meta.page_size, 100);
	assert_eq!(page.data.len(), 10);
}

#[tokio::test]
async fn list_page_past_the_end_is_empty() {
	let req = EpisodeListRequest { page: Some(5), page_size: Some(5), ..Default::default() };
	let page = service().list_episodes(req).await.expect("Failed to list episodes.");

	assert!(page.data.is_empty());
	assert_eq!(page.meta.total_count, 10);
	assert_eq!(page.meta.total_pages, 2);
}

#[tokio::test]
async fn list_sorts_by_air_date_descending() {
	let req = EpisodeListRequest {
		sort_by: Some("airdate".to_string()),
		order: Some("DESC".to_string()),
		..Default::default()
	};
	let page = service().list_episodes(req).await.expect("Failed to list episodes.");

	assert_eq!(view_ids(&page.data), vec![9, 10, 8, 7, 6, 5, 4, 3, 2, 1]);
}

#[tokio::test]
async fn list_sorts_by_several_keys_with_id_tie_break() {
	let req = EpisodeListRequest { sort_by: Some("season, episode".to_string()), ..Default::default() };
	let page = service().list_episodes(req).await.expect("Failed to list episodes.");

	assert_eq!(view_ids(&page.data), vec![1, 6, 2, 3, 7, 8, 4, 10, 5, 9]);
}

#[tokio::test]
async fn list_filters_by_tag_ids_and_names() {
	let service = service();
	let by_id = EpisodeListRequest {
		filter: EpisodeFilter { tag_ids: vec![KLINGONS], ..Default::default() },
		..Default::default()
	};
	let by_name = EpisodeListRequest {
		filter: EpisodeFilter { tags: Some("worf, WAR".to_string()), ..Default::default() },
		..Default::default()
	};

	let page = service.list_episodes(by_id).await.expect("Failed to list episodes.");

	assert_eq!(view_ids(&page.data), vec![4, 7, 10]);

	let page = service.list_episodes(by_name).await.expect("Failed to list episodes.");

	assert_eq!(view_ids(&page.data), vec![4, 7, 9]);
}

#[tokio::test]
async fn tag_id_and_name_lists_follow_configured_mode() {
	let filter = EpisodeFilter {
		tag_ids: vec![HONOR],
		tags: Some("war".to_string()),
		..Default::default()
	};
	let all_groups = service()
		.list_episodes(EpisodeListRequest { filter: filter.clone(), ..Default::default() })
		.await
		.expect("Failed to list episodes.");
	let merged = SubspaceService::with_store(
		test_config("merged"),
		Arc::new(MemoryCatalog::new(fixtures::sample_catalog())),
	)
	.list_episodes(EpisodeListRequest { filter, ..Default::default() })
	.await
	.expect("Failed to list episodes.");

	assert_eq!(all_groups.meta.total_count, 0);
	assert_eq!(view_ids(&merged.data), vec![4, 7, 9, 10]);
}

#[tokio::test]
async fn list_ignores_keywords_but_search_applies_them() {
	let service = service();
	let filter = EpisodeFilter { keyword: Some("borg".to_string()), ..Default::default() };
	let listed = service
		.list_episodes(EpisodeListRequest { filter: filter.clone(), ..Default::default() })
		.await
		.expect("Failed to list episodes.");
	let searched = service
		.search_episodes(EpisodeListRequest { filter, ..Default::default() })
		.await
		.expect("Failed to search episodes.");

	assert_eq!(listed.meta.total_count, 10);
	assert_eq!(view_ids(&searched.data), vec![2, 3]);
}

#[tokio::test]
async fn search_requires_every_word_for_keywords_all() {
	let filter = EpisodeFilter { keywords_all: Some("klingon,war".to_string()), ..Default::default() };
	let page = service()
		.search_episodes(EpisodeListRequest { filter, ..Default::default() })
		.await
		.expect("Failed to search episodes.");

	assert_eq!(view_ids(&page.data), vec![7]);
}

#[tokio::test]
async fn keyword_search_skips_titles_and_missing_synopses() {
	let filter = EpisodeFilter { keyword: Some("rising".to_string()), ..Default::default() };
	let page = service()
		.search_episodes(EpisodeListRequest { filter, ..Default::default() })
		.await
		.expect("Failed to search episodes.");

	assert_eq!(page.meta.total_count, 0);
	assert_eq!(page.meta.total_pages, 0);
}

#[tokio::test]
async fn get_episode_renders_full_and_compact_views() {
	let service = service();
	let full = service.get_episode(4, View::Full).await.expect("Failed to get episode.");
	let EpisodeDetail::Full(full) = full else {
		panic!("Expected the full view.");
	};

	assert_eq!(full.display_title, "Star Trek: The Next Generation S04E07 - Reunion");
	assert_eq!(full.formatted_date, "1990-11-05");
	assert_eq!(full.tags, vec!["Klingons", "Honor", "Worf"]);
	assert_eq!(full.imdb_url, "https://www.imdb.com/title/tt0708704/");

	let compact = service.get_episode(4, View::Compact).await.expect("Failed to get episode.");
	let json = serde_json::to_value(&compact).expect("Failed to serialize episode.");

	assert_eq!(
		json,
		serde_json::json!({ "id": 4, "title": "Reunion", "displayTitle": "S04E07: Reunion" })
	);
}

#[tokio::test]
async fn get_missing_episode_is_not_found() {
	let err = service().get_episode(99, View::Full).await.expect_err("Expected not found.");

	assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn alias_lookup_ignores_series_code_case() {
	let episode =
		service().get_episode_by_alias("ds9", 4, 3).await.expect("Failed to resolve alias.");

	assert_eq!(episode.id, 8);
	assert_eq!(episode.series.abbreviation, "DS9");
	assert_eq!(episode.tags.iter().map(|tag| tag.name.as_str()).collect::<Vec<_>>(), vec![
		"Time Travel"
	]);

	let json = serde_json::to_value(&episode).expect("Failed to serialize episode.");

	assert_eq!(json["airDate"], "1995-10-09");
	assert_eq!(json["episodeNumber"], 3);
}

#[tokio::test]
async fn alias_miss_names_the_code() {
	let err = service().get_episode_by_alias("tng", 9, 9).await.expect_err("Expected not found.");

	match err {
		Error::NotFound { message } => assert_eq!(message, "No episode found for tng S09E09"),
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn first_and_latest_follow_air_date() {
	let service = service();
	let first = service.first_episode(EpisodeFilter::default()).await.expect("Failed to get first.");
	let latest =
		service.latest_episode(EpisodeFilter::default()).await.expect("Failed to get latest.");
	let first_ds9 = service
		.first_episode(EpisodeFilter { series_id: Some(DS9), ..Default::default() })
		.await
		.expect("Failed to get first.");
	let latest_klingon = service
		.latest_episode(EpisodeFilter { tags: Some("klingons".to_string()), ..Default::default() })
		.await
		.expect("Failed to get latest.");

	assert_eq!(first.id, 1);
	assert_eq!(latest.id, 9);
	assert_eq!(first_ds9.id, 6);
	assert_eq!(latest_klingon.id, 10);
}

#[tokio::test]
async fn first_without_matches_is_not_found() {
	let err = service()
		.first_episode(EpisodeFilter { tag_ids: vec![UNUSED_TAG], ..Default::default() })
		.await
		.expect_err("Expected not found.");

	match err {
		Error::NotFound { message } => assert_eq!(message, "No matching episodes found."),
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn random_episode_stays_inside_the_filter() {
	let service = service();
	let filter = EpisodeFilter { series_id: Some(DS9), season: Some(4), ..Default::default() };

	for _ in 0..20 {
		let episode =
			service.random_episode(filter.clone()).await.expect("Failed to pick an episode.");

		assert!([7, 8].contains(&episode.id));
	}

	let err = service
		.random_episode(EpisodeFilter { season: Some(40), ..Default::default() })
		.await
		.expect_err("Expected not found.");

	assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn random_episodes_are_distinct_and_clamped() {
	let service = service();
	let three = service
		.random_episodes(EpisodeFilter::default(), Some(3))
		.await
		.expect("Failed to pick episodes.");
	let distinct: BTreeSet<i32> = three.iter().map(|episode| episode.id).collect();

	assert_eq!(three.len(), 3);
	assert_eq!(distinct.len(), 3);

	let all = service
		.random_episodes(EpisodeFilter::default(), Some(500))
		.await
		.expect("Failed to pick episodes.");

	assert_eq!(all.len(), 10);

	let one = service
		.random_episodes(EpisodeFilter::default(), Some(0))
		.await
		.expect("Failed to pick episodes.");

	assert_eq!(one.len(), 1);
}

#[tokio::test]
async fn recently_added_orders_by_creation_then_id() {
	let service = service();
	let all = service
		.recently_added(EpisodeFilter::default(), None)
		.await
		.expect("Failed to list recent episodes.");
	let top = service
		.recently_added(EpisodeFilter::default(), Some(3))
		.await
		.expect("Failed to list recent episodes.");

	assert_eq!(view_ids(&all), vec![10, 9, 8, 7, 6, 5, 4, 3, 2, 1]);
	assert_eq!(view_ids(&top), vec![10, 9, 8]);
}

#[tokio::test]
async fn related_episodes_rank_by_shared_tags() {
	let related = service().related_episodes(4, None).await.expect("Failed to rank episodes.");

	assert_eq!(related.episode_id, 4);
	assert_eq!(ids(&related.related, |item| item.id), vec![7, 10]);
	assert_eq!(related.related[0].shared_tag_count, 2);
	assert_eq!(
		related.related[0].display_title,
		"Star Trek: Deep Space Nine S04E01 - The Way of the Warrior"
	);
}

#[tokio::test]
async fn related_episodes_need_a_tagged_reference() {
	let service = service();

	for episode_id in [6, 99] {
		let err = service.related_episodes(episode_id, None).await.expect_err("Expected not found.");

		assert!(matches!(err, Error::NotFound { .. }));
	}
}

#[tokio::test]
async fn timeline_uses_inclusive_bounds() {
	let service = service();
	let window = service
		.timeline(TimelineRequest {
			start: Some(date!(1995 - 10 - 02)),
			end: Some(date!(1995 - 10 - 09)),
			..Default::default()
		})
		.await
		.expect("Failed to build timeline.");
	let limited = service
		.timeline(TimelineRequest { limit: Some(2), ..Default::default() })
		.await
		.expect("Failed to build timeline.");
	let klingons = service
		.timeline(TimelineRequest { tag_id: Some(KLINGONS), ..Default::default() })
		.await
		.expect("Failed to build timeline.");

	assert_eq!(ids(&window, |item| item.id), vec![7, 8]);
	assert_eq!(ids(&limited, |item| item.id), vec![1, 2]);
	assert_eq!(ids(&klingons, |item| item.id), vec![4, 7, 10]);
	assert_eq!(window[0].series.name, "Star Trek: Deep Space Nine");
}
