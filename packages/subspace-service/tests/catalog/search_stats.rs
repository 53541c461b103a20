use std::{sync::Arc, time::Duration};

use subspace_domain::catalog::Catalog;
use subspace_service::{BoxFuture, CatalogStore, Error, SubspaceService};
use subspace_testkit::fixtures::{DS9, Q, TIME_TRAVEL};

use super::{ids, service, service_for, test_config};

struct StalledCatalog;
impl CatalogStore for StalledCatalog {
	fn load<'a>(&'a self) -> BoxFuture<'a, subspace_service::Result<Catalog>> {
		Box::pin(async {
			tokio::time::sleep(Duration::from_secs(5)).await;

			Ok(Catalog::default())
		})
	}
}

#[tokio::test]
async fn suggest_matches_every_kind() {
	let suggestions = service().suggest(Some(" q "), None).await.expect("Failed to suggest.");

	assert_eq!(ids(&suggestions.tags, |tag| tag.id), vec![Q]);
	assert!(suggestions.series.is_empty());
	assert_eq!(ids(&suggestions.episodes, |episode| episode.id), vec![1, 2]);
}

#[tokio::test]
async fn suggest_orders_episodes_by_title() {
	let suggestions = service().suggest(Some("time"), None).await.expect("Failed to suggest.");

	assert_eq!(ids(&suggestions.tags, |tag| tag.id), vec![TIME_TRAVEL]);
	assert_eq!(ids(&suggestions.episodes, |episode| episode.id), vec![9, 5]);
	assert_eq!(suggestions.episodes[0].display_title, "S06E01 - A Time to Stand");
	assert_eq!(suggestions.episodes[0].series.abbreviation, "DS9");
}

#[tokio::test]
async fn suggest_matches_series_names_and_codes() {
	let service = service();
	let by_name = service.suggest(Some("trek"), Some(2)).await.expect("Failed to suggest.");
	let by_code = service.suggest(Some("ds9"), None).await.expect("Failed to suggest.");

	assert_eq!(ids(&by_name.series, |series| series.id), vec![DS9, 1]);
	assert_eq!(ids(&by_code.series, |series| series.id), vec![DS9]);

	let err = service.suggest(Some(""), None).await.expect_err("Expected a validation error.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn overview_summarizes_the_catalog() {
	let stats = service().overview().await.expect("Failed to build overview.");

	assert_eq!(stats.total_series, 3);
	assert_eq!(stats.total_episodes, 10);
	assert_eq!(stats.total_tags, 8);
	assert_eq!(stats.untagged_episodes, 1);

	let most_used = stats.most_used_tag.as_ref().expect("Expected a most used tag.");

	assert_eq!((most_used.name.as_str(), most_used.usage_count), ("Klingons", 3));

	let most_tagged = stats.most_tagged_episode.as_ref().expect("Expected a most tagged episode.");

	assert_eq!(most_tagged.id, 4);
	assert_eq!(most_tagged.tag_count, 3);
	assert_eq!(most_tagged.display_title, "Star Trek: The Next Generation S04E07 - Reunion");

	let json = serde_json::to_value(&stats).expect("Failed to serialize overview.");

	assert_eq!(json["firstEpisode"]["airDate"], "1987-09-28");
	assert_eq!(json["latestEpisode"]["id"], 9);
}

#[tokio::test]
async fn overview_of_an_empty_catalog_has_no_highlights() {
	let stats = service_for(Catalog::default()).overview().await.expect("Failed to build overview.");

	assert_eq!(stats.total_episodes, 0);
	assert!(stats.most_used_tag.is_none());
	assert!(stats.most_tagged_episode.is_none());
	assert!(stats.first_episode.is_none());
	assert!(stats.latest_episode.is_none());
}

#[tokio::test]
async fn untagged_episodes_list_series_codes() {
	let untagged = service().untagged_episodes().await.expect("Failed to list untagged episodes.");

	assert_eq!(untagged.len(), 1);
	assert_eq!(untagged[0].id, 6);
	assert_eq!(untagged[0].title, "Emissary");
	assert_eq!(untagged[0].series_abbreviation, "DS9");
}

#[tokio::test]
async fn stalled_loads_time_out_as_storage_errors() {
	let mut cfg = test_config("all_groups");

	cfg.catalog.load_timeout_ms = 20;

	let service = SubspaceService::with_store(cfg, Arc::new(StalledCatalog));
	let err = service.list_series().await.expect_err("Expected a timeout.");

	match err {
		Error::Storage { message } => assert_eq!(message, "Catalog load timed out after 20 ms."),
		other => panic!("Unexpected error: {other:?}"),
	}
}
