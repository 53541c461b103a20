//! A small catalog shared by service, HTTP and database tests.
//!
//! Series 3 has no episodes and episode 6 has no tags. Creation timestamps are relative to the
//! current time: episodes 1 to 4 fall in the default trending baseline window (365 to 730 days
//! ago) and episodes 5 to 10 in the recent one.

use time::{Date, Duration, OffsetDateTime, macros::date};

use subspace_domain::catalog::{Catalog, Episode, EpisodeTag, Series, Tag};

pub const TNG: i32 = 1;
pub const DS9: i32 = 2;
pub const VOY: i32 = 3;

pub const KLINGONS: i32 = 1;
pub const WAR: i32 = 2;
pub const HONOR: i32 = 3;
pub const BORG: i32 = 4;
pub const Q: i32 = 5;
pub const TIME_TRAVEL: i32 = 6;
pub const WORF: i32 = 7;
pub const UNUSED_TAG: i32 = 8;

struct EpisodeSeed {
	id: i32,
	series_id: i32,
	season: i32,
	episode_number: i32,
	title: &'static str,
	synopsis: Option<&'static str>,
	air_date: Date,
	created_days_ago: i64,
	tags: &'static [i32],
}

const EPISODES: [EpisodeSeed; 10] = [
	EpisodeSeed {
		id: 1,
		series_id: TNG,
		season: 1,
		episode_number: 1,
		title: "Encounter at Farpoint",
		synopsis: Some("Q puts humanity on trial as the Enterprise heads to Farpoint Station."),
		air_date: date!(1987 - 09 - 28),
		created_days_ago: 600,
		tags: &[Q],
	},
	EpisodeSeed {
		id: 2,
		series_id: TNG,
		season: 2,
		episode_number: 16,
		title: "Q Who",
		synopsis: Some("Q flings the Enterprise across the galaxy into the path of the Borg."),
		air_date: date!(1989 - 05 - 08),
		created_days_ago: 600,
		tags: &[Q, BORG],
	},
	EpisodeSeed {
		id: 3,
		series_id: TNG,
		season: 3,
		episode_number: 26,
		title: "The Best of Both Worlds",
		synopsis: Some("The Borg assimilate Captain Picard."),
		air_date: date!(1990 - 06 - 18),
		created_days_ago: 400,
		tags: &[BORG],
	},
	EpisodeSeed {
		id: 4,
		series_id: TNG,
		season: 4,
		episode_number: 7,
		title: "Reunion",
		synopsis: Some("Worf faces K'Ehleyr and the politics of the Klingon High Council."),
		air_date: date!(1990 - 11 - 05),
		created_days_ago: 400,
		tags: &[KLINGONS, HONOR, WORF],
	},
	EpisodeSeed {
		id: 5,
		series_id: TNG,
		season: 5,
		episode_number: 26,
		title: "Time's Arrow",
		synopsis: Some("Data's head is found in a cave beneath San Francisco."),
		air_date: date!(1992 - 06 - 15),
		created_days_ago: 30,
		tags: &[TIME_TRAVEL],
	},
	EpisodeSeed {
		id: 6,
		series_id: DS9,
		season: 1,
		episode_number: 1,
		title: "Emissary",
		synopsis: Some("Commander Sisko takes command of Deep Space Nine."),
		air_date: date!(1993 - 01 - 03),
		created_days_ago: 30,
		tags: &[],
	},
	EpisodeSeed {
		id: 7,
		series_id: DS9,
		season: 4,
		episode_number: 1,
		title: "The Way of the Warrior",
		synopsis: Some("The Klingon Empire goes to war with the Cardassians."),
		air_date: date!(1995 - 10 - 02),
		created_days_ago: 20,
		tags: &[KLINGONS, WAR, WORF],
	},
	EpisodeSeed {
		id: 8,
		series_id: DS9,
		season: 4,
		episode_number: 3,
		title: "The Visitor",
		synopsis: Some("An aging Jake Sisko tries to rescue his father from subspace."),
		air_date: date!(1995 - 10 - 09),
		created_days_ago: 10,
		tags: &[TIME_TRAVEL],
	},
	EpisodeSeed {
		id: 9,
		series_id: DS9,
		season: 6,
		episode_number: 1,
		title: "A Time to Stand",
		synopsis: Some("Three months into the Dominion war the Federation is losing."),
		air_date: date!(1997 - 09 - 29),
		created_days_ago: 5,
		tags: &[WAR],
	},
	EpisodeSeed {
		id: 10,
		series_id: DS9,
		season: 5,
		episode_number: 1,
		title: "Apocalypse Rising",
		synopsis: None,
		air_date: date!(1996 - 09 - 30),
		created_days_ago: 2,
		tags: &[KLINGONS, HONOR],
	},
];

/// The sample catalog with creation timestamps anchored at `now`.
pub fn sample_catalog_at(now: OffsetDateTime) -> Catalog {
	let series = vec![
		series(TNG, "Star Trek: The Next Generation", "TNG"),
		series(DS9, "Star Trek: Deep Space Nine", "DS9"),
		series(VOY, "Star Trek: Voyager", "VOY"),
	];
	let tags = [
		(KLINGONS, "Klingons"),
		(WAR, "War"),
		(HONOR, "Honor"),
		(BORG, "Borg"),
		(Q, "Q"),
		(TIME_TRAVEL, "Time Travel"),
		(WORF, "Worf"),
		(UNUSED_TAG, "Tribbles"),
	]
	.into_iter()
	.map(|(id, name)| Tag { id, name: name.to_string() })
	.collect();
	let episodes = EPISODES
		.iter()
		.map(|seed| Episode {
			id: seed.id,
			title: seed.title.to_string(),
			synopsis: seed.synopsis.map(str::to_string),
			series_id: seed.series_id,
			season: seed.season,
			episode_number: seed.episode_number,
			imdb_url: format!("https://www.imdb.com/title/tt07087{:02}/", seed.id),
			air_date: seed.air_date,
			created_at: now - Duration::days(seed.created_days_ago),
		})
		.collect();
	let episode_tags = EPISODES
		.iter()
		.flat_map(|seed| {
			seed.tags.iter().map(|tag_id| EpisodeTag { episode_id: seed.id, tag_id: *tag_id })
		})
		.collect();

	Catalog { series, tags, episodes, episode_tags }
}

pub fn sample_catalog() -> Catalog {
	sample_catalog_at(OffsetDateTime::now_utc())
}

fn series(id: i32, name: &str, abbreviation: &str) -> Series {
	Series { id, name: name.to_string(), abbreviation: abbreviation.to_string() }
}
