use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub catalog: Catalog,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
	#[serde(default = "default_acquire_timeout_ms")]
	pub acquire_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
	/// How `tagIds` and `tags` combine when a request supplies both. `all_groups` requires one
	/// match from each list, `merged` treats both lists as a single any-of set.
	#[serde(default = "default_tag_filter_mode")]
	pub tag_filter_mode: String,
	#[serde(default = "default_load_timeout_ms")]
	pub load_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Security {
	pub bind_localhost_only: bool,
}

impl Default for Catalog {
	fn default() -> Self {
		Self {
			tag_filter_mode: default_tag_filter_mode(),
			load_timeout_ms: default_load_timeout_ms(),
		}
	}
}

fn default_acquire_timeout_ms() -> u64 {
	5_000
}

fn default_tag_filter_mode() -> String {
	"all_groups".to_string()
}

fn default_load_timeout_ms() -> u64 {
	10_000
}
