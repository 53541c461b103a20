use crate::{Error, Result};

/// Expands the `\ir` includes of `sql/init.sql` into one script.
pub fn render_schema() -> Result<String> {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> Result<String> {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_series.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_series.sql")),
				"tables/002_episodes.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_episodes.sql")),
				"tables/003_tags.sql" => out.push_str(include_str!("../../../sql/tables/003_tags.sql")),
				"tables/004_episode_tags.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_episode_tags.sql")),
				other => return Err(Error::InvalidArgument(format!("Unknown schema include {other}."))),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	Ok(out)
}
