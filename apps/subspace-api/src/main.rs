use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = subspace_api::Args::parse();

	subspace_api::run(args).await
}
