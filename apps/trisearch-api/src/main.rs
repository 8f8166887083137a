use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = trisearch_api::Args::parse();

	trisearch_api::run(args).await
}
