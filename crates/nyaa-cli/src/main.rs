//! Minimal CLI: fetch one nyaa.si torrent page and print it as JSON.
//! Failures go to stderr as JSON strings, so both output channels stay
//! machine readable.

use anyhow::Result;
use clap::Parser;
use nyaa_core::{Nyaa, PageRef};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nyaa", about = "Get the JSON representation of a nyaa.si torrent page")]
struct Args {
    /// Torrent page: a numeric ID or a URL like https://nyaa.si/view/123456
    #[arg(value_name = "ID_OR_URL")]
    page: String,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let page = match args.page.trim().parse::<u64>() {
        Ok(id) => PageRef::Id(id),
        Err(_) => PageRef::Url(args.page.trim().to_string()),
    };

    match fetch(page).await {
        Ok(release) => {
            let json = if args.compact {
                serde_json::to_string(&release)?
            } else {
                serde_json::to_string_pretty(&release)?
            };
            println!("{json}");
            Ok(())
        }
        Err(error) => {
            eprintln!("{}", serde_json::to_string(&error)?);
            std::process::exit(1);
        }
    }
}

async fn fetch(page: PageRef) -> nyaa_core::Result<nyaa_core::NyaaRelease> {
    let nyaa = Nyaa::new()?;
    nyaa.get(page).await
}
