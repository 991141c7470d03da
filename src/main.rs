use anyhow::Result;
use clap::Parser;
use persona_relay::{Args, FileConfig, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let file = match args.config.as_deref() {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::load_default(),
    };

    let settings = Settings::resolve(args, file)?;
    persona_relay::run(settings).await?;
    Ok(())
}
