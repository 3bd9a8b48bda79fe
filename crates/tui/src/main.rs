mod app;
mod client;
mod config;
mod error;
mod logging;
mod storage;
mod sync;
mod ui;

use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    logging::init(&config.log_path)?;
    let mut app = app::App::new(config)?;
    app.run().await?;
    Ok(())
}
