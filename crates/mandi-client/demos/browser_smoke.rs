/// Smoke-test for `BrowserSession`.
///
/// Launches a headless Chromium, renders an Amazon search page and runs the
/// bot guard over it.
///
/// Run with:
///   cargo run -p mandi-client --example browser_smoke --features browser
use std::time::Duration;

use mandi_client::BrowserSession;
use mandi_core::traits::{Fetcher, RenderSession};
use scraper::Html;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("mandi=info").init();

    println!("Launching headless browser…");
    let session = BrowserSession::new(Duration::from_secs(30));
    session.launch().await?;
    assert!(session.is_connected(), "session should report connected after launch");

    let url = "https://www.amazon.in/s?k=laptop&ref=sr_pg_1";
    println!("Rendering {url} …");
    let html = session.fetch(url).await?;

    match mandi_client::bot_guard::check(&Html::parse_document(&html)) {
        Ok(()) => println!("OK: got {} bytes of rendered HTML", html.len()),
        Err(e) => println!("Rendered a challenge page: {e}"),
    }

    session.close().await?;
    assert!(!session.is_connected());
    Ok(())
}
