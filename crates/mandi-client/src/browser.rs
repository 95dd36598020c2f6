use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use mandi_core::error::AppError;
use mandi_core::identity::IdentityRotator;
use mandi_core::traits::{Fetcher, RenderSession};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

struct Running {
    browser: Browser,
    handler: JoinHandle<()>,
}

/// Headless Chromium held open for the lifetime of the process.
///
/// `launch` starts the browser with a user-agent drawn from the identity
/// pool, `close` shuts it down. While running it also renders pages as a
/// [`Fetcher`]: each fetch opens a tab, grabs the rendered HTML and closes
/// the tab.
///
/// # Example
///
/// ```rust,no_run
/// use mandi_client::BrowserSession;
/// use mandi_core::traits::{Fetcher, RenderSession};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let session = BrowserSession::new(std::time::Duration::from_secs(30));
/// session.launch().await?;
/// let html = session.fetch("https://www.amazon.in/s?k=laptop").await?;
/// session.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BrowserSession {
    running: Arc<Mutex<Option<Running>>>,
    connected: Arc<AtomicBool>,
    identities: IdentityRotator,
    timeout: Duration,
}

impl BrowserSession {
    pub fn new(timeout: Duration) -> Self {
        Self {
            running: Arc::new(Mutex::new(None)),
            connected: Arc::new(AtomicBool::new(false)),
            identities: IdentityRotator::default(),
            timeout,
        }
    }

    /// Tries to locate the real Chrome/Chromium binary.
    ///
    /// Snap-packaged Chromium exposes a wrapper that strips unknown CLI flags,
    /// so the real binary inside the snap is preferred. `None` lets
    /// `chromiumoxide` do its own lookup.
    fn find_chrome_binary() -> Option<PathBuf> {
        let candidates: &[&str] = &[
            "/snap/chromium/current/usr/lib/chromium-browser/chrome",
            "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
        ];

        if let Ok(p) = std::env::var("CHROME_BIN") {
            let path = PathBuf::from(&p);
            if path.exists() {
                return Some(path);
            }
        }

        candidates.iter().map(PathBuf::from).find(|p| p.exists())
    }

    /// Opens a blank tab. The session lock is only held for this step, so a
    /// concurrent `close` never waits on a slow navigation.
    async fn open_tab(&self) -> Result<Page, AppError> {
        let running = self.running.lock().await;
        let Some(running) = running.as_ref() else {
            return Err(AppError::NetworkError("Browser session is not running".into()));
        };
        running
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::NetworkError(format!("Failed to open tab: {e}")))
    }

    async fn render(page: Page, url: &str) -> Result<String, AppError> {
        let result = async {
            page.goto(url)
                .await
                .map_err(|e| AppError::NetworkError(format!("Failed to navigate to {url}: {e}")))?;
            page.find_element("body")
                .await
                .map_err(|e| AppError::HttpError(format!("Page did not render body: {e}")))?;
            page.content()
                .await
                .map_err(|e| AppError::HttpError(format!("Failed to read page content: {e}")))
        }
        .await;

        if let Err(e) = page.close().await {
            tracing::debug!(error = %e, "Failed to close tab");
        }
        result
    }
}

impl RenderSession for BrowserSession {
    async fn launch(&self) -> Result<(), AppError> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Ok(());
        }

        let mut builder = BrowserConfig::builder().no_sandbox().disable_default_args();
        if let Some(bin) = Self::find_chrome_binary() {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        let config = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .arg("--window-size=1920,1080")
            .arg(format!("--user-agent={}", self.identities.random()))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::Generic(format!("Failed to launch browser: {e}")))?;

        let connected = Arc::clone(&self.connected);
        // The CDP handler must be polled continuously for the connection to work.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
            connected.store(false, Ordering::SeqCst);
        });

        self.connected.store(true, Ordering::SeqCst);
        *running = Some(Running { browser, handler });
        tracing::info!("Headless browser launched");
        Ok(())
    }

    async fn close(&self) -> Result<(), AppError> {
        let Some(mut running) = self.running.lock().await.take() else {
            return Ok(());
        };
        self.connected.store(false, Ordering::SeqCst);

        let closed = running
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| AppError::Generic(format!("Failed to close browser: {e}")));
        if let Err(e) = running.browser.wait().await {
            tracing::debug!(error = %e, "Browser process did not exit cleanly");
        }
        running.handler.abort();
        tracing::info!("Headless browser closed");
        closed
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Fetcher for BrowserSession {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let rendered = async {
            let page = self.open_tab().await?;
            Self::render(page, url).await
        };

        match tokio::time::timeout(self.timeout, rendered).await {
            Ok(inner) => inner,
            Err(_) => Err(AppError::Timeout(self.timeout.as_secs())),
        }
    }
}
