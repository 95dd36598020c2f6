//! Detection of anti-bot challenge pages.

use std::sync::LazyLock;

use mandi_core::error::AppError;
use scraper::{Html, Selector};

/// Case-insensitive phrases that mark a challenge page.
const MARKERS: &[&str] = &["robot", "captcha", "access denied", "blocked"];

static TITLE: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("title").ok());

/// Elements only present on challenge pages (captcha forms and inputs).
static CHALLENGE: LazyLock<Option<Selector>> = LazyLock::new(|| {
    Selector::parse(
        r#"form[action*="captcha"], form[action*="Captcha"], input[name*="captcha"], #captchacharacters"#,
    )
    .ok()
});

/// Fail with `BotDetected` if `document` is a challenge page.
///
/// Only the `<title>` and dedicated challenge elements are inspected, so a
/// product called "Robot vacuum" in the body does not trip the guard.
pub fn check(document: &Html) -> Result<(), AppError> {
    let title: String = TITLE
        .as_ref()
        .and_then(|sel| document.select(sel).next())
        .map(|t| t.text().collect())
        .unwrap_or_default();

    let title_lower = title.to_lowercase();
    if let Some(marker) = MARKERS.iter().find(|m| title_lower.contains(*m)) {
        tracing::debug!(title = %title.trim(), %marker, "Challenge title detected");
        return Err(AppError::BotDetected(title.trim().to_string()));
    }

    let challenge = CHALLENGE
        .as_ref()
        .is_some_and(|sel| document.select(sel).next().is_some());
    if challenge {
        return Err(AppError::BotDetected(format!(
            "captcha form on page titled '{}'",
            title.trim()
        )));
    }

    Ok(())
}
