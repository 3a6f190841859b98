//! Headless Chrome renderer over the DevTools protocol.
//!
//! A render runs in two bounded phases: start the navigation (without
//! waiting for the load event), then poll for the marker. Only the second
//! phase running out counts as [`RenderError::Timeout`].

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::Page;
use futures::{Stream, StreamExt};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::{RenderError, Renderer, WaitFor};
use ipo_common::ScraperConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches one browser per render call and always tears it down.
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    user_agent: String,
    headless: bool,
    executable: Option<PathBuf>,
}

impl ChromeRenderer {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            headless: config.headless,
            executable: config.chrome_executable.as_ref().map(PathBuf::from),
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", self.user_agent));

        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(ref path) = self.executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(RenderError::Launch)
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(
        &self,
        url: &str,
        wait_for: &WaitFor,
        timeout: Duration,
    ) -> Result<String, RenderError> {
        let config = self.browser_config()?;
        let started = Instant::now();

        let (mut browser, handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let events = tokio::spawn(drain_events(handler));

        let result = capture(&browser, url, wait_for, timeout).await;

        if let Err(e) = browser.close().await {
            tracing::warn!(url = %url, error = %e, "Failed to close browser");
        }
        if let Err(e) = browser.wait().await {
            tracing::warn!(url = %url, error = %e, "Failed to reap browser process");
        }
        events.abort();

        match &result {
            Ok(html) => tracing::debug!(
                url = %url,
                bytes = html.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Page rendered"
            ),
            Err(e) => tracing::warn!(
                url = %url,
                error = %e,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Render failed"
            ),
        }

        result
    }
}

/// Pump CDP events until the connection ends. Event errors are logged and
/// skipped; stopping early would strand every pending command.
async fn drain_events<S, E>(mut events: S) -> usize
where
    S: Stream<Item = Result<(), E>> + Unpin,
    E: fmt::Display,
{
    let mut seen = 0;
    while let Some(event) = events.next().await {
        seen += 1;
        if let Err(e) = event {
            tracing::debug!(error = %e, "CDP handler event error");
        }
    }
    seen
}

/// Run `phase`, turning an exhausted `budget` into the error from `elapsed`.
async fn within<T, F>(
    budget: Duration,
    phase: F,
    elapsed: impl FnOnce() -> RenderError,
) -> Result<T, RenderError>
where
    F: Future<Output = Result<T, RenderError>>,
{
    tokio::time::timeout(budget, phase)
        .await
        .unwrap_or_else(|_| Err(elapsed()))
}

async fn capture(
    browser: &Browser,
    url: &str,
    wait_for: &WaitFor,
    timeout: Duration,
) -> Result<String, RenderError> {
    let page = within(timeout, navigate(browser, url), || RenderError::Navigation {
        url: url.to_string(),
        reason: format!("navigation did not start within {}s", timeout.as_secs()),
    })
    .await?;

    within(timeout, wait_until_present(&page, wait_for), || {
        RenderError::Timeout {
            url: url.to_string(),
            marker: wait_for.to_string(),
        }
    })
    .await?;

    page.content()
        .await
        .map_err(|e| RenderError::Protocol(e.to_string()))
}

/// Open a blank tab and start loading `url` without waiting for the load event.
async fn navigate(browser: &Browser, url: &str) -> Result<Page, RenderError> {
    let navigation_error = |reason: String| RenderError::Navigation {
        url: url.to_string(),
        reason,
    };

    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| RenderError::Protocol(e.to_string()))?;

    let response = page
        .execute(NavigateParams::new(url))
        .await
        .map_err(|e| navigation_error(e.to_string()))?;

    if let Some(reason) = response.result.error_text.clone() {
        return Err(navigation_error(reason));
    }

    Ok(page)
}

/// Poll the marker probe until it reports true. The caller bounds the wait.
async fn wait_until_present(page: &Page, wait_for: &WaitFor) -> Result<(), RenderError> {
    let script = wait_for.probe_script();
    loop {
        let found = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| RenderError::Protocol(e.to_string()))?
            .into_value::<bool>()
            .unwrap_or(false);

        if found {
            return Ok(());
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = ScraperConfig {
            headless: false,
            chrome_executable: Some("/usr/bin/chromium".to_string()),
            ..ScraperConfig::default()
        };
        let renderer = ChromeRenderer::from_config(&config);
        assert!(!renderer.headless);
        assert_eq!(renderer.executable, Some(PathBuf::from("/usr/bin/chromium")));
        assert!(renderer.user_agent.contains("Chrome/124.0.0.0"));
    }

    #[test]
    fn test_default_config_is_headless() {
        let renderer = ChromeRenderer::from_config(&ScraperConfig::default());
        assert!(renderer.headless);
        assert!(renderer.executable.is_none());
    }

    #[tokio::test]
    async fn test_event_errors_do_not_stop_draining() {
        let events = futures::stream::iter(vec![
            Ok(()),
            Err("unknown CDP event".to_string()),
            Ok(()),
            Err("bad frame".to_string()),
            Ok(()),
        ]);
        assert_eq!(drain_events(events).await, 5);
    }

    #[tokio::test]
    async fn test_stalled_navigation_is_not_a_marker_timeout() {
        let err = within(
            Duration::from_millis(20),
            std::future::pending::<Result<(), RenderError>>(),
            || RenderError::Navigation {
                url: "https://example.com".to_string(),
                reason: "navigation did not start".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_marker_budget_exhausted_is_timeout() {
        let err = within(
            Duration::from_millis(20),
            std::future::pending::<Result<(), RenderError>>(),
            || RenderError::Timeout {
                url: "https://example.com".to_string(),
                marker: "#main".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_phase_result_passes_through() {
        let value = within(
            Duration::from_secs(1),
            async { Ok::<_, RenderError>(7) },
            || RenderError::Protocol("unused".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(value, 7);
    }
}
