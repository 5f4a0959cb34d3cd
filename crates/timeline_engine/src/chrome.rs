//! Chromium binding over the DevTools protocol.
//!
//! chromiumoxide is async; the harvester is not. Each session shares a tokio
//! runtime and blocks on it for every call, so one call is in flight at a time.

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use engine_logging::{engine_info, engine_warn};
use futures_util::StreamExt;
use rand::seq::SliceRandom;
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::{BrowserError, BrowserSession, PageElement, SessionSettings, DEFAULT_USER_AGENTS};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct ChromeSession {
    runtime: Arc<Runtime>,
    browser: Option<Browser>,
    page: Page,
    handler: Option<JoinHandle<()>>,
}

impl ChromeSession {
    /// Launches Chromium with a randomly chosen user agent and opens a blank page.
    pub fn launch(
        runtime: Arc<Runtime>,
        settings: &SessionSettings,
    ) -> Result<Self, BrowserError> {
        let user_agent = pick_user_agent(&settings.user_agents);
        let config = build_config(settings, &user_agent)?;

        let (browser, page, handler) = runtime.block_on(async move {
            let (browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| BrowserError::Launch(e.to_string()))?;

            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            match browser.new_page("about:blank").await {
                Ok(page) => Ok((browser, page, handler)),
                Err(e) => {
                    handler.abort();
                    Err(BrowserError::Launch(e.to_string()))
                }
            }
        })?;

        engine_info!(
            "Browser started (headless: {}, user agent: {})",
            settings.headless,
            user_agent
        );
        Ok(Self {
            runtime,
            browser: Some(browser),
            page,
            handler: Some(handler),
        })
    }

    fn element(&self, inner: Element) -> ChromeElement {
        ChromeElement {
            runtime: self.runtime.clone(),
            inner,
        }
    }

    fn ensure_open(&self) -> Result<(), BrowserError> {
        if self.browser.is_none() {
            return Err(BrowserError::Closed);
        }
        Ok(())
    }
}

impl BrowserSession for ChromeSession {
    type Element = ChromeElement;

    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.ensure_open()?;
        self.runtime
            .block_on(self.page.goto(url))
            .map(|_| ())
            .map_err(protocol)
    }

    fn find_all(&self, selector: &str) -> Result<Vec<ChromeElement>, BrowserError> {
        self.ensure_open()?;
        let elements = self
            .runtime
            .block_on(self.page.find_elements(selector))
            .map_err(protocol)?;
        Ok(elements.into_iter().map(|e| self.element(e)).collect())
    }

    fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        self.ensure_open()?;
        let result = self
            .runtime
            .block_on(self.page.evaluate(script))
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<ChromeElement, BrowserError> {
        self.ensure_open()?;
        let page = &self.page;
        let found = self.runtime.block_on(async {
            tokio::time::timeout(timeout, async {
                loop {
                    if let Ok(mut elements) = page.find_elements(selector).await {
                        if !elements.is_empty() {
                            return elements.swap_remove(0);
                        }
                    }
                    tokio::time::sleep(WAIT_POLL_INTERVAL).await;
                }
            })
            .await
        });
        match found {
            Ok(element) => Ok(self.element(element)),
            Err(_) => Err(BrowserError::Timeout {
                selector: selector.to_string(),
                timeout,
            }),
        }
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };
        let closed = self.runtime.block_on(async {
            let closed = browser.close().await.map(|_| ());
            let _ = browser.wait().await;
            closed
        });
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        engine_info!("Browser closed");
        closed.map_err(protocol)
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            engine_warn!("Browser did not close cleanly: {}", err);
        }
    }
}

pub struct ChromeElement {
    runtime: Arc<Runtime>,
    inner: Element,
}

impl ChromeElement {
    fn wrap(&self, inner: Element) -> Self {
        Self {
            runtime: self.runtime.clone(),
            inner,
        }
    }
}

impl PageElement for ChromeElement {
    fn find(&self, selector: &str) -> Result<Option<Self>, BrowserError> {
        Ok(self.find_all(selector)?.into_iter().next())
    }

    fn find_all(&self, selector: &str) -> Result<Vec<Self>, BrowserError> {
        let elements = self
            .runtime
            .block_on(self.inner.find_elements(selector))
            .map_err(protocol)?;
        Ok(elements.into_iter().map(|e| self.wrap(e)).collect())
    }

    fn text(&self) -> Result<Option<String>, BrowserError> {
        self.runtime
            .block_on(self.inner.inner_text())
            .map_err(protocol)
    }

    fn attribute(&self, name: &str) -> Result<Option<String>, BrowserError> {
        self.runtime
            .block_on(self.inner.attribute(name))
            .map_err(protocol)
    }

    fn type_text(&self, text: &str) -> Result<(), BrowserError> {
        self.runtime
            .block_on(async { self.inner.type_str(text).await.map(|_| ()) })
            .map_err(protocol)
    }

    fn press_key(&self, key: &str) -> Result<(), BrowserError> {
        self.runtime
            .block_on(async { self.inner.press_key(key).await.map(|_| ()) })
            .map_err(protocol)
    }
}

fn build_config(
    settings: &SessionSettings,
    user_agent: &str,
) -> Result<BrowserConfig, BrowserError> {
    let mut builder = BrowserConfig::builder().viewport(None);
    if !settings.headless {
        builder = builder.with_head();
    }
    for arg in &settings.chrome_args {
        builder = builder.arg(arg.as_str());
    }
    builder = builder.arg(format!("--user-agent={user_agent}"));
    builder.build().map_err(BrowserError::Launch)
}

fn pick_user_agent(pool: &[String]) -> String {
    pool.choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| DEFAULT_USER_AGENTS[0].to_string())
}

fn protocol(err: chromiumoxide::error::CdpError) -> BrowserError {
    BrowserError::Protocol(err.to_string())
}
