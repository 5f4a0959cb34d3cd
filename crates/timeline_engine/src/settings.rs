use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
];

pub const DEFAULT_CHROME_ARGS: &[&str] = &[
    "--start-maximized",
    "--disable-notifications",
    "--disable-popup-blocking",
    "--disable-dev-shm-usage",
    "--no-sandbox",
    "--disable-infobars",
];

/// Inclusive range of seconds for a randomized pause.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PauseRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl PauseRange {
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Picks a duration in the range. Inverted, negative or non-finite bounds
    /// collapse to the lower bound (or zero).
    pub fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = clamp_secs(self.min_secs);
        let max = clamp_secs(self.max_secs);
        let secs = if max > min { rng.gen_range(min..=max) } else { min };
        Duration::from_secs_f64(secs)
    }
}

fn clamp_secs(secs: f64) -> f64 {
    if secs.is_finite() {
        secs.max(0.0)
    } else {
        0.0
    }
}

/// CSS selectors describing the timeline markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSelectors {
    pub item: String,
    pub text: String,
    pub text_fallback: String,
    pub time: String,
    pub time_attribute: String,
    pub metric_group: String,
    pub metric_control: String,
    pub analytics: String,
    pub label_attribute: String,
}

impl Default for TimelineSelectors {
    fn default() -> Self {
        Self {
            item: r#"article[role="article"]"#.to_string(),
            text: r#"[data-testid="tweetText"]"#.to_string(),
            text_fallback: "[lang]".to_string(),
            time: "time".to_string(),
            time_attribute: "datetime".to_string(),
            metric_group: r#"[role="group"]"#.to_string(),
            metric_control: r#"[role="button"]"#.to_string(),
            analytics: r#"[href*="analytics"]"#.to_string(),
            label_attribute: "aria-label".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestSettings {
    pub base_url: String,
    pub output_dir: PathBuf,
    /// Consecutive non-progressing attempts tolerated before stopping.
    pub retry_ceiling: u32,
    /// Fraction of the viewport height covered by one advance.
    pub scroll_increment: f64,
    pub scroll_steps: u32,
    pub step_pause: PauseRange,
    pub settle_pause: PauseRange,
    pub rescan_pause: PauseRange,
    pub scroll_retry_pause: PauseRange,
    pub initial_settle: PauseRange,
    pub load_timeout_secs: u64,
    pub selectors: TimelineSelectors,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            base_url: "https://twitter.com".to_string(),
            output_dir: PathBuf::from("data/tweets"),
            retry_ceiling: 3,
            scroll_increment: 0.75,
            scroll_steps: 3,
            step_pause: PauseRange::new(0.3, 0.5),
            settle_pause: PauseRange::new(1.0, 1.5),
            rescan_pause: PauseRange::new(2.0, 3.0),
            scroll_retry_pause: PauseRange::new(1.0, 2.0),
            initial_settle: PauseRange::new(2.0, 3.0),
            load_timeout_secs: 10,
            selectors: TimelineSelectors::default(),
        }
    }
}

impl HarvestSettings {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSettings {
    pub url: String,
    pub username_input: String,
    pub password_input: String,
    /// Element that only exists once signed in.
    pub confirmation: String,
    pub wait_timeout_secs: u64,
    pub step_pause: PauseRange,
    pub submit_pause: PauseRange,
}

impl Default for LoginSettings {
    fn default() -> Self {
        Self {
            url: "https://twitter.com/i/flow/login".to_string(),
            username_input: r#"input[autocomplete="username"]"#.to_string(),
            password_input: r#"input[type="password"]"#.to_string(),
            confirmation: r#"a[aria-label="Profile"]"#.to_string(),
            wait_timeout_secs: 10,
            step_pause: PauseRange::new(0.5, 1.0),
            submit_pause: PauseRange::new(1.0, 2.0),
        }
    }
}

impl LoginSettings {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub headless: bool,
    /// One is picked at random per session.
    pub user_agents: Vec<String>,
    pub chrome_args: Vec<String>,
    pub login: LoginSettings,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            headless: false,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
            chrome_args: DEFAULT_CHROME_ARGS.iter().map(|arg| arg.to_string()).collect(),
            login: LoginSettings::default(),
        }
    }
}
