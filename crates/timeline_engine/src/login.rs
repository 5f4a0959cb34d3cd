use std::fmt;

use engine_logging::{engine_info, engine_warn};
use thiserror::Error;

use crate::{BrowserError, BrowserSession, LoginSettings, Pacer, PageElement};

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("login form unavailable: {0}")]
    Browser(#[from] BrowserError),
    #[error("login was not confirmed; check the credentials")]
    NotConfirmed,
}

/// Signs in through the two-step login form: username, Enter, password, Enter.
/// Succeeds once the signed-in confirmation element appears.
pub fn login<S: BrowserSession>(
    session: &mut S,
    credentials: &Credentials,
    settings: &LoginSettings,
    pacer: &dyn Pacer,
) -> Result<(), LoginError> {
    let timeout = settings.wait_timeout();

    session.navigate(&settings.url)?;
    pacer.pause(settings.submit_pause);

    let username = session.wait_for(&settings.username_input, timeout)?;
    username.type_text(&credentials.username)?;
    username.press_key("Enter")?;
    pacer.pause(settings.step_pause);

    let password = session.wait_for(&settings.password_input, timeout)?;
    password.type_text(&credentials.password)?;
    password.press_key("Enter")?;
    pacer.pause(settings.submit_pause);

    match session.wait_for(&settings.confirmation, timeout) {
        Ok(_) => {
            engine_info!("Logged in as {}", credentials.username);
            Ok(())
        }
        Err(BrowserError::Timeout { .. }) => {
            engine_warn!("Login for {} was not confirmed", credentials.username);
            Err(LoginError::NotConfirmed)
        }
        Err(err) => Err(err.into()),
    }
}
