//! Command implementations
//!
//! Commands go through the same API handlers as the HTTP server.

mod donation;
mod matching;
mod request;
mod serve;

pub use donation::donation;
pub use matching::matching;
pub use request::request;
pub use serve::serve;

use donormatch::api::AppContext;
use donormatch::config::Settings;
use donormatch::core::models::Caller;
use donormatch::output::OutputMode;

/// Everything a command needs
#[derive(Debug)]
pub struct Session {
    /// Wired services
    pub ctx: AppContext,
    /// User given with `--as`
    pub as_user: Option<String>,
    /// Output mode
    pub mode: OutputMode,
}

impl Session {
    /// Open the configured store and wire services
    pub fn open(settings: &Settings, as_user: Option<String>, mode: OutputMode) -> anyhow::Result<Self> {
        Ok(Self {
            ctx: AppContext::from_settings(settings)?,
            as_user,
            mode,
        })
    }

    /// The acting user, required for commands that own or list things
    pub fn caller(&self) -> anyhow::Result<Caller> {
        let user = self
            .as_user
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("This command needs a user: pass --as <USER>"))?;
        Ok(self.ctx.caller(user)?)
    }
}
