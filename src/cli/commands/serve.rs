//! Serve the HTTP API

use donormatch::config::Settings;

use super::Session;

/// Start the API server
#[cfg(feature = "server")]
pub fn serve(session: &Session, settings: &Settings, bind: Option<&str>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or(&settings.server.bind);
    if settings.users.iter().all(|u| u.token.is_none()) {
        log::warn!("No user has a token; every API call will be rejected");
    }

    println!("Starting donormatch API on http://{bind}");
    println!("Press Ctrl+C to stop");
    donormatch::server::tiny_http::serve(&session.ctx, bind)
}

/// Start the API server
#[cfg(not(feature = "server"))]
pub fn serve(_session: &Session, _settings: &Settings, _bind: Option<&str>) -> anyhow::Result<()> {
    anyhow::bail!("This build has no HTTP server; rebuild with the `server` feature")
}
