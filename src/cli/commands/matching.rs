//! Match commands - find, create, complete, list

use donormatch::api::{self, CreateMatchPayload};
use donormatch::output::{OutputMode, render};

use super::Session;
use crate::cli::app::MatchAction;

/// Handle match subcommands
pub fn matching(session: &Session, action: MatchAction) -> anyhow::Result<()> {
    match action {
        MatchAction::Find { request_id } => {
            let caller = session.caller()?;
            let candidates = api::find_matches(&session.ctx, &caller, request_id)?;
            if session.mode == OutputMode::Human && !candidates.is_empty() {
                println!("{} candidate(s) for request #{request_id}:\n", candidates.len());
            }
            render(&candidates, session.mode);
        },
        MatchAction::Create {
            donation,
            request,
            score,
            distance,
        } => {
            let payload = CreateMatchPayload {
                donation_id: donation,
                request_id: request,
                compatibility_score: score,
                distance,
            };
            let caller = session.caller()?;
            let created = api::create_match(&session.ctx, &caller, payload)?;
            render(&created, session.mode);
        },
        MatchAction::Complete { id } => {
            let caller = session.caller()?;
            let completed = api::complete_match(&session.ctx, &caller, id)?;
            render(&completed, session.mode);
        },
        MatchAction::List => {
            let caller = session.caller()?;
            let matches = api::list_matches(&session.ctx, &caller)?;
            render(&matches, session.mode);
        },
    }
    Ok(())
}
