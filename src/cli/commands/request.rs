//! Request commands - create, list, cancel

use donormatch::api::{self, CreateRequestPayload, QuantityField};
use donormatch::output::render;

use super::Session;
use crate::cli::app::RequestAction;

/// Handle request subcommands
pub fn request(session: &Session, action: RequestAction) -> anyhow::Result<()> {
    let caller = session.caller()?;
    match action {
        RequestAction::Create {
            resource,
            justification,
            requirements,
            required_by,
        } => {
            let payload = CreateRequestPayload {
                kind: Some(resource.kind),
                blood_type: resource.blood_type,
                organ_type: resource.organ_type,
                quantity: resource.quantity.map(QuantityField::Number),
                unit: resource.unit,
                urgency: resource.urgency,
                medical_justification: Some(justification),
                special_requirements: requirements,
                required_by_date: required_by,
                location: resource.location,
                latitude: resource.lat,
                longitude: resource.lon,
            };
            let created = api::create_request(&session.ctx, &caller, payload)?;
            render(&created, session.mode);
        },
        RequestAction::List => {
            let requests = api::list_requests(&session.ctx, &caller)?;
            render(&requests, session.mode);
        },
        RequestAction::Cancel { id } => {
            let cancelled = api::cancel_request(&session.ctx, &caller, id)?;
            render(&cancelled, session.mode);
        },
    }
    Ok(())
}
