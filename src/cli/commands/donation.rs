//! Donation commands - add, list

use donormatch::api::{self, CreateDonationPayload, QuantityField};
use donormatch::output::render;

use super::Session;
use crate::cli::app::DonationAction;

/// Handle donation subcommands
pub fn donation(session: &Session, action: DonationAction) -> anyhow::Result<()> {
    let caller = session.caller()?;
    match action {
        DonationAction::Add {
            resource,
            available_until,
            phone,
        } => {
            let payload = CreateDonationPayload {
                kind: Some(resource.kind),
                blood_type: resource.blood_type,
                organ_type: resource.organ_type,
                quantity: resource.quantity.map(QuantityField::Number),
                unit: resource.unit,
                urgency: resource.urgency,
                available_until,
                location: resource.location,
                latitude: resource.lat,
                longitude: resource.lon,
                phone,
            };
            let offered = api::create_donation(&session.ctx, &caller, payload)?;
            render(&offered, session.mode);
        },
        DonationAction::List => {
            let donations = api::list_donations(&session.ctx, &caller)?;
            render(&donations, session.mode);
        },
    }
    Ok(())
}
