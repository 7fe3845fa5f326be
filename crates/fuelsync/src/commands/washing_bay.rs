//! Washing-bay command handlers.

use tabled::Tabled;

use fuelsync_core::{Console, EntityId, WashingBayDraft, WashingBayEntry, WashingBayPatch};

use crate::cli::{GlobalOpts, WashingBayArgs, WashingBayCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Station")]
    station: String,
    #[tabled(rename = "Plate")]
    plate: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Payment")]
    payment: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&WashingBayEntry> for EntryRow {
    fn from(e: &WashingBayEntry) -> Self {
        Self {
            id: e.id.to_string(),
            station: if e.station_name.is_empty() {
                e.station_id.to_string()
            } else {
                e.station_name.clone()
            },
            plate: e.plate_number.clone(),
            service: util::or_dash(Some(e.service_type.as_str())),
            amount: format!("{:.2}", e.amount),
            payment: e.payment_method.to_string(),
            status: e.status.to_string(),
        }
    }
}

fn detail(e: &WashingBayEntry) -> String {
    [
        format!("ID:         {}", e.id),
        format!("Station:    {} ({})", util::or_dash(Some(e.station_name.as_str())), e.station_id),
        format!("Plate:      {}", e.plate_number),
        format!("Vehicle:    {}", util::or_dash(Some(e.vehicle_type.as_str()))),
        format!("Service:    {}", util::or_dash(Some(e.service_type.as_str()))),
        format!("Amount:     {:.2}", e.amount),
        format!("Payment:    {}", e.payment_method),
        format!("Status:     {}", e.status),
        format!("Attendant:  {}", util::or_dash(Some(e.attendant.as_str()))),
        format!(
            "Recorded:   {}",
            e.recorded_at.map_or_else(|| "-".into(), |t| t.to_rfc3339())
        ),
    ]
    .join("\n")
}

pub async fn handle(console: &Console, args: WashingBayArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let entries = console.washing_bay();

    match args.command {
        WashingBayCommand::List(filters) => {
            let changes = util::filter_changes(&[
                ("station", filters.station.as_ref()),
                ("service", filters.service.as_ref()),
                ("payment", filters.payment.as_ref()),
                ("status", filters.status.as_ref()),
                ("search", filters.search.as_ref()),
            ]);
            let snap = util::load_collection(entries, changes, global).await?;
            let out = if filters.stats {
                output::render_stats(&global.output, &snap.stats)?
            } else {
                output::render_list(&global.output, &snap.items, |e| EntryRow::from(e), |e| e.id.to_string())?
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        WashingBayCommand::Get { id } => {
            let entry = util::find(entries, &id, global).await?;
            let out = output::render_single(&global.output, &entry, detail, |e| e.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        WashingBayCommand::Create {
            station,
            station_name,
            plate,
            vehicle,
            service,
            amount,
            payment,
            status,
            attendant,
        } => {
            let draft = WashingBayDraft {
                station_id: EntityId::from(station),
                station_name,
                plate_number: plate,
                vehicle_type: vehicle,
                service_type: service,
                amount,
                payment_method: payment,
                status,
                attendant,
            };
            let created = util::applied(entries.create(draft).await)?;
            util::print_entity(created.as_ref(), global, detail)
        }

        WashingBayCommand::Update {
            id,
            plate,
            vehicle,
            service,
            amount,
            payment,
            attendant,
        } => {
            let patch = WashingBayPatch {
                plate_number: plate,
                vehicle_type: vehicle,
                service_type: service,
                amount,
                payment_method: payment,
                attendant,
            };
            let updated = util::applied(entries.update(EntityId::from(id), patch).await)?;
            util::print_entity(updated.as_ref(), global, detail)
        }

        WashingBayCommand::Delete { id } => {
            if !util::confirm(&format!("Delete washing-bay entry {id}?"), global.yes)? {
                return Ok(());
            }
            util::applied(entries.delete(EntityId::from(id)).await)?;
            Ok(())
        }

        WashingBayCommand::Status { id, status } => {
            let updated = util::applied(entries.change_status(EntityId::from(id), status).await)?;
            util::print_entity(updated.as_ref(), global, detail)
        }
    }
}
