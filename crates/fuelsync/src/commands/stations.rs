//! Station command handlers.

use tabled::Tabled;

use fuelsync_core::{Assignee, Console, EntityId, Station, StationDraft, StationPatch};

use crate::cli::{GlobalOpts, StationsArgs, StationsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Pumps")]
    pumps: u32,
    #[tabled(rename = "Manager")]
    manager: String,
}

impl From<&Station> for StationRow {
    fn from(s: &Station) -> Self {
        Self {
            id: s.id.to_string(),
            code: s.code.clone(),
            name: s.name.clone(),
            region: s.region.clone(),
            status: s.status.to_string(),
            pumps: s.pump_count,
            manager: util::or_dash(s.manager_name.as_deref()),
        }
    }
}

fn detail(s: &Station) -> String {
    [
        format!("ID:        {}", s.id),
        format!("Code:      {}", s.code),
        format!("Name:      {}", s.name),
        format!("Region:    {}", s.region),
        format!("Location:  {}", util::or_dash(Some(s.location.as_str()))),
        format!("Status:    {}", s.status),
        format!("Pumps:     {}", s.pump_count),
        format!("Fuel:      {}", util::or_dash(Some(s.fuel_types.join(", ").as_str()))),
        format!("Manager:   {}", util::or_dash(s.manager_name.as_deref())),
        format!(
            "Updated:   {}",
            s.updated_at.map_or_else(|| "-".into(), |t| t.to_rfc3339())
        ),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(console: &Console, args: StationsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let stations = console.stations();

    match args.command {
        StationsCommand::List(filters) => {
            let changes = util::filter_changes(&[
                ("status", filters.status.as_ref()),
                ("region", filters.region.as_ref()),
                ("search", filters.search.as_ref()),
            ]);
            let snap = util::load_collection(stations, changes, global).await?;
            let out = if filters.stats {
                output::render_stats(&global.output, &snap.stats)?
            } else {
                output::render_list(&global.output, &snap.items, |s| StationRow::from(s), |s| s.id.to_string())?
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StationsCommand::Get { id } => {
            let station = util::find(stations, &id, global).await?;
            let out = output::render_single(&global.output, &station, detail, |s| s.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StationsCommand::Create {
            code,
            name,
            region,
            location,
            status,
            pumps,
            fuel,
        } => {
            let draft = StationDraft {
                code,
                name,
                region,
                location,
                status,
                pump_count: pumps,
                fuel_types: fuel,
                manager_id: None,
                manager_name: None,
            };
            let created = util::applied(stations.create(draft).await)?;
            util::print_entity(created.as_ref(), global, detail)
        }

        StationsCommand::Update {
            id,
            code,
            name,
            region,
            location,
            pumps,
            fuel,
        } => {
            let patch = StationPatch {
                code,
                name,
                region,
                location,
                status: None,
                pump_count: pumps,
                fuel_types: fuel,
            };
            let updated = util::applied(stations.update(EntityId::from(id), patch).await)?;
            util::print_entity(updated.as_ref(), global, detail)
        }

        StationsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete station {id}?"), global.yes)? {
                return Ok(());
            }
            util::applied(stations.delete(EntityId::from(id)).await)?;
            Ok(())
        }

        StationsCommand::Status { id, status } => {
            let updated = util::applied(stations.change_status(EntityId::from(id), status).await)?;
            util::print_entity(updated.as_ref(), global, detail)
        }

        StationsCommand::Assign { id, user, name } => {
            let assignee = Assignee::new(user, name);
            let updated = util::applied(stations.assign(EntityId::from(id), assignee).await)?;
            util::print_entity(updated.as_ref(), global, detail)
        }

        StationsCommand::Unassign { id } => {
            let updated = util::applied(stations.unassign(EntityId::from(id)).await)?;
            util::print_entity(updated.as_ref(), global, detail)
        }
    }
}
