//! User command handlers.

use tabled::Tabled;

use fuelsync_core::{Assignee, Console, EntityId, User, UserDraft, UserPatch};

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Station")]
    station: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            name: u.full_name.clone(),
            email: u.email.clone(),
            role: u.role.to_string(),
            status: u.status.to_string(),
            station: util::or_dash(u.station_name.as_deref()),
        }
    }
}

fn detail(u: &User) -> String {
    [
        format!("ID:       {}", u.id),
        format!("Name:     {}", u.full_name),
        format!("Email:    {}", u.email),
        format!("Phone:    {}", util::or_dash(Some(u.phone.as_str()))),
        format!("Role:     {}", u.role),
        format!("Status:   {}", u.status),
        format!("Station:  {}", util::or_dash(u.station_name.as_deref())),
    ]
    .join("\n")
}

pub async fn handle(console: &Console, args: UsersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let users = console.users();

    match args.command {
        UsersCommand::List(filters) => {
            let changes = util::filter_changes(&[
                ("role", filters.role.as_ref()),
                ("status", filters.status.as_ref()),
                ("station", filters.station.as_ref()),
                ("search", filters.search.as_ref()),
            ]);
            let snap = util::load_collection(users, changes, global).await?;
            let out = if filters.stats {
                output::render_stats(&global.output, &snap.stats)?
            } else {
                output::render_list(&global.output, &snap.items, |u| UserRow::from(u), |u| u.id.to_string())?
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Get { id } => {
            let user = util::find(users, &id, global).await?;
            let out = output::render_single(&global.output, &user, detail, |u| u.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Create {
            name,
            email,
            phone,
            role,
            status,
        } => {
            let draft = UserDraft {
                full_name: name,
                email,
                phone,
                role,
                status,
                station_id: None,
                station_name: None,
            };
            let created = util::applied(users.create(draft).await)?;
            util::print_entity(created.as_ref(), global, detail)
        }

        UsersCommand::Update {
            id,
            name,
            email,
            phone,
            role,
        } => {
            let patch = UserPatch {
                full_name: name,
                email,
                phone,
                role,
                status: None,
            };
            let updated = util::applied(users.update(EntityId::from(id), patch).await)?;
            util::print_entity(updated.as_ref(), global, detail)
        }

        UsersCommand::Delete { id } => {
            if !util::confirm(&format!("Delete user {id}?"), global.yes)? {
                return Ok(());
            }
            util::applied(users.delete(EntityId::from(id)).await)?;
            Ok(())
        }

        UsersCommand::Status { id, status } => {
            let updated = util::applied(users.change_status(EntityId::from(id), status).await)?;
            util::print_entity(updated.as_ref(), global, detail)
        }

        UsersCommand::Assign { id, station, name } => {
            let assignee = Assignee::new(station, name);
            let updated = util::applied(users.assign(EntityId::from(id), assignee).await)?;
            util::print_entity(updated.as_ref(), global, detail)
        }

        UsersCommand::Unassign { id } => {
            let updated = util::applied(users.unassign(EntityId::from(id)).await)?;
            util::print_entity(updated.as_ref(), global, detail)
        }
    }
}
