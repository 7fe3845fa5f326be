//! Backend health probe.

use fuelsync_core::{ConnectionStatus, Console, NotificationLevel};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(s: &ConnectionStatus) -> String {
    [
        format!("Endpoint:   {}", s.endpoint),
        format!("Connected:  {}", if s.connected { "yes" } else { "no" }),
        format!(
            "Latency:    {}",
            s.response_time_ms.map_or_else(|| "-".into(), |ms| format!("{ms} ms"))
        ),
        format!("Checked:    {}", s.last_checked.to_rfc3339()),
    ]
    .join("\n")
}

/// Probe once and print the result. An unreachable backend exits nonzero
/// unless the session is offline by choice.
pub async fn handle(console: &Console, offline: bool, global: &GlobalOpts) -> Result<(), CliError> {
    let status = console.check_connection().await;
    let out = output::render_single(&global.output, &status, detail, |s| s.connected.to_string())?;
    output::print_output(&out, global.quiet);

    if status.connected {
        return Ok(());
    }
    if offline {
        util::notices(global).emit(
            NotificationLevel::Info,
            "Offline mode",
            "the backend is not contacted",
        );
        return Ok(());
    }
    Err(CliError::ConnectionFailed {
        message: format!("health probe to {} failed", status.endpoint),
    })
}
