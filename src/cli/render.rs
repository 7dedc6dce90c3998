//! Terminal rendering of the reveal display signal.

use std::io::Write;

use tokio::sync::watch;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;

use crate::reveal::{Phase, PhaseState};

/// Text shown for one display value. `None` while idle.
#[must_use]
pub fn render_line(state: &PhaseState) -> Option<String> {
    match state.phase {
        Phase::Idle => None,
        Phase::Countdown => Some(format!(
            "{}  {}",
            state.displayed_name, state.countdown_remaining
        )),
        Phase::Scrolling | Phase::Settling => Some(format!(">> {} <<", state.displayed_name)),
        Phase::Complete => Some("draw complete".to_string()),
    }
}

/// Writes display updates to `out` until the run completes or is reset.
///
/// With `live`, each update overwrites the current terminal line; otherwise
/// every distinct line is written on its own row. Returns the writer.
pub async fn render_display<W: Write>(
    display: watch::Receiver<PhaseState>,
    mut out: W,
    live: bool,
) -> W {
    let mut updates = WatchStream::new(display);
    let mut claimed = false;
    let mut last_line = String::new();

    while let Some(state) = updates.next().await {
        if state.run_id == 0 {
            if claimed {
                break;
            }
            continue;
        }
        claimed = true;

        if let Some(line) = render_line(&state) {
            if line != last_line {
                if live {
                    let _ = write!(out, "\r\x1b[2K{line}");
                } else {
                    let _ = writeln!(out, "{line}");
                }
                let _ = out.flush();
                last_line = line;
            }
        }

        if state.phase == Phase::Complete {
            break;
        }
    }

    if live && claimed {
        let _ = writeln!(out);
    }
    out
}
