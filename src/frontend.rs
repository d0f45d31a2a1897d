//! Text front end: runs parsed commands against a session and renders the
//! results a UI would show in its labels.

use std::fmt::Write as _;

use crate::commands::{Command, HELP};
use crate::models::ModelSource;
use crate::picking::PickOutcome;
use crate::session::{BouquetCounts, BouquetSession};

/// Counter label plus the actions a UI would grey out
pub fn status_line(counts: &BouquetCounts) -> String {
    let mut line = format!(
        "{} / {} flowers, {} free slots",
        counts.occupied, counts.capacity, counts.free
    );
    let disabled: Vec<&str> = [
        (!counts.can_add()).then_some("add"),
        (!counts.can_remove()).then_some("remove"),
        (!counts.can_clear()).then_some("clear"),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !disabled.is_empty() {
        let _ = write!(line, " [disabled: {}]", disabled.join(", "));
    }
    line
}

/// Outcome of one command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Runs `command`, blocking on model loads. Errors are reported as text; a
/// failed command never ends the session.
pub fn execute<S: ModelSource>(session: &mut BouquetSession<S>, command: &Command) -> Reply {
    let text = match command {
        Command::Add(type_id) => match pollster::block_on(session.add_flower(type_id)) {
            Ok(handle) => {
                let slot = session
                    .registry()
                    .find_by_handle(handle)
                    .map(|f| f.slot_index)
                    .unwrap_or_default();
                format!("added {} in slot {}", type_id, slot)
            }
            Err(e) => format!("error: {}", e),
        },
        Command::Bouquet(type_id) => match pollster::block_on(session.generate_full_bouquet(type_id)) {
            Ok(placed) => format!("bouquet of {} {} flowers", placed, type_id),
            Err(e) => format!("error: {}", e),
        },
        Command::Remove => match session.remove_last() {
            Some(f) => format!("removed {} from slot {}", f.type_id, f.slot_index),
            None => "nothing to remove".to_string(),
        },
        Command::Clear => format!("cleared {} flowers", session.clear_all()),
        Command::Pick { x, y } => match session.pick_at(*x, *y) {
            PickOutcome::Missed => "nothing there".to_string(),
            PickOutcome::NotAFlower(_) => "not a flower".to_string(),
            PickOutcome::AlreadySelected(_) => "already selected".to_string(),
            PickOutcome::Selected { .. } => match session.selected_instance() {
                Some(f) => format!("selected {} in slot {}", f.type_id, f.slot_index),
                None => "selected".to_string(),
            },
        },
        Command::Deselect => match session.clear_selection() {
            Some(_) => "selection cleared".to_string(),
            None => "nothing selected".to_string(),
        },
        Command::Delete => match session.delete_selected() {
            Ok(Some(f)) => format!("deleted {} from slot {}", f.type_id, f.slot_index),
            Ok(None) => "nothing selected".to_string(),
            Err(e) => format!("error: {}", e),
        },
        Command::Replace(type_id) => match pollster::block_on(session.replace_selected(type_id)) {
            Ok(Some(_)) => format!("replaced with {}", type_id),
            Ok(None) => "nothing selected".to_string(),
            Err(e) => format!("error: {}", e),
        },
        Command::Orbit { dx, dy } => {
            session.camera_mut().rotate(*dx, *dy);
            camera_line(session)
        }
        Command::Zoom(delta) => {
            session.camera_mut().zoom(*delta);
            camera_line(session)
        }
        Command::ResetCamera => {
            session.camera_mut().reset();
            camera_line(session)
        }
        Command::View { theta, phi, distance } => {
            session.camera_mut().set_view(*theta, *phi, *distance);
            camera_line(session)
        }
        Command::Status => {
            let mut text = status_line(&session.counts());
            if let Some(f) = session.selected_instance() {
                let _ = write!(text, ", selected {} in slot {}", f.type_id, f.slot_index);
            }
            text
        }
        Command::Slots => slots_table(session),
        Command::Types => session
            .config()
            .flower_types
            .iter()
            .map(|t| format!("{:<10} {:<12} #{:06x}", t.id, t.name, t.color.to_hex()))
            .collect::<Vec<_>>()
            .join("\n"),
        Command::Help => HELP.to_string(),
        Command::Quit => return Reply::Quit,
    };
    Reply::Text(text)
}

fn camera_line<S: ModelSource>(session: &BouquetSession<S>) -> String {
    let cam = session.camera();
    format!(
        "camera theta {:.2} phi {:.2} distance {:.2}",
        cam.theta, cam.phi, cam.distance
    )
}

fn slots_table<S: ModelSource>(session: &BouquetSession<S>) -> String {
    session
        .slots()
        .iter()
        .map(|slot| {
            let occupant = session
                .registry()
                .find_by_slot(slot.index)
                .map(|f| f.type_id.as_str())
                .unwrap_or("-");
            format!(
                "{:>3} ({:>6.3}, {:>6.3}, {:>6.3}) tilt {:>5.1}° {}",
                slot.index,
                slot.position.x,
                slot.position.y,
                slot.position.z,
                slot.tilt_angle.to_degrees(),
                occupant
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
