//! Plain-text rendering of the board view.

use std::fmt::Write as _;

use client_core::{ActivityCard, BoardView, ListArea, ParticipantSection};
use client_core::view::{LOADING_MESSAGE, NO_PARTICIPANTS_PLACEHOLDER};

pub fn render_board(view: &BoardView) -> String {
    let mut out = String::new();
    match &view.list {
        ListArea::Loading => {
            let _ = writeln!(out, "{LOADING_MESSAGE}");
        }
        ListArea::Failed(message) => {
            let _ = writeln!(out, "{message}");
        }
        ListArea::Cards(cards) => {
            for card in cards {
                render_card(&mut out, card);
            }
        }
    }

    if let Some(message) = &view.message {
        let _ = writeln!(out, "[{}] {}", message.kind.class_name(), message.text);
    }
    out
}

fn render_card(out: &mut String, card: &ActivityCard) {
    let _ = writeln!(out, "{}", card.name);
    let _ = writeln!(out, "  {}", card.description);
    let _ = writeln!(out, "  Schedule: {}", card.schedule);
    let _ = writeln!(out, "  Availability: {} spots left", card.spots_left);
    let _ = writeln!(out, "  Participants:");
    match &card.participants {
        ParticipantSection::Placeholder => {
            let _ = writeln!(out, "    {NO_PARTICIPANTS_PLACEHOLDER}");
        }
        ParticipantSection::Roster(rows) => {
            for row in rows {
                let _ = writeln!(out, "    - {} [x]", row.email);
            }
        }
    }
    let _ = writeln!(out);
}
