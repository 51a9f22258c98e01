//! View model for the board: what a host page would show, as plain data.

use shared::domain::{Activity, Catalog};

pub const NO_PARTICIPANTS_PLACEHOLDER: &str = "No participants yet";
pub const LOADING_MESSAGE: &str = "Loading activities...";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load activities. Please try again later.";

/// A rendered delete control. Only affordances present in the current
/// render pass are live.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeleteAffordance {
    pub activity: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantSection {
    Placeholder,
    Roster(Vec<DeleteAffordance>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCard {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub spots_left: i64,
    pub participants: ParticipantSection,
}

impl ActivityCard {
    pub fn render(name: &str, activity: &Activity) -> Self {
        let participants = if activity.participants.is_empty() {
            ParticipantSection::Placeholder
        } else {
            ParticipantSection::Roster(
                activity
                    .participants
                    .iter()
                    .map(|email| DeleteAffordance {
                        activity: name.to_string(),
                        email: email.clone(),
                    })
                    .collect(),
            )
        };

        Self {
            name: name.to_string(),
            description: activity.description.clone(),
            schedule: activity.schedule.clone(),
            spots_left: activity.spots_left(),
            participants,
        }
    }

    pub fn delete_affordances(&self) -> &[DeleteAffordance] {
        match &self.participants {
            ParticipantSection::Placeholder => &[],
            ParticipantSection::Roster(rows) => rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListArea {
    Loading,
    Cards(Vec<ActivityCard>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivitySelector {
    pub options: Vec<SelectorOption>,
    pub selected: Option<String>,
}

impl ActivitySelector {
    pub fn select(&mut self, value: &str) -> bool {
        if self.options.iter().any(|o| o.value == value) {
            self.selected = Some(value.to_string());
            true
        } else {
            false
        }
    }

    /// Replaces the options, keeping the selection if it still exists.
    fn repopulate(&mut self, options: Vec<SelectorOption>) {
        if let Some(selected) = &self.selected {
            if !options.iter().any(|o| &o.value == selected) {
                self.selected = None;
            }
        }
        self.options = options;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

impl StatusKind {
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub list: ListArea,
    pub selector: ActivitySelector,
    pub email: String,
    pub message: Option<StatusMessage>,
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            list: ListArea::Loading,
            selector: ActivitySelector::default(),
            email: String::new(),
            message: None,
        }
    }
}

impl BoardView {
    /// Clears the list and rebuilds cards and selector options from `catalog`.
    pub fn render_catalog(&mut self, catalog: &Catalog) {
        let mut cards = Vec::with_capacity(catalog.len());
        let mut options = Vec::with_capacity(catalog.len());
        for (name, activity) in catalog {
            cards.push(ActivityCard::render(name, activity));
            options.push(SelectorOption {
                value: name.clone(),
                label: name.clone(),
            });
        }
        self.list = ListArea::Cards(cards);
        self.selector.repopulate(options);
    }

    /// Replaces the list with the failure text. The selector is left as is.
    pub fn render_load_failure(&mut self) {
        self.list = ListArea::Failed(LOAD_FAILED_MESSAGE.to_string());
    }

    pub fn show_message(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.message = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    pub fn reset_form(&mut self) {
        self.email.clear();
        self.selector.selected = None;
    }

    pub fn cards(&self) -> &[ActivityCard] {
        match &self.list {
            ListArea::Cards(cards) => cards,
            ListArea::Loading | ListArea::Failed(_) => &[],
        }
    }

    pub fn card(&self, name: &str) -> Option<&ActivityCard> {
        self.cards().iter().find(|card| card.name == name)
    }

    pub fn delete_affordances(&self) -> impl Iterator<Item = &DeleteAffordance> {
        self.cards()
            .iter()
            .flat_map(|card| card.delete_affordances().iter())
    }

    pub fn is_live(&self, affordance: &DeleteAffordance) -> bool {
        self.delete_affordances().any(|live| live == affordance)
    }
}
