//! Client side of the activity board: HTTP access to the activity endpoints,
//! a view model of the board, and the controller that ties them together.

pub mod api;
pub mod controller;
pub mod error;
pub mod view;

pub use api::{ActivityApi, HttpActivityApi, MutationReceipt};
pub use controller::{
    unregister_confirmation, BoardController, Dialogs, LoadState, SignupOutcome,
    UnregisterOutcome,
};
pub use error::ClientError;
pub use view::{
    ActivityCard, ActivitySelector, BoardView, DeleteAffordance, ListArea, ParticipantSection,
    SelectorOption, StatusKind, StatusMessage,
};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
