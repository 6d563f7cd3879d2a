pub mod confirm;
pub mod controller;
pub mod state;

pub use confirm::{ ConfirmationPrompt, ModalPrompt };
pub use controller::{ BookmarkListController, DeleteOutcome };
pub use state::{ BookmarkCard, CardState, DashboardSnapshot, DashboardView };
