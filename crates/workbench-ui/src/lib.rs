//! egui front end for the knowledge workbench.
//!
//! Panels read [`state::UiState`] and hand user intent back to the app
//! as action values; they never touch the chat session directly.

pub mod state;
pub mod theme;
pub mod panels;

#[cfg(test)]
mod tests;
