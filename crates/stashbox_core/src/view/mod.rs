//! View-state layer: turns table streams into UI-facing state snapshots.
//!
//! # Responsibility
//! - Join table listings with aggregation into display-ready data.
//! - Wrap the data in a `Loading | Success | Error` state machine.
//!
//! # Invariants
//! - `Error` is terminal until the synchronizer is restarted.
//! - Store failures never escape as panics; they become `Error` states.

pub mod card;
mod projection;
mod state;
mod sync;

pub use card::{CardData, CardKind};
pub use projection::{
    boxes_view, cards_view, collections_view, items_view, summary_view, InventorySnapshot,
    ViewDefinition,
};
pub use state::ViewState;
pub use sync::ViewStateSync;
