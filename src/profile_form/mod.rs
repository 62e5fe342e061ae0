//! # Profile Edit Form
//!
//! The state machine behind the editable profile section.
//!
//! ```text
//!            start_edit            begin_save
//!  Viewing ─────────────▶ Editing ───────────▶ Saving
//!     ▲                    │  ▲                  │
//!     └──── cancel ────────┘  └── finish_save ───┤ (Err: draft kept)
//!     ▲                                          │
//!     └──────────── finish_save (Ok) ────────────┘
//! ```
//!
//! External calls are split into a synchronous *begin* step that mutates the
//! form and hands out a ticket, and an async step that runs the ticket without
//! borrowing the form. The outcome is then applied back with a synchronous
//! *apply*/*finish* step. Between the two, the form can keep taking edits, and
//! outcomes that no longer match the form are discarded.
//!
//! [`ProfileEditForm::blur`] and [`ProfileEditForm::save`] chain the steps for
//! callers that do not need to interleave anything.

pub mod error;
pub mod form;
pub mod ticket;

pub use error::{FormError, SaveError, ValidationError};
pub use form::ProfileEditForm;
pub use ticket::{SaveTicket, ValidationOutcome, ValidationTicket};

use serde::Serialize;

/// Where the form is in its edit cycle. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormMode {
    Viewing,
    Editing,
    Saving,
}
