//! Form domain layer
//!
//! Field specifications, answer and error maps, committed entries and the
//! session controller that ties them together.

mod field;
mod form_state;
mod session;

pub use field::{FieldSpec, FieldValue};
pub use form_state::{AnswerMap, Entry, ErrorMap, FormConfig};
pub use session::{FormSession, LoadOutcome, LoadState, LoadTicket, SubmitOutcome};
