//! Form rendering module
//!
//! - `field_renderer`: one configured field with its error line
//! - `dynamic_form`: the active form, loading placeholder and submit button

mod dynamic_form;
mod field_renderer;

pub use dynamic_form::draw_form;
