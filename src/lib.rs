//! Creature text: localized speech broadcasting for non-player characters.
//!
//! Picks a line from a creature's text group with weighted, non-repeating
//! selection, renders it once per recipient locale into the chat wire
//! layout, and delivers it to the audience resolved for the requested range.

pub mod core;
pub mod schema;
