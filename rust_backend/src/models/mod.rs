//! Candidate data model: targets, their visits and sky positions.
//!
//! Every type here is built from a raw catalog record (a JSON-like mapping)
//! and is read-only afterwards.

pub mod fields;
pub mod observation;
pub mod position;
pub mod target;


pub use fields::{Parsed, RawRecord};
pub use observation::Observation;
pub use position::{Frame, Position, ProperMotion};
pub use target::Target;
