//! Core data types for Parley.

pub mod conversation;
pub mod message;
pub mod participant;
pub mod run;

pub use conversation::*;
pub use message::*;
pub use participant::*;
pub use run::*;
