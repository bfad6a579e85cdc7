//! The gesture arena game: hand landmarks in, arcade state out.

pub mod app;
pub mod entities;
pub mod events;
pub mod gesture;
pub mod landmarks;
pub mod log;
pub mod missions;
pub mod renderer;
pub mod simulation;

pub use events::{event_channel, EventSink, GameEvent};
pub use gesture::{classify, GestureLabel};
pub use landmarks::{HandFrame, Landmark};
