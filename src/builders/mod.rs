//! Builders to construct the waiting room from configuration.

pub mod room_builder;

pub use room_builder::{build_waiting_room, WaitingRoomBuilder};
