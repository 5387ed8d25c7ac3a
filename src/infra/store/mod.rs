//! Participant store backends.

pub mod memory;

pub use memory::InMemoryParticipantStore;
