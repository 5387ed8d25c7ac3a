//! # Waitroom
//!
//! Admission-and-release engine for a multi-tenant virtual waiting room.
//!
//! Tenant applications own queues. Visitors join a queue and wait; a
//! periodic release scheduler moves a bounded number of the oldest waiting
//! visitors of each queue to ready and notifies the owning application over
//! an HTTP callback. A second loop expires visitors whose admission window
//! elapsed, and a sliding-window limiter caps how fast any one client can
//! join.
//!
//! ## Participant lifecycle
//!
//! ```text
//! waiting --release--> ready
//!    |
//!    +----expire-----> expired
//!    |
//!    +----cancel-----> rejected
//! ```
//!
//! Every transition is a conditional write on the participant store, so
//! overlapping release cycles, the expiry sweep and client cancellations can
//! run concurrently without releasing anyone twice.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use waitroom::builders::WaitingRoomBuilder;
//! use waitroom::config::EngineConfig;
//! use waitroom::infra::InMemoryDirectory;
//! use waitroom::runtime::{join, ClientIdentity, JoinMode, JoinRequest, TokioSpawner};
//!
//! let directory = Arc::new(InMemoryDirectory::new());
//! let app = directory.provision_application("shop", "secret", "https://shop.example/cb");
//! let queue = directory.provision_queue(app.id, "checkout", 50);
//!
//! let room = WaitingRoomBuilder::new(EngineConfig::from_env()?, TokioSpawner::current())
//!     .directory(directory)
//!     .build()?;
//! room.start();
//!
//! let client = ClientIdentity { credential: Some("secret".into()), ..Default::default() };
//! let joined = join(
//!     &room,
//!     &client,
//!     JoinRequest { queue_id: queue.id, visitor_id: "v-1".into(), redirect_url: None },
//!     JoinMode::Real,
//! )?;
//! println!("token {}", joined.participant.token);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: domain model, store traits, admission, release, expiry, dispatch
//! - [`config`]: engine configuration with JSON and environment loading
//! - [`builders`]: assemble a [`core::WaitingRoom`] from configuration
//! - [`infra`]: in-memory backends, HTTP callback transport, log notifier
//! - [`runtime`]: tokio spawner and the request surface
//! - [`util`]: clock, tokens, metrics, tracing setup

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Domain model, storage seams and the admission-and-release engine.
pub mod core;
/// Configuration models for pacing, callbacks and rate limiting.
pub mod config;
/// Builders to construct the waiting room from configuration.
pub mod builders;
/// Infrastructure adapters for storage, tenant lookup, callbacks and alerts.
pub mod infra;
/// Runtime adapters and the request surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
