//! Corkboard: kanban project board backend core.
//!
//! This crate provides the consistency-critical core of a kanban board
//! service: boards hold ordered columns, columns hold ordered tasks, and
//! every mutation is recorded in an append-only activity log. Position
//! maintenance under concurrent reordering is the central concern; the
//! surrounding API layer (routing, authentication, authorization, file
//! storage) is an external collaborator that invokes this core with an
//! already-authorized actor.
//!
//! # Architecture
//!
//! Corkboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, memory)
//!
//! # Modules
//!
//! - [`board`]: Board aggregate, reorder engine, activity log, and services

pub mod board;
