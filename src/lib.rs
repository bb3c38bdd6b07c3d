//! Renaissance Core - Emotional-State Aggregation Engine
//!
//! This crate implements the event-sourced core of a career-coaching suite:
//! an append-only log of user activity events is folded into a rolling,
//! windowed Emotional Vector State per user, materialized read views are
//! maintained by a projector consuming the same log, and a pure decision
//! engine inspects recent history to decide whether a wellbeing intervention
//! should fire.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
