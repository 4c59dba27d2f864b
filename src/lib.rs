//! Slot Filler - Multi-turn slot-filling dialog engine
//!
//! This crate collects structured, possibly nested, values from a user over
//! several conversational turns, persisting the dialog stack between turns
//! in a pluggable conversation state store.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
