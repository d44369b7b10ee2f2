//! Web Agency API Library
//!
//! Drives a fixed pipeline of specialised text-generation workers over a
//! project brief, one deliverable per step, with pause/resume and crash
//! recovery of the pipeline state.

pub mod agents;
pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod workflow;
