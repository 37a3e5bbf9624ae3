//! `bazaar` command-line front end.
//!
//! Command parsing and dispatch live here so they can be tested; the
//! binary entrypoint is `main.rs`.

pub mod command;
pub mod run;
