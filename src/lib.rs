//! Chat front end for a remote C#/.NET question-answering backend: an HTTP
//! proxy, a transport client and the conversation state machine that drives
//! the chat UI.

#![deny(warnings)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(dead_code)]
#![deny(non_camel_case_types)]
#![deny(unused_imports)]
#![deny(unused_variables)]
#![deny(unused_must_use)]
#![deny(non_snake_case)]
#![deny(non_upper_case_globals)]
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]
// Clippy
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::missing_const_for_fn)]
#![deny(clippy::unwrap_in_result)]
#![deny(clippy::module_inception)]
#![deny(clippy::redundant_clone)]
#![deny(clippy::shadow_unrelated)]
#![deny(clippy::too_many_arguments)]
#![deny(clippy::cognitive_complexity)]
#![deny(overflowing_literals)]
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::too_many_lines,
        clippy::significant_drop_tightening
    )
)]

/// HTTP transport client and the transport trait.
#[allow(clippy::option_if_let_else)]
pub mod client;
/// Environment-driven configuration.
#[allow(clippy::option_if_let_else, clippy::missing_const_for_fn)]
pub mod config;
/// Message log, state machine and session driver.
#[allow(clippy::missing_const_for_fn, clippy::option_if_let_else)]
pub mod conversation;
/// Error taxonomy.
pub mod error;
/// HTTP proxy server and routes.
#[allow(
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::option_if_let_else,
    clippy::unused_async
)]
pub mod server;
/// Entry helpers for the server binary.
pub mod start_codehelper;

#[cfg(test)]
mod testing;
