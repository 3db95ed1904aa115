//! Chat proxy server binary.
//! Run with: cargo run --bin codehelper-server

use std::process::ExitCode;

use codehelper_chat::start_codehelper;

fn main() -> ExitCode {
    start_codehelper::run()
}
