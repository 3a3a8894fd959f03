// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use courierrs::Cli;

fn main() {
    let cli = Cli::parse();
    courierrs::init_logging();
    if let Err(e) = courierrs::run(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
