// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::Result;

use super::Context;

/// Drop every queued request without delivering it.
pub fn run() -> Result<()> {
    let ctx = Context::open()?;
    let removed = ctx.queue().clear()?;
    println!("Removed {} queued request{}.", removed, if removed == 1 { "" } else { "s" });
    Ok(())
}
