//! Stateless commands: seal and open a record without touching the slot.

use anyhow::Context;

use crate::app::AppContext;
use crate::cli::{OpenArgs, SealArgs};
use crate::input::read_record;
use crate::output::print_json;

pub fn handle_seal(ctx: &AppContext, args: &SealArgs) -> anyhow::Result<()> {
    let record = read_record(args.record.clone())?;
    let bundle = ctx.engine()?.seal(&record)?;
    print_json(&bundle)
}

pub fn handle_open(ctx: &AppContext, args: &OpenArgs) -> anyhow::Result<()> {
    let record = ctx
        .engine()?
        .open_hex(args.ciphertext.trim(), args.iv.trim())
        .context("Failed to open ciphertext")?;
    print_json(&record)
}
