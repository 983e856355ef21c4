//! Slot commands: save, load and status.

use formseal_core::store::{format_iso, LoadOutcome};

use crate::app::AppContext;
use crate::cli::SaveArgs;
use crate::errors::CliError;
use crate::input::{read_record, read_save_request};
use crate::output::{load_expired_json, load_found_json, load_not_found_json, print_json};

pub fn handle_save(ctx: &AppContext, args: &SaveArgs) -> anyhow::Result<()> {
    let (record, ttl_days) = if args.request {
        read_save_request(args.record.clone())?
    } else {
        let record = read_record(args.record.clone())?;
        let ttl_days = args.ttl_days.unwrap_or(ctx.settings()?.default_ttl_days);
        (record, ttl_days)
    };

    let receipt = ctx.store()?.save(&record, Some(ttl_days))?;
    if !ctx.quiet() {
        print_json(&receipt)?;
    }
    Ok(())
}

pub fn handle_load(ctx: &AppContext) -> anyhow::Result<()> {
    match ctx.store()?.load()? {
        LoadOutcome::Found {
            record,
            expiry_date,
        } => print_json(&load_found_json(&record, &expiry_date)),
        LoadOutcome::Expired { expiry_date } => {
            print_json(&load_expired_json())?;
            Err(CliError::expired(format_iso(&expiry_date)).into())
        }
        LoadOutcome::NotFound => {
            print_json(&load_not_found_json())?;
            Err(CliError::not_found("No data found").into())
        }
    }
}

pub fn handle_status(ctx: &AppContext) -> anyhow::Result<()> {
    let settings = ctx.settings()?;
    let state = ctx.store()?.state()?;

    let mut value = serde_json::to_value(&state)?;
    value["slot"] = serde_json::Value::String(settings.slot_path.display().to_string());
    print_json(&value)
}
