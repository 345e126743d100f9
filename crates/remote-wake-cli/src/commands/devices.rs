//! Device registry commands.

use remote_wake_core::types::{DeviceUpdate, NewDevice};

use super::{resolve_device, Context};
use crate::cli::{DeviceAddArgs, DeviceEditArgs, DeviceRemoveArgs, DevicesArgs, DevicesCommands};
use crate::error::{CliError, Result};
use crate::output::get_formatter;

/// Run the devices command
pub async fn run_devices(args: DevicesArgs, ctx: &Context) -> Result<()> {
    match args.command {
        DevicesCommands::List => run_list(ctx).await,
        DevicesCommands::Add(args) => run_add(args, ctx).await,
        DevicesCommands::Edit(args) => run_edit(args, ctx).await,
        DevicesCommands::Remove(args) => run_remove(args, ctx).await,
    }
}

async fn run_list(ctx: &Context) -> Result<()> {
    let registry = ctx.registry()?;
    let devices = registry.list().await?;

    println!("{}", get_formatter(ctx.json).format_devices(&devices));
    Ok(())
}

async fn run_add(args: DeviceAddArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry()?;
    let device = registry
        .add(NewDevice {
            name: args.name,
            mac: args.mac,
            ip: args.ip,
        })
        .await?;

    println!("{}", get_formatter(ctx.json).format_device("Added", &device));
    Ok(())
}

async fn run_edit(args: DeviceEditArgs, ctx: &Context) -> Result<()> {
    let update = DeviceUpdate {
        name: args.name,
        mac: args.mac,
        ip: args.ip,
    };
    if update == DeviceUpdate::default() {
        return Err(CliError::InvalidArgument(
            "Nothing to change; pass --name, --mac or --ip".to_string(),
        ));
    }

    let registry = ctx.registry()?;
    let device = resolve_device(&registry, &args.target).await?;
    let updated = registry.update(device.id, update).await?;

    println!("{}", get_formatter(ctx.json).format_device("Updated", &updated));
    Ok(())
}

async fn run_remove(args: DeviceRemoveArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry()?;
    let device = resolve_device(&registry, &args.target).await?;
    let removed = registry.remove(device.id).await?;

    println!("{}", get_formatter(ctx.json).format_device("Removed", &removed));
    Ok(())
}
