//! Wake command implementation.

use remote_wake_core::wol::{self, UdpBroadcastSender};

use super::{lookup_device, Context};
use crate::cli::WakeArgs;
use crate::error::Result;
use crate::output::get_formatter;

/// Run the wake command.
///
/// A registered device is woken by its stored MAC; anything else is
/// treated as a raw MAC address.
pub async fn run_wake(args: WakeArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry()?;
    let settings = registry.settings().await?;
    let device = lookup_device(&registry, &args.target).await?;

    let raw_mac = match &device {
        Some(device) => device.mac.to_string(),
        None => args.target.clone(),
    };

    let sender = UdpBroadcastSender::new(settings.wake_target);
    let mac = wol::wake(&sender, &raw_mac).await?;

    println!(
        "{}",
        get_formatter(ctx.json).format_wake(mac, device.as_ref(), sender.target())
    );
    Ok(())
}
