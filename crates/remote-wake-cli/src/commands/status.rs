//! Status command implementation.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use remote_wake_core::presence::{JsonCacheStore, PresenceDetector};
use remote_wake_core::settings::Settings;

use super::{lookup_device, Context};
use crate::cli::StatusArgs;
use crate::error::{CliError, Result};
use crate::output::{get_formatter, StatusLine};

/// Run the status command
pub async fn run_status(args: StatusArgs, ctx: &Context) -> Result<()> {
    let lines = collect_status(&args, ctx).await?;
    println!("{}", get_formatter(ctx.json).format_status(&lines));
    Ok(())
}

/// An unreadable registry only matters when the target has to be resolved
/// through it; a bare IPv4 address is still probed with default settings.
async fn collect_status(args: &StatusArgs, ctx: &Context) -> Result<Vec<StatusLine>> {
    let registry = ctx.registry()?;
    let settings = match registry.settings().await {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!(
                "Could not read {} ({}), using default settings",
                registry.path().display(),
                e
            );
            Settings::default()
        }
    };
    let store = Arc::new(JsonCacheStore::in_dir(&ctx.data_dir));
    let detector = PresenceDetector::open(&settings, store).await;

    if args.target.eq_ignore_ascii_case("all") {
        let devices = registry.list().await?;
        let ips: Vec<Ipv4Addr> = devices.iter().map(|d| d.ip).collect();
        let deadline = args
            .deadline_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| settings.refresh_deadline());

        let reports: HashMap<Ipv4Addr, _> = detector
            .refresh_all(&ips, args.force, deadline)
            .await
            .into_iter()
            .map(|r| (r.ip, r))
            .collect();

        return Ok(devices
            .into_iter()
            .filter_map(|device| {
                let report = *reports.get(&device.ip)?;
                Some(StatusLine {
                    device: Some(device),
                    report,
                })
            })
            .collect());
    }

    let literal = args.target.parse::<Ipv4Addr>().ok();
    let device = match lookup_device(&registry, &args.target).await {
        Ok(device) => device,
        Err(CliError::Core(e)) if literal.is_some() => {
            log::debug!("Registry lookup for {} failed: {}", args.target, e);
            None
        }
        Err(e) => return Err(e),
    };
    let ip = match (&device, literal) {
        (Some(device), _) => device.ip,
        (None, Some(ip)) => ip,
        (None, None) => return Err(CliError::DeviceNotFound(args.target.clone())),
    };

    let report = detector.get_status(ip, args.force).await;
    Ok(vec![StatusLine { device, report }])
}
