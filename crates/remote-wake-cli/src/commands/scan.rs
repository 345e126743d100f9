//! Scan command implementation.

use remote_wake_core::discovery::Discovery;
use remote_wake_core::settings::{ScanRange, Settings};
use remote_wake_core::types::NewDevice;

use super::Context;
use crate::cli::ScanArgs;
use crate::error::{CliError, Result};
use crate::output::get_formatter;

/// Run the scan command
pub async fn run_scan(args: ScanArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry()?;
    let mut settings = registry.settings().await?;
    settings.scan_range = scan_range(&args, &settings)?;

    let outcome = Discovery::from_settings(&settings).scan_local().await;
    let formatter = get_formatter(ctx.json);

    if let (Some(ip), Some(name)) = (args.add, args.name) {
        let found = outcome
            .devices
            .iter()
            .find(|d| d.ip == ip)
            .ok_or_else(|| CliError::DeviceNotFound(ip.to_string()))?;
        let mac = found.mac.ok_or_else(|| {
            CliError::InvalidArgument(format!("No MAC address known for {}", ip))
        })?;

        let device = registry
            .add(NewDevice {
                name,
                mac: mac.to_string(),
                ip: ip.to_string(),
            })
            .await?;
        println!("{}", formatter.format_device("Added", &device));
        return Ok(());
    }

    let registered = registry.list().await?;
    println!("{}", formatter.format_scan(&outcome, &registered));
    Ok(())
}

fn scan_range(args: &ScanArgs, settings: &Settings) -> Result<ScanRange> {
    let range = ScanRange {
        start: args.start.unwrap_or(settings.scan_range.start),
        end: args.end.unwrap_or(settings.scan_range.end),
    };
    if range.start > range.end {
        return Err(CliError::InvalidArgument(format!(
            "--start ({}) must not exceed --end ({})",
            range.start, range.end
        )));
    }
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(start: Option<u8>, end: Option<u8>) -> ScanArgs {
        ScanArgs {
            start,
            end,
            add: None,
            name: None,
        }
    }

    #[test]
    fn test_scan_range_overrides_settings() {
        let settings = Settings::default();
        assert_eq!(
            scan_range(&args(None, Some(40)), &settings).unwrap(),
            ScanRange { start: 1, end: 40 }
        );
        assert_eq!(
            scan_range(&args(None, None), &settings).unwrap(),
            ScanRange::default()
        );
    }

    #[test]
    fn test_scan_range_rejects_inverted() {
        assert!(matches!(
            scan_range(&args(Some(20), Some(10)), &Settings::default()),
            Err(CliError::InvalidArgument(_))
        ));
    }
}
