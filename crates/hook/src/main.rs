//! usbredir-hook
//!
//! KubeVirt hook sidecar that attaches a host USB device, selected by a
//! vendor/product annotation on the VMI, to the domain before it starts.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use common::{LogFormat, setup_logging};
use hook::config::HookConfig;
use hook::listener::bind_hook_socket;
use hook::shutdown::{fatal_channel, wait_for_termination};
use hook::usb::{RusbMatcher, list_host_devices};
use hook::{CallbackDispatcher, DomainMutator, HookServer, InfoService};
use protocol::HookVersion;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// How long in-flight calls may take to finish after shutdown is requested
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "usbredir-hook")]
#[command(about = "KubeVirt hook sidecar - pass a host USB device through to a VM")]
#[command(long_about = "
A KubeVirt hook sidecar. When the VMI carries the annotation

    usbredir.vm.kubevirt.io/vendorProduct: \"<vendor-hex>:<product-hex>\"

the first attached host USB device with that vendor and product id is added
to the domain as a USB <hostdev>. Without the annotation, or when no such
device is present, the domain is returned unchanged.

EXAMPLES:
    # Serve the v1alpha2 hook API
    usbredir-hook --version v1alpha2

    # Serve on a custom socket directory with JSON logs
    usbredir-hook --version v1alpha1 --socket-dir /tmp/hooks --log-format json

    # List attached USB devices and exit
    usbredir-hook --list-devices

CONFIGURATION:
    The hook looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/usbredir-hook/hook.toml
    3. /etc/usbredir-hook/hook.toml
    4. Built-in defaults
")]
struct Args {
    /// Hook API version to serve (v1alpha1 or v1alpha2)
    #[arg(long = "version", value_name = "VERSION")]
    hook_version: Option<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory to create the hook socket in
    #[arg(long, value_name = "DIR")]
    socket_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Log format (text, json)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// List USB devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle --save-config flag early (before loading config)
    if args.save_config {
        let config = HookConfig::default();
        let path = HookConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let mut config = if let Some(ref path) = args.config {
        HookConfig::load(Some(path.clone())).context("Failed to load configuration")?
    } else {
        HookConfig::load_or_default()
    };

    // CLI overrides the file
    if let Some(dir) = args.socket_dir {
        config.hook.socket_dir = dir;
    }
    if let Some(level) = args.log_level {
        config.hook.log_level = level;
    }
    if let Some(format) = args.log_format {
        config.hook.log_format = format;
    }
    config.validate().context("Invalid configuration")?;

    setup_logging(&config.hook.log_level, config.hook.log_format)
        .context("Failed to setup logging")?;

    if args.list_devices {
        return list_devices_mode(&config.selection.annotation).await;
    }

    let version: HookVersion = args
        .hook_version
        .as_deref()
        .ok_or_else(|| anyhow!("usage: usbredir-hook --version v1alpha1|v1alpha2"))
        .and_then(|v| v.parse().map_err(anyhow::Error::from))
        .inspect_err(|e| error!("{:#}", e))?;

    run_hook(config, version).await
}

/// List USB devices and exit
async fn list_devices_mode(annotation: &str) -> Result<()> {
    info!("Listing USB devices...");

    let devices = tokio::task::spawn_blocking(list_host_devices)
        .await
        .context("USB enumeration task failed")?
        .context("Failed to enumerate USB devices")?;

    if devices.is_empty() {
        println!("No USB devices found.");
    } else {
        println!("Found {} USB device(s):\n", devices.len());
        for device in devices {
            println!("  {}", device);
        }
        println!("\nAnnotate the VMI with:");
        println!("  {}: \"<vendor>:<product>\"", annotation);
    }

    Ok(())
}

/// Serve the hook until terminated or until a callback reports a fatal error
async fn run_hook(config: HookConfig, version: HookVersion) -> Result<()> {
    info!("usbredir-hook v{} serving hook API {}", env!("CARGO_PKG_VERSION"), version);

    let socket_path = config.socket_path();
    let (listener, _socket_guard) = bind_hook_socket(&socket_path)
        .inspect_err(|e| {
            error!(
                "Failed to initialize socket on path {}: {}",
                socket_path.display(),
                e
            );
            error!(
                "Check whether given directory exists and socket name is not already taken by other file"
            );
        })
        .context("Failed to bind hook socket")?;

    let (fatal_signal, mut fatal_receiver) = fatal_channel();

    let mutator =
        DomainMutator::new(Arc::new(RusbMatcher)).with_annotation(config.selection.annotation.clone());
    let dispatcher = CallbackDispatcher::new(Arc::new(mutator), fatal_signal);
    let info_service = InfoService::new(config.hook.name.clone(), version, config.hook.priority);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = HookServer::new(info_service, dispatcher);
    let mut server = tokio::spawn(server.serve(listener, async move {
        let _ = stop_rx.await;
    }));

    let fatal_reason = tokio::select! {
        _ = wait_for_termination() => {
            info!("Received shutdown signal, shutting down gracefully...");
            None
        }
        Some(reason) = fatal_receiver.wait() => Some(reason),
        result = &mut server => {
            return result
                .context("Hook server task panicked")?
                .context("Hook server failed");
        }
    };

    let _ = stop_tx.send(());
    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(Ok(Ok(()))) => info!("Hook server stopped"),
        Ok(Ok(Err(e))) => error!("Hook server error during shutdown: {}", e),
        Ok(Err(e)) => error!("Hook server task panicked: {}", e),
        Err(_) => warn!("Hook server did not stop within {:?}", SHUTDOWN_GRACE),
    }

    match fatal_reason {
        Some(reason) => Err(anyhow!("Fatal callback error: {}", reason)),
        None => Ok(()),
    }
}
