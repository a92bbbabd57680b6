//! Multi-device swipe manager and device discovery (I/O layer).
//!
//! Pure input translation lives in [`crate::touch`]; the gesture engine in
//! [`crate::card`] and [`crate::list`].
use std::io;
use std::process::{Command, ExitCode, ExitStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use evdev::{AbsoluteAxisType, Device};
use log::{debug, error, info, warn};

use crate::card::{CardConfig, CardEvent, SwipeCard};
use crate::config::{AppConfig, DeviceConfig, HapticsConfig, SwipecardError, parse_config_file};
use crate::haptics::HapticKind;
use crate::list::{RowEvent, SwipeList};
use crate::touch::{Surface, TouchTracker, classify_event, parse_usb_id, process_touch_events};

// -- SwipeManager (top-level orchestrator) --------------------

/// Runs one swipe list per configured touch device.
pub struct SwipeManager {
    config: AppConfig,
    running: Arc<AtomicBool>,
}

impl SwipeManager {
    pub fn new(config_path: impl AsRef<std::path::Path>) -> Result<Self, SwipecardError> {
        Ok(Self {
            config: parse_config_file(config_path.as_ref())?,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Start listening to all configured devices.
    pub fn start(&mut self) {
        if self.config.devices.is_empty() {
            error!("No devices configured");
            return;
        }

        self.running.store(true, Ordering::Relaxed);
        info!("Starting swipe manager");

        let mut handles = Vec::new();

        for (device_id, device_config) in &self.config.devices {
            if let Some(device) = find_device(device_id, device_config) {
                let id = device_id.clone();
                let config = device_config.clone();
                let haptics = self.config.haptics.clone();
                let running = Arc::clone(&self.running);

                let spawned = thread::Builder::new()
                    .name(format!("swipe-{device_id}"))
                    .spawn(move || {
                        run_device_loop(&id, device, &config, &haptics, &running);
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => error!("Failed to spawn thread for {device_id}: {e}"),
                }
            } else {
                warn!("Device not found: {device_id}");
            }
        }

        if handles.is_empty() {
            error!("No devices found, exiting");
            return;
        }

        for handle in handles {
            let _ = handle.join();
        }
    }

    /// Stop listening to devices.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        info!("Swipe manager stopped");
    }

    /// Get a reference to the running flag for signal handling.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }
}

// -- Device I/O -----------------------------------------------

/// Check if a device has multi-touch capabilities.
fn is_touch_device(device: &Device) -> bool {
    let Some(abs_axes) = device.supported_absolute_axes() else {
        return false;
    };
    abs_axes.contains(AbsoluteAxisType::ABS_MT_POSITION_X)
        && abs_axes.contains(AbsoluteAxisType::ABS_MT_POSITION_Y)
}

/// Find a touchscreen device by USB vendor:product ID.
fn find_device(device_id: &str, config: &DeviceConfig) -> Option<Device> {
    let Some((vendor, product)) = parse_usb_id(&config.device_usb_id) else {
        warn!(
            "Device {device_id}: invalid USB ID format '{}' (expected vendor:product)",
            config.device_usb_id
        );
        return None;
    };

    for (path, device) in evdev::enumerate() {
        if !is_touch_device(&device) {
            continue;
        }
        let id = device.input_id();
        if id.vendor() == vendor && id.product() == product {
            info!(
                "Found device for {} by USB ID {}: {} ({})",
                device_id,
                config.device_usb_id,
                device.name().unwrap_or("unknown"),
                path.display()
            );
            return Some(device);
        }
    }

    warn!(
        "Device {}: no touch device with USB ID {} found",
        device_id, config.device_usb_id
    );
    None
}

/// Build the row list for a device.  Action callbacks run the configured
/// shell command with the row number in `SWIPECARD_ROW`.
fn build_list(device_id: &str, config: &DeviceConfig) -> SwipeList<usize> {
    let mut list = SwipeList::new();
    for row in 0..config.rows {
        let card_config = CardConfig::from_profile(&config.profile, |_, action| {
            let device_id = device_id.to_string();
            let name = action.label.clone().unwrap_or_else(|| action.icon.clone());
            let command = action.command.clone();
            Box::new(move || match &command {
                Some(cmd) => {
                    let env = [
                        ("SWIPECARD_ROW", row.to_string()),
                        ("SWIPECARD_ACTION", name.clone()),
                    ];
                    run_shell(cmd, &env);
                    info!("{device_id}: row {row} {name}");
                }
                None => info!("{device_id}: row {row} {name} (no command)"),
            }) as Box<dyn Fn()>
        });
        list.push(row, SwipeCard::new(card_config));
    }
    list
}

/// Initialize the tracker from device axis info and start the event loop.
fn run_device_loop(
    device_id: &str,
    mut device: Device,
    config: &DeviceConfig,
    haptics: &HapticsConfig,
    running: &Arc<AtomicBool>,
) {
    let abs = match device.get_abs_state() {
        Ok(state) => state,
        Err(e) => {
            error!("Device {device_id} failed to get abs state: {e}");
            return;
        }
    };

    let x = &abs[AbsoluteAxisType::ABS_MT_POSITION_X.0 as usize];
    let y = &abs[AbsoluteAxisType::ABS_MT_POSITION_Y.0 as usize];

    info!(
        "Started processing device: {device_id} (USB {})",
        config.device_usb_id
    );
    debug!(
        "  X range: {}..{}, Y range: {}..{}, {} rows",
        x.minimum, x.maximum, y.minimum, y.maximum, config.rows
    );

    let surface = Surface {
        x_range: (x.minimum as f64, x.maximum as f64),
        y_range: (y.minimum as f64, y.maximum as f64),
        points_per_unit: config.points_per_unit,
        row_height: config.profile.geometry.card_height,
        rows: config.rows,
    };
    let mut tracker = TouchTracker::new(surface, config.profile.thresholds.tap_distance_max);
    let mut list = build_list(device_id, config);

    event_loop(device_id, &mut device, &mut tracker, &mut list, config, haptics, running);
}

/// Blocking event loop - reads from the device and drives the list.
fn event_loop(
    device_id: &str,
    device: &mut Device,
    tracker: &mut TouchTracker,
    list: &mut SwipeList<usize>,
    config: &DeviceConfig,
    haptics: &HapticsConfig,
    running: &Arc<AtomicBool>,
) {
    let mut last_tick = Instant::now();
    while running.load(Ordering::Relaxed) {
        match device.fetch_events().map(|iter| iter.collect::<Vec<_>>()) {
            Ok(events) => {
                // Springs only matter for hit-testing here, so advance them
                // lazily by the time since the previous batch.
                let now = Instant::now();
                list.tick(now.duration_since(last_tick));
                last_tick = now;

                for event in &events {
                    if !running.load(Ordering::Relaxed) {
                        break;
                    }
                    if let Some(te) = classify_event(event) {
                        for row_event in process_touch_events(tracker, list, &[te]) {
                            handle_row_event(device_id, row_event, haptics);
                        }
                    }
                }
            }
            Err(e) => {
                if running.load(Ordering::Relaxed) {
                    warn!("Device {device_id} disconnected: {e}");
                    // A vanished finger ends the gesture like a release.
                    if let Some(slot) = tracker.active_slot() {
                        for row_event in list.on_cancel(slot) {
                            handle_row_event(device_id, row_event, haptics);
                        }
                    }
                    tracker.reset();
                    attempt_reconnect(device_id, device, tracker, list, config, haptics, running);
                }
                break;
            }
        }
    }
}

/// Forward side-channel output of the engine.
fn handle_row_event(device_id: &str, row_event: RowEvent, haptics: &HapticsConfig) {
    match row_event.event {
        CardEvent::Haptic(kind) => fire_haptic(kind, haptics),
        CardEvent::StateChanged { from, to } => {
            debug!("{device_id}: row {} {from} -> {to}", row_event.slot);
        }
        CardEvent::ActionTriggered { index } => {
            debug!("{device_id}: row {} action {index} done", row_event.slot);
        }
    }
}

/// Run the haptics command for `kind`, if one is configured.
fn fire_haptic(kind: HapticKind, haptics: &HapticsConfig) {
    match haptics.command_for(kind) {
        Some(cmd) => run_shell(cmd, &[("SWIPECARD_HAPTIC", kind.to_string())]),
        None => debug!("Haptic {kind}"),
    }
}

/// Run `cmd` through `sh -c` with extra environment variables.  The child is
/// reaped on a separate thread, whose handle yields the exit status.
pub fn spawn_shell(
    cmd: &str,
    env: &[(&str, String)],
) -> io::Result<thread::JoinHandle<Option<ExitStatus>>> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .envs(env.iter().map(|(key, value)| (*key, value.as_str())))
        .spawn()?;
    debug!("Spawned: {cmd}");

    let cmd = cmd.to_string();
    thread::Builder::new()
        .name("swipe-reaper".to_string())
        .spawn(move || match child.wait() {
            Ok(status) => {
                if !status.success() {
                    debug!("'{cmd}' exited with {status}");
                }
                Some(status)
            }
            Err(e) => {
                warn!("Failed to wait for '{cmd}': {e}");
                None
            }
        })
}

fn run_shell(cmd: &str, env: &[(&str, String)]) {
    if let Err(e) = spawn_shell(cmd, env) {
        error!("Failed to execute '{cmd}': {e}");
    }
}

/// Attempt to reconnect to a device after it disconnects.
fn attempt_reconnect(
    device_id: &str,
    device: &mut Device,
    tracker: &mut TouchTracker,
    list: &mut SwipeList<usize>,
    config: &DeviceConfig,
    haptics: &HapticsConfig,
    running: &Arc<AtomicBool>,
) {
    const MAX_RETRIES: usize = 10;
    const RETRY_INTERVAL: Duration = Duration::from_secs(5);

    for attempt in 1..=MAX_RETRIES {
        if !running.load(Ordering::Relaxed) {
            return;
        }
        info!("Reconnect attempt {attempt}/{MAX_RETRIES} for {device_id}...");
        thread::sleep(RETRY_INTERVAL);

        if let Some(new_device) = find_device(device_id, config) {
            info!("Reconnected to {device_id}");
            *device = new_device;
            event_loop(device_id, device, tracker, list, config, haptics, running);
            return;
        }
    }
    error!("Failed to reconnect to {device_id} after {MAX_RETRIES} attempts");
}

/// List all multi-touch capable devices.
pub fn list_touch_devices() -> ExitCode {
    println!("\n=== swipecard: Available Touchscreen Devices ===\n");
    let mut touch_count = 0;

    for (path, device) in evdev::enumerate() {
        if !is_touch_device(&device) {
            continue;
        }

        touch_count += 1;
        println!(
            "Device {touch_count}:\n\
             \x20 Path:      {}\n\
             \x20 Name:      {}\n\
             \x20 USB ID:    {:04x}:{:04x}\n\
             \x20 Phys:      {}\n",
            path.display(),
            device.name().unwrap_or("unknown"),
            device.input_id().vendor(),
            device.input_id().product(),
            device.physical_path().unwrap_or("N/A"),
        );
    }

    if touch_count == 0 {
        println!(
            "No multi-touch devices found.\n\n\
             Troubleshooting:\n\
             \x20 - Check if touchscreen is connected\n\
             \x20 - Run 'libinput list-devices' to see all devices\n\
             \x20 - Run as root if devices are not visible"
        );
        return ExitCode::FAILURE;
    }

    println!(
        "Found {touch_count} touch device(s).\n\n\
         Add the USB ID to your swipecard.toml:\n\
         \x20 [device.<name>]\n\
         \x20 device_usb_id = \"<USB ID>\"\n\
         \x20 enabled = true"
    );
    ExitCode::SUCCESS
}
