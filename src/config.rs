//! Configuration data structures and TOML parsing.
//!
//! The config file uses TOML format.  Every threshold and layout value is
//! optional; device sections override the global ones field by field.
//! Example:
//!
//! ```toml
//! [global]
//! log_level = "info"
//!
//! [global.thresholds]
//! reveal_threshold = -80.0
//! full_swipe_threshold = -250.0
//! dead_zone = 15.0
//! axis_ratio = 1.5
//! overscroll = 50.0
//! tap_distance_max = 10.0
//!
//! [global.card]
//! card_height = 100.0
//! button_size = 90.0
//! enable_full_swipe = true
//!
//! [global.haptics]
//! enabled = true
//! heavy = "fbcli --pattern heavy"
//!
//! [[global.actions]]
//! preset = "favorite"
//! command = "echo favorite $SWIPECARD_ROW"
//!
//! [[global.actions]]
//! preset = "delete"
//! command = "echo delete $SWIPECARD_ROW"
//!
//! [device.kiosk]
//! device_usb_id = "1234:5678"
//! enabled = true
//! rows = 6
//!
//! [device.kiosk.thresholds]
//! dead_zone = 25.0
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::action::ActionPreset;
use crate::geometry::CardGeometry;
use crate::haptics::HapticKind;
use crate::offset::MAX_OVERSCROLL;

const GLOBAL_SECTION: &str = "global";
const DEFAULT_ROWS: usize = 5;

/// Top-level error type used throughout the crate.
#[derive(Debug, Error)]
pub enum SwipecardError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    #[error("Invalid thresholds for '{section}': {reason}")]
    InvalidThresholds { section: String, reason: String },

    #[error("Invalid card layout for '{section}': {reason}")]
    InvalidCard { section: String, reason: String },

    #[error("Invalid action #{index} for '{section}': {reason}")]
    InvalidAction {
        section: String,
        index: usize,
        reason: String,
    },

    #[error("Failed to read replay script {path}: {source}")]
    ScriptReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse replay script {path}: {message}")]
    ScriptParseError { path: PathBuf, message: String },
}

/// Root of the TOML config file.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    global: RawGlobal,
    #[serde(default)]
    device: HashMap<String, RawDevice>,
}

/// The `[global]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawGlobal {
    log_level: Option<String>,
    log_file: Option<String>,
    #[serde(default)]
    thresholds: RawThresholds,
    #[serde(default)]
    card: RawCard,
    #[serde(default)]
    haptics: RawHaptics,
    #[serde(default)]
    actions: Vec<RawAction>,
}

/// Threshold values - all optional so device sections can partially override.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
struct RawThresholds {
    reveal_threshold: Option<f64>,
    full_swipe_threshold: Option<f64>,
    dead_zone: Option<f64>,
    axis_ratio: Option<f64>,
    overscroll: Option<f64>,
    tap_distance_max: Option<f64>,
}

/// Geometry values of `[*.card]`.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
struct RawGeometry {
    card_height: Option<f64>,
    button_size: Option<f64>,
    spacing: Option<f64>,
    edge_padding: Option<f64>,
}

/// A `[*.card]` section.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
struct RawCard {
    #[serde(flatten)]
    geometry: RawGeometry,
    enable_full_swipe: Option<bool>,
}

/// The `[global.haptics]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawHaptics {
    enabled: Option<bool>,
    light: Option<String>,
    medium: Option<String>,
    heavy: Option<String>,
    success: Option<String>,
}

/// One `[[*.actions]]` entry.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
struct RawAction {
    preset: Option<String>,
    icon: Option<String>,
    label: Option<String>,
    color: Option<String>,
    command: Option<String>,
}

/// A `[device.<id>]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawDevice {
    device_usb_id: Option<String>,
    enabled: Option<bool>,
    rows: Option<usize>,
    points_per_unit: Option<f64>,
    #[serde(default)]
    thresholds: RawThresholds,
    #[serde(default)]
    card: RawCard,
    actions: Option<Vec<RawAction>>,
}

/// Validated gesture thresholds, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeThresholds {
    /// Release past this (negative) offset reveals the actions.
    pub reveal_threshold: f64,
    /// Release past this (negative) offset triggers the last action.
    pub full_swipe_threshold: f64,
    /// Minimum horizontal travel before a drag counts as a swipe.
    pub dead_zone: f64,
    /// Required ratio of horizontal to vertical travel.
    pub axis_ratio: f64,
    /// Rubber-band slack beyond the reveal width.
    pub overscroll: f64,
    /// Maximum travel of a touch that still counts as a tap.
    pub tap_distance_max: f64,
}

impl Default for SwipeThresholds {
    fn default() -> Self {
        Self {
            reveal_threshold: -80.0,
            full_swipe_threshold: -250.0,
            dead_zone: 15.0,
            axis_ratio: 1.5,
            overscroll: 50.0,
            tap_distance_max: 10.0,
        }
    }
}

impl SwipeThresholds {
    fn validate(&self) -> Result<(), String> {
        let all = [
            self.reveal_threshold,
            self.full_swipe_threshold,
            self.dead_zone,
            self.axis_ratio,
            self.overscroll,
            self.tap_distance_max,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err("values must be finite".to_string());
        }
        if self.reveal_threshold >= 0.0 {
            return Err(format!(
                "reveal_threshold must be negative (got {})",
                self.reveal_threshold
            ));
        }
        if self.full_swipe_threshold >= self.reveal_threshold {
            return Err(format!(
                "full_swipe_threshold ({}) must be below reveal_threshold ({})",
                self.full_swipe_threshold, self.reveal_threshold
            ));
        }
        if !(0.0..=MAX_OVERSCROLL).contains(&self.overscroll) {
            return Err(format!(
                "overscroll must be within 0..={MAX_OVERSCROLL} (got {})",
                self.overscroll
            ));
        }
        if self.dead_zone < 0.0 || self.tap_distance_max < 0.0 {
            return Err("dead_zone and tap_distance_max must not be negative".to_string());
        }
        if self.axis_ratio <= 0.0 {
            return Err(format!("axis_ratio must be positive (got {})", self.axis_ratio));
        }
        Ok(())
    }
}

fn validate_geometry(geometry: &CardGeometry) -> Result<(), String> {
    let CardGeometry {
        card_height,
        button_size,
        spacing,
        edge_padding,
    } = *geometry;
    if [card_height, button_size, spacing, edge_padding]
        .iter()
        .any(|v| !v.is_finite() || *v < 0.0)
    {
        return Err("sizes must be finite and not negative".to_string());
    }
    if card_height == 0.0 {
        return Err("card_height must be positive".to_string());
    }
    Ok(())
}

/// One action as configured: presentation plus the shell command it runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionConfig {
    pub icon: String,
    pub label: Option<String>,
    pub color: String,
    pub command: Option<String>,
}

impl RawAction {
    fn into_validated(self) -> Result<ActionConfig, String> {
        let preset = match self.preset.as_deref() {
            Some(name) => Some(
                name.parse::<ActionPreset>()
                    .map_err(|_| format!("unknown preset '{name}'"))?,
            ),
            None => None,
        };

        let icon = match (self.icon, preset) {
            (Some(icon), _) if !icon.is_empty() => icon,
            (_, Some(p)) => p.icon().to_string(),
            _ => return Err("either 'preset' or 'icon' is required".to_string()),
        };

        Ok(ActionConfig {
            icon,
            label: self.label.or_else(|| preset.map(|p| p.label().to_string())),
            color: self
                .color
                .or_else(|| preset.map(|p| p.color().to_string()))
                .unwrap_or_else(|| "accent".to_string()),
            command: self.command.filter(|c| !c.is_empty()),
        })
    }
}

/// Everything needed to build the cards of one list.
#[derive(Debug, Clone, Default)]
pub struct CardProfile {
    pub thresholds: SwipeThresholds,
    pub geometry: CardGeometry,
    pub enable_full_swipe: bool,
    pub actions: Vec<ActionConfig>,
}

/// Haptics service settings.
#[derive(Debug, Clone)]
pub struct HapticsConfig {
    pub enabled: bool,
    pub commands: HashMap<HapticKind, String>,
}

impl HapticsConfig {
    /// Command to run for `kind`, or `None` when haptics are off or unset.
    pub fn command_for(&self, kind: HapticKind) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.commands.get(&kind).map(String::as_str)
    }
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            commands: HashMap::new(),
        }
    }
}

/// Configuration for a single touch device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub device_usb_id: String,
    pub rows: usize,
    pub points_per_unit: f64,
    pub profile: CardProfile,
}

/// Top-level parsed configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub log_level: String,
    pub log_file: Option<String>,
    pub haptics: HapticsConfig,
    /// Global profile, used directly by replays.
    pub global: CardProfile,
    pub devices: HashMap<String, DeviceConfig>,
}

/// Generate fallback merging and default resolution for layered sections.
macro_rules! layered_fields {
    ($raw:ident => $validated:ident { $($field:ident),+ $(,)? }) => {
        impl $raw {
            fn merge_with_fallback(&self, fallback: &$raw) -> $raw {
                $raw {
                    $($field: self.$field.or(fallback.$field),)+
                }
            }

            fn resolve(&self, defaults: &$validated) -> $validated {
                $validated {
                    $($field: self.$field.unwrap_or(defaults.$field),)+
                }
            }
        }
    };
}

layered_fields!(RawThresholds => SwipeThresholds {
    reveal_threshold,
    full_swipe_threshold,
    dead_zone,
    axis_ratio,
    overscroll,
    tap_distance_max,
});

layered_fields!(RawGeometry => CardGeometry {
    card_height,
    button_size,
    spacing,
    edge_padding,
});

/// Resolve one layered profile and validate it.
fn build_profile(
    section: &str,
    thresholds: &RawThresholds,
    card: &RawCard,
    actions: &[RawAction],
) -> Result<CardProfile, SwipecardError> {
    let thresholds = thresholds.resolve(&SwipeThresholds::default());
    thresholds
        .validate()
        .map_err(|reason| SwipecardError::InvalidThresholds {
            section: section.to_string(),
            reason,
        })?;

    let geometry = card.geometry.resolve(&CardGeometry::default());
    validate_geometry(&geometry).map_err(|reason| SwipecardError::InvalidCard {
        section: section.to_string(),
        reason,
    })?;

    let actions = actions
        .iter()
        .cloned()
        .enumerate()
        .map(|(index, raw)| {
            raw.into_validated()
                .map_err(|reason| SwipecardError::InvalidAction {
                    section: section.to_string(),
                    index,
                    reason,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let profile = CardProfile {
        thresholds,
        geometry,
        enable_full_swipe: card.enable_full_swipe.unwrap_or(false),
        actions,
    };
    warn_if_full_swipe_unreachable(section, &profile);
    Ok(profile)
}

/// The offset never goes past `-(width + overscroll)`, so a narrow tray can
/// make the full-swipe threshold unreachable.
fn warn_if_full_swipe_unreachable(section: &str, profile: &CardProfile) {
    if !profile.enable_full_swipe || profile.actions.is_empty() {
        return;
    }
    let reach = profile.geometry.total_reveal_width(profile.actions.len())
        + profile.thresholds.overscroll;
    if reach <= profile.thresholds.full_swipe_threshold.abs() {
        warn!(
            "'{section}': full swipe is enabled but the card only travels {reach} points \
             (threshold {}); widen the buttons or lower full_swipe_threshold.",
            profile.thresholds.full_swipe_threshold
        );
    }
}

fn build_haptics(raw: &RawHaptics) -> HapticsConfig {
    let commands = [
        (HapticKind::Light, &raw.light),
        (HapticKind::Medium, &raw.medium),
        (HapticKind::Heavy, &raw.heavy),
        (HapticKind::Success, &raw.success),
    ]
    .into_iter()
    .filter_map(|(kind, cmd)| {
        cmd.as_deref()
            .filter(|c| !c.is_empty())
            .map(|c| (kind, c.to_string()))
    })
    .collect();

    HapticsConfig {
        enabled: raw.enabled.unwrap_or(true),
        commands,
    }
}

/// Parse a TOML config file and return the fully resolved `AppConfig`.
pub fn parse_config_file(path: &Path) -> Result<AppConfig, SwipecardError> {
    let contents = fs::read_to_string(path).map_err(|e| SwipecardError::ConfigReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config_str(&contents, path)
}

/// Parse config text; `path` is only used in error messages.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<AppConfig, SwipecardError> {
    let raw: RawConfig =
        toml::from_str(contents).map_err(|e| SwipecardError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let global = build_profile(
        GLOBAL_SECTION,
        &raw.global.thresholds,
        &raw.global.card,
        &raw.global.actions,
    )?;

    let mut devices = HashMap::new();

    for (device_id, raw_dev) in &raw.device {
        if !raw_dev.enabled.unwrap_or(false) {
            debug!("Device '{device_id}' is not enabled – skipping.");
            continue;
        }

        let Some(usb_id) = raw_dev.device_usb_id.as_deref().filter(|s| !s.is_empty()) else {
            warn!(
                "Device '{device_id}' is enabled but has no device_usb_id – skipping. \
                 Run 'swipecard --list-devices' to find your USB ID.",
            );
            continue;
        };

        let card = RawCard {
            geometry: raw_dev.card.geometry.merge_with_fallback(&raw.global.card.geometry),
            enable_full_swipe: raw_dev
                .card
                .enable_full_swipe
                .or(raw.global.card.enable_full_swipe),
        };
        let actions = raw_dev.actions.as_deref().unwrap_or(&raw.global.actions);
        let profile = build_profile(
            device_id,
            &raw_dev.thresholds.merge_with_fallback(&raw.global.thresholds),
            &card,
            actions,
        )?;

        let points_per_unit = raw_dev
            .points_per_unit
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or(1.0);

        devices.insert(
            device_id.clone(),
            DeviceConfig {
                device_usb_id: usb_id.to_string(),
                rows: raw_dev.rows.unwrap_or(DEFAULT_ROWS).max(1),
                points_per_unit,
                profile,
            },
        );
    }

    Ok(AppConfig {
        log_level: raw.global.log_level.unwrap_or_else(|| "info".to_string()),
        log_file: raw.global.log_file,
        haptics: build_haptics(&raw.global.haptics),
        global,
        devices,
    })
}
