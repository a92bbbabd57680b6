//! Scripted gesture replay.
//!
//! A replay script drives a list of cards without any input hardware and
//! reports what each step did.  Example:
//!
//! ```toml
//! rows = 2
//!
//! [[gesture]]
//! row = 0
//! samples = [[-20.0, 1.0], [-60.0, 2.0], [-120.0, 2.0]]
//! end = "release"
//!
//! [[gesture]]
//! row = 0
//! tap_action = 1
//! ```
//!
//! Samples are `[dx, dy]` pairs spaced 16 ms apart.  After each step the
//! springs advance by `tick_ms` (default 500) so follow-up taps see the
//! settled layout.

use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use log::debug;
use serde::Deserialize;
use strum::{Display, EnumString, IntoStaticStr};

use crate::card::{CardConfig, CardEvent, SwipeCard};
use crate::classifier::GestureSample;
use crate::config::{CardProfile, SwipecardError};
use crate::list::{RowEvent, SwipeList};
use crate::reveal::RevealState;

const SAMPLE_INTERVAL: Duration = Duration::from_millis(16);
const DEFAULT_TICK_MS: u64 = 500;

/// How a scripted drag ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum GestureEnd {
    #[default]
    Release,
    Cancel,
    /// Leave the gesture open.
    Hold,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawScript {
    rows: Option<usize>,
    gesture: Vec<RawStep>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawStep {
    row: usize,
    samples: Vec<[f64; 2]>,
    end: Option<String>,
    tap: bool,
    tap_action: Option<usize>,
    tick_ms: Option<u64>,
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    Drag {
        samples: Vec<(f64, f64)>,
        end: GestureEnd,
    },
    Tap,
    TapAction(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayStep {
    pub row: usize,
    pub kind: StepKind,
    pub tick: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayScript {
    pub rows: usize,
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn parse(contents: &str, path: &Path) -> Result<Self, SwipecardError> {
        let parse_error = |message: String| SwipecardError::ScriptParseError {
            path: path.to_path_buf(),
            message,
        };

        let raw: RawScript = toml::from_str(contents).map_err(|e| parse_error(e.to_string()))?;
        let rows = raw.rows.unwrap_or(1).max(1);

        let steps = raw
            .gesture
            .into_iter()
            .enumerate()
            .map(|(i, step)| {
                if step.row >= rows {
                    return Err(parse_error(format!(
                        "gesture #{i}: row {} out of range (rows = {rows})",
                        step.row
                    )));
                }
                let kind = match (step.tap_action, step.tap, step.samples.is_empty()) {
                    (Some(index), false, true) => StepKind::TapAction(index),
                    (None, true, true) => StepKind::Tap,
                    (None, false, false) => {
                        let end = match step.end.as_deref() {
                            Some(name) => name.parse::<GestureEnd>().map_err(|_| {
                                parse_error(format!("gesture #{i}: unknown end '{name}'"))
                            })?,
                            None => GestureEnd::default(),
                        };
                        StepKind::Drag {
                            samples: step.samples.iter().map(|[dx, dy]| (*dx, *dy)).collect(),
                            end,
                        }
                    }
                    _ => {
                        return Err(parse_error(format!(
                            "gesture #{i}: needs exactly one of 'samples', 'tap' or 'tap_action'"
                        )));
                    }
                };
                Ok(ReplayStep {
                    row: step.row,
                    kind,
                    tick: Duration::from_millis(step.tick_ms.unwrap_or(DEFAULT_TICK_MS)),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows, steps })
    }

    pub fn from_file(path: &Path) -> Result<Self, SwipecardError> {
        let contents = fs::read_to_string(path).map_err(|e| SwipecardError::ScriptReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&contents, path)
    }
}

/// What one step did.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub index: usize,
    pub row: usize,
    pub events: Vec<RowEvent>,
    pub triggered: Vec<String>,
    pub state: RevealState,
    pub offset: f64,
    pub revealed_row: Option<usize>,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} row {}: {}", self.index, self.row, self.state)?;
        write!(f, " offset {:.1}", self.offset)?;

        let transitions: Vec<String> = self
            .events
            .iter()
            .filter_map(|e| match e.event {
                CardEvent::StateChanged { from, to } => Some(format!("[{}] {from}->{to}", e.slot)),
                _ => None,
            })
            .collect();
        if !transitions.is_empty() {
            write!(f, " | {}", transitions.join(", "))?;
        }

        let haptics: Vec<&'static str> = self
            .events
            .iter()
            .filter_map(|e| match e.event {
                CardEvent::Haptic(kind) => Some(kind.into()),
                _ => None,
            })
            .collect();
        if !haptics.is_empty() {
            write!(f, " | haptics: {}", haptics.join(", "))?;
        }
        if !self.triggered.is_empty() {
            write!(f, " | triggered: {}", self.triggered.join(", "))?;
        }
        match self.revealed_row {
            Some(row) => write!(f, " | open row: {row}"),
            None => write!(f, " | open row: -"),
        }
    }
}

/// Run a script against a fresh list built from `profile`.
pub fn run_script(script: &ReplayScript, profile: &CardProfile) -> Vec<StepReport> {
    let fired: Rc<RefCell<Vec<String>>> = Rc::default();

    let mut list = SwipeList::new();
    for row in 0..script.rows {
        let config = CardConfig::from_profile(profile, |_, action| {
            let fired = Rc::clone(&fired);
            let name = action.label.clone().unwrap_or_else(|| action.icon.clone());
            Box::new(move || fired.borrow_mut().push(format!("{name}@{row}"))) as Box<dyn Fn()>
        });
        list.push(row, SwipeCard::new(config));
    }

    let mut reports = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        let events = run_step(&mut list, step);
        list.tick(step.tick);

        let card = list.card(step.row);
        let report = StepReport {
            index,
            row: step.row,
            events,
            triggered: fired.borrow_mut().drain(..).collect(),
            state: card.map_or(RevealState::Resting, SwipeCard::state),
            offset: card.map_or(0.0, SwipeCard::visual_offset),
            revealed_row: list.revealed(),
        };
        debug!("{report}");
        reports.push(report);
    }
    reports
}

fn run_step(list: &mut SwipeList<usize>, step: &ReplayStep) -> Vec<RowEvent> {
    match &step.kind {
        StepKind::Drag { samples, end } => {
            let mut events = Vec::new();
            for (i, &(dx, dy)) in samples.iter().enumerate() {
                let sample = GestureSample::new(dx, dy, SAMPLE_INTERVAL * i as u32);
                events.extend(list.on_sample(step.row, sample));
            }
            match end {
                GestureEnd::Release => events.extend(list.on_release(step.row)),
                GestureEnd::Cancel => events.extend(list.on_cancel(step.row)),
                GestureEnd::Hold => {}
            }
            events
        }
        StepKind::Tap => list.tap(step.row),
        StepKind::TapAction(index) => list.tap_action(step.row, *index),
    }
}
