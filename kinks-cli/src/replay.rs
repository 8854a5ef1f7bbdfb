//! Real-time replay of a scripted editing session through the debounced [`Controller`].
//!
//! Steps are fed from a separate task on their own schedule, so the controller sees the same
//! interleaving of events and timer wakeups an interactive editor would produce.

use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::mpsc,
    time::{self, Instant},
};

use kinks_core::{Controller, Feature, Host, HostEvent, Instruction, Recorder, Status, ValidatorConfig};

/// A scripted editing session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Feature selected before the first step.
    #[serde(default)]
    pub selected: Option<Feature>,
    /// Schedule the initial pass, as when attaching to an editor with a live selection.
    #[serde(default)]
    pub start: bool,
    pub steps: Vec<SessionStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStep {
    /// Milliseconds after the session starts.
    pub at_ms: u64,
    pub event: HostEvent,
    /// New selected feature, applied before the event is delivered.
    #[serde(default)]
    pub feature: Option<Feature>,
    /// Drop the selection before the event is delivered.
    #[serde(default)]
    pub deselect: bool,
}

/// One renderer instruction, stamped with when it was issued.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub at_ms: u64,
    /// Passes run so far.
    pub pass: usize,
    #[serde(flatten)]
    pub instruction: Instruction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub passes: usize,
    pub status: Status,
}

#[derive(Debug, Default)]
struct SessionHost {
    selected: Option<Feature>,
}

impl Host for SessionHost {
    type Feature = Feature;

    fn current_selected_area_feature(&self) -> Option<Feature> {
        self.selected.clone()
    }
}

/// Run `session` to completion, calling `emit` for each instruction the controller issues.
/// Returns once every step has been delivered and no pass is pending.
pub async fn replay(session: Session, config: ValidatorConfig, mut emit: impl FnMut(&Record)) -> Summary {
    let Session { selected, start, mut steps } = session;
    steps.sort_by_key(|step| step.at_ms);

    let origin = Instant::now();
    let elapsed = || origin.elapsed();
    let host = SessionHost { selected };
    let mut controller = Controller::new(host, Recorder::new(), config);
    if start {
        controller.start(Duration::ZERO);
    }

    let (tx, mut rx) = mpsc::channel::<SessionStep>(16);
    let feeder = tokio::spawn(async move {
        for step in steps {
            time::sleep_until(origin + Duration::from_millis(step.at_ms)).await;
            if tx.send(step).await.is_err() {
                break;
            }
        }
    });

    let mut open = true;
    loop {
        let deadline = controller.next_deadline();
        if !open && deadline.is_none() {
            break;
        }
        let wake = origin + deadline.map(|d| d.at).unwrap_or_default();

        tokio::select! {
            step = rx.recv(), if open => match step {
                Some(step) => {
                    let host = controller.host_mut();
                    if let Some(feature) = step.feature {
                        host.selected = Some(feature);
                    }
                    if step.deselect {
                        host.selected = None;
                    }
                    controller.handle(step.event, elapsed());
                }
                None => {
                    debug!("replay: all steps delivered");
                    open = false;
                }
            },
            _ = time::sleep_until(wake), if deadline.is_some() => {
                controller.poll(elapsed());
            }
        }

        let at_ms = elapsed().as_millis() as u64;
        let pass = controller.passes();
        for instruction in controller.sink_mut().take() {
            emit(&Record { at_ms, pass, instruction });
        }
    }

    if let Err(e) = feeder.await {
        warn!("replay: step feeder failed: {}", e);
    }

    Summary { passes: controller.passes(), status: controller.status() }
}
