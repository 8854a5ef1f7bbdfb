use std::{mem, time::Duration};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::{
    adapter::{extract_polygon, HostFeature},
    config::ValidatorConfig,
    error::AdapterError,
    polygon::Kink,
    r2::R2,
};

use super::{
    sink::NotificationSink,
    timer::{Deadline, DebounceTimer, TimerToken},
};

/// Payload-free notifications from the host editor. The controller always re-reads the
/// selection itself rather than trusting anything attached to the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase")]
pub enum HostEvent {
    SelectionChanged,
    /// An edit was performed or undone.
    EditCommitted,
    /// The host's edit history was wiped.
    ActionsCleared,
}

/// Read access to the host editor's current selection.
pub trait Host {
    type Feature: HostFeature;

    /// The selected feature, if any. Called once per pass, never cached.
    fn current_selected_area_feature(&self) -> Option<Self::Feature>;
}

/// Outcome of the most recent pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Tsify)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ValidationState {
    /// Nothing analysable is selected.
    #[default]
    Idle,
    Valid,
    Invalid { kinks: Vec<Kink> },
}

impl ValidationState {
    pub fn kinks(&self) -> &[Kink] {
        match self {
            ValidationState::Invalid { kinks } => kinks,
            _ => &[],
        }
    }
}

/// [`ValidationState`] plus the transient `Pending` phase (a pass is armed but hasn't run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Status {
    Idle,
    Pending,
    Valid,
    Invalid { count: usize },
}

/// Re-validates the host's selected area feature after bursts of host events settle, and
/// keeps a [`NotificationSink`] in step with the result.
///
/// Sans-IO: every method that depends on time takes `now` (any monotonic clock, measured from
/// an origin of the driver's choosing), and the driver is responsible for calling
/// [`poll`](Controller::poll) (or [`fire`](Controller::fire)) once the returned deadline
/// passes. Passes run synchronously, to completion, one at a time.
pub struct Controller<H, S> {
    host: H,
    sink: S,
    config: ValidatorConfig,
    state: ValidationState,
    timer: DebounceTimer,
    passes: usize,
}

impl<H: Host, S: NotificationSink> Controller<H, S> {
    pub fn new(host: H, sink: S, config: ValidatorConfig) -> Self {
        Controller {
            host,
            sink,
            config,
            state: ValidationState::Idle,
            timer: DebounceTimer::new(),
            passes: 0,
        }
    }

    /// Schedule the first pass, for a feature that was already selected when the controller
    /// attached to the host.
    pub fn start(&mut self, now: Duration) -> Deadline {
        let deadline = self.timer.arm(now, self.config.initial_delay());
        debug!("start: first pass due at {:?}", deadline.at);
        deadline
    }

    /// React to a host event. Returns the new deadline when the event (re)arms the timer.
    pub fn handle(&mut self, event: HostEvent, now: Duration) -> Option<Deadline> {
        match self.config.debounce_delay(event) {
            Some(delay) => {
                let deadline = self.timer.arm(now, delay);
                debug!("{:?} at {:?}: pass due at {:?}", event, now, deadline.at);
                Some(deadline)
            }
            None => {
                if let Some(deadline) = self.timer.cancel() {
                    debug!("{:?}: cancelled pass due at {:?}", event, deadline.at);
                }
                self.set_state(ValidationState::Idle);
                self.sink.clear();
                None
            }
        }
    }

    /// Run the pending pass if its deadline has passed. Returns whether a pass ran.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.timer.take_due(now) {
            Some(_) => {
                self.run_pass();
                true
            }
            None => false,
        }
    }

    /// Run the pending pass if `token` is still the current one. For drivers that schedule a
    /// callback per deadline instead of polling.
    pub fn fire(&mut self, token: TimerToken) -> bool {
        match self.timer.take_token(token) {
            Some(_) => {
                self.run_pass();
                true
            }
            None => {
                debug!("fire: {:?} was superseded", token);
                false
            }
        }
    }

    /// Run a pass right away, dropping any pending one.
    pub fn validate_now(&mut self) -> &ValidationState {
        self.timer.cancel();
        self.run_pass();
        &self.state
    }

    fn run_pass(&mut self) {
        self.passes += 1;
        let state = match self.evaluate() {
            Ok(kinks) if kinks.is_empty() => ValidationState::Valid,
            Ok(kinks) => ValidationState::Invalid { kinks },
            Err(e) => {
                debug!("pass {}: {}", self.passes, e);
                ValidationState::Idle
            }
        };
        match &state {
            ValidationState::Invalid { kinks } => {
                let points: Vec<R2<f64>> = kinks.iter().map(|k| k.p).collect();
                self.sink.show_invalid(kinks.len(), &points);
            }
            _ => self.sink.clear(),
        }
        self.set_state(state);
    }

    fn evaluate(&self) -> Result<Vec<Kink>, AdapterError> {
        let feature = self
            .host
            .current_selected_area_feature()
            .ok_or(AdapterError::NoSelection)?;
        let polygon = extract_polygon(&feature)?;
        Ok(polygon.kinks_with(&self.config.detector))
    }

    fn set_state(&mut self, state: ValidationState) {
        let prev = mem::replace(&mut self.state, state);
        if mem::discriminant(&prev) != mem::discriminant(&self.state) {
            info!("{:?} -> {:?}", Status::from(&prev), Status::from(&self.state));
        }
    }

    pub fn state(&self) -> &ValidationState {
        &self.state
    }

    pub fn status(&self) -> Status {
        if self.timer.is_armed() {
            Status::Pending
        } else {
            Status::from(&self.state)
        }
    }

    pub fn next_deadline(&self) -> Option<Deadline> {
        self.timer.deadline()
    }

    /// Time left until the pending pass is due; zero once it is overdue, `None` when nothing
    /// is pending. Drivers whose wakeups can run early use this to wait again.
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        self.timer.deadline().map(|d| d.at.saturating_sub(now))
    }

    /// Number of passes run so far.
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

impl From<&ValidationState> for Status {
    fn from(state: &ValidationState) -> Self {
        match state {
            ValidationState::Idle => Status::Idle,
            ValidationState::Valid => Status::Valid,
            ValidationState::Invalid { kinks } => Status::Invalid { count: kinks.len() },
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::{
        adapter::{Feature, FeatureKind, NestedGeometry},
        r2::r2,
        validation::{Instruction, Recorder},
    };

    #[derive(Default)]
    struct Editor {
        selected: Option<Feature>,
    }

    impl Host for Editor {
        type Feature = Feature;
        fn current_selected_area_feature(&self) -> Option<Feature> {
            self.selected.clone()
        }
    }

    type TestController = Controller<Editor, Recorder>;

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    fn controller(selected: Option<Feature>) -> TestController {
        Controller::new(Editor { selected }, Recorder::new(), ValidatorConfig::default())
    }

    fn square() -> Feature {
        Feature::polygon(vec![r2(0., 0.), r2(4., 0.), r2(4., 4.), r2(0., 4.), r2(0., 0.)])
    }

    /// `square` with its third vertex dragged across the left edge; crosses once at (0, 4/3).
    fn dragged_square() -> Feature {
        Feature::polygon(vec![r2(0., 0.), r2(4., 0.), r2(-2., 2.), r2(0., 4.), r2(0., 0.)])
    }

    fn bowtie() -> Feature {
        Feature::nested(vec![r2(0., 0.), r2(10., 10.), r2(10., 0.), r2(0., 10.)])
    }

    fn shows(sink: &[Instruction]) -> usize {
        sink.iter().filter(|i| matches!(i, Instruction::ShowInvalid { .. })).count()
    }

    #[test]
    fn test_edit_session() {
        let mut c = controller(None);
        assert_eq!(c.status(), Status::Idle);

        c.host_mut().selected = Some(square());
        c.handle(HostEvent::SelectionChanged, ms(0));
        assert_eq!(c.status(), Status::Pending);
        assert!(!c.poll(ms(149)));
        assert!(c.poll(ms(150)));
        assert_eq!(c.status(), Status::Valid);
        assert_eq!(c.state(), &ValidationState::Valid);
        assert_eq!(c.sink().instructions(), &[Instruction::Clear]);

        c.host_mut().selected = Some(dragged_square());
        c.handle(HostEvent::EditCommitted, ms(1000));
        assert!(c.poll(ms(1100)));
        assert_eq!(c.status(), Status::Invalid { count: 1 });
        let kink = &c.state().kinks()[0];
        assert_eq!(kink.segments, (1, 3));
        assert_relative_eq!(kink.p.x, 0., epsilon = 1e-12);
        assert_relative_eq!(kink.p.y, 4. / 3., epsilon = 1e-12);
        assert_eq!(
            c.sink().instructions().last(),
            Some(&Instruction::ShowInvalid { count: 1, points: vec![kink.p] })
        );

        // Clearing history wins over a pending pass
        c.handle(HostEvent::EditCommitted, ms(2000));
        assert_eq!(c.status(), Status::Pending);
        c.handle(HostEvent::ActionsCleared, ms(2010));
        assert_eq!(c.status(), Status::Idle);
        assert_eq!(c.sink().instructions().last(), Some(&Instruction::Clear));
        assert_eq!(c.next_deadline(), None);
        assert!(!c.poll(ms(5000)));
        assert_eq!(c.passes(), 2);
    }

    #[test]
    fn test_burst_collapses_to_one_pass() {
        let mut c = controller(Some(square()));
        for i in 0..10 {
            // Geometry changes under every event; only the last one matters.
            c.host_mut().selected = Some(if i == 9 { bowtie() } else { square() });
            let deadline = c.handle(HostEvent::EditCommitted, ms(i * 20)).unwrap();
            assert_eq!(deadline.at, ms(i * 20 + 100));
            assert!(!c.poll(ms(i * 20 + 10)));
        }
        assert_eq!(c.passes(), 0);
        assert!(c.poll(ms(280)));
        assert_eq!(c.passes(), 1);
        assert_eq!(c.status(), Status::Invalid { count: 1 });
        assert_eq!(c.sink().instructions().len(), 1);
        assert!(!c.poll(ms(10_000)));
    }

    #[test]
    fn test_early_wakeup_waits_again() {
        let mut c = controller(Some(bowtie()));
        c.handle(HostEvent::SelectionChanged, ms(0));

        let early = Duration::from_micros(149_900);
        assert!(!c.poll(early));
        assert_eq!(c.status(), Status::Pending);
        assert_eq!(c.remaining(early), Some(Duration::from_micros(100)));

        assert!(c.poll(early + Duration::from_micros(100)));
        assert_eq!(c.status(), Status::Invalid { count: 1 });
        assert_eq!(c.remaining(ms(1000)), None);
    }

    #[test]
    fn test_latest_event_sets_delay() {
        let mut c = controller(Some(square()));
        c.handle(HostEvent::EditCommitted, ms(0));
        c.handle(HostEvent::SelectionChanged, ms(50));
        assert_eq!(c.next_deadline().unwrap().at, ms(200));
        c.handle(HostEvent::EditCommitted, ms(60));
        assert_eq!(c.next_deadline().unwrap().at, ms(160));
    }

    #[test]
    fn test_degenerate_is_idle() {
        let triangle = Feature::polygon(vec![r2(0., 0.), r2(1., 0.), r2(0.5, 1.), r2(0., 0.)]);
        let mut c = controller(Some(triangle));
        c.handle(HostEvent::SelectionChanged, ms(0));
        assert!(c.poll(ms(150)));
        assert_eq!(c.state(), &ValidationState::Idle);
        assert_eq!(c.sink().instructions(), &[Instruction::Clear]);
        assert_eq!(shows(c.sink().instructions()), 0);
    }

    #[test]
    fn test_unanalysable_selections_clear() {
        let line = Feature::new(
            Some(FeatureKind::Line),
            NestedGeometry::new(vec![vec![r2(0., 0.), r2(1., 1.)]]),
        );
        let holed = Feature::new(
            None,
            NestedGeometry::new(vec![
                vec![r2(0., 0.), r2(4., 0.), r2(4., 4.), r2(0., 4.)],
                vec![r2(1., 1.), r2(1., 2.), r2(2., 2.), r2(2., 1.)],
            ]),
        );
        for selected in [None, Some(line), Some(holed)] {
            let mut c = controller(Some(bowtie()));
            c.validate_now();
            assert_eq!(c.status(), Status::Invalid { count: 1 });

            c.host_mut().selected = selected;
            c.handle(HostEvent::SelectionChanged, ms(0));
            assert!(c.poll(ms(150)));
            assert_eq!(c.status(), Status::Idle);
            assert_eq!(c.sink().instructions().last(), Some(&Instruction::Clear));
        }
    }

    #[test]
    fn test_fix_clears_warning() {
        let mut c = controller(Some(bowtie()));
        c.handle(HostEvent::SelectionChanged, ms(0));
        c.poll(ms(150));
        assert_eq!(shows(c.sink().instructions()), 1);

        c.host_mut().selected = Some(square());
        c.handle(HostEvent::EditCommitted, ms(500));
        c.poll(ms(600));
        assert_eq!(c.status(), Status::Valid);
        assert_eq!(c.sink().instructions().last(), Some(&Instruction::Clear));
    }

    #[test]
    fn test_superseded_token() {
        let mut c = controller(Some(square()));
        let first = c.handle(HostEvent::SelectionChanged, ms(0)).unwrap();
        let second = c.handle(HostEvent::EditCommitted, ms(10)).unwrap();
        assert!(!c.fire(first.token));
        assert_eq!(c.status(), Status::Pending);
        assert!(c.fire(second.token));
        assert!(!c.fire(second.token));
        assert_eq!(c.passes(), 1);
        assert_eq!(c.status(), Status::Valid);
    }

    #[test]
    fn test_start() {
        let mut c = controller(Some(bowtie()));
        let deadline = c.start(ms(1000));
        assert_eq!(deadline.at, ms(1500));
        assert!(!c.poll(ms(1499)));
        assert!(c.poll(ms(1500)));
        assert_eq!(c.status(), Status::Invalid { count: 1 });
    }

    #[test]
    fn test_validate_now_cancels_pending() {
        let mut c = controller(Some(square()));
        c.handle(HostEvent::EditCommitted, ms(0));
        assert_eq!(c.validate_now(), &ValidationState::Valid);
        assert!(!c.poll(ms(1000)));
        assert_eq!(c.passes(), 1);
    }

    #[test]
    fn test_state_json() {
        let mut c = controller(Some(bowtie()));
        c.validate_now();
        let json = serde_json::to_value(c.state()).unwrap();
        assert_eq!(json["state"], "invalid");
        assert_eq!(json["kinks"][0]["segments"], serde_json::json!([0, 2]));
        assert_eq!(serde_json::to_value(c.status()).unwrap(), serde_json::json!({ "status": "invalid", "count": 1 }));
    }
}
