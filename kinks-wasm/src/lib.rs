//! WASM bindings for the polygon self-intersection validator.
//!
//! The map editor supplies two JavaScript objects: a [`HostEditor`] that returns the currently
//! selected feature, and a [`WarningRenderer`] that shows or hides the warning banner and
//! kink markers. Wiring a [`Validator`] into an editor looks like:
//!
//! ```js
//! const validator = new Validator(host, renderer);
//! const schedule = (delay) => {
//!     if (delay !== undefined) setTimeout(() => schedule(validator.poll()), delay);
//! };
//! schedule(validator.start());
//! editor.on("selectionchanged", () => schedule(validator.selectionChanged()));
//! editor.on("afteraction", () => schedule(validator.editCommitted()));
//! editor.on("afterundoaction", () => schedule(validator.editCommitted()));
//! editor.on("afterclearactions", () => validator.actionsCleared());
//! ```
//!
//! Superseded `setTimeout` callbacks are harmless: `poll` only runs a pass once the latest
//! deadline has passed. A callback that fires before then (timer and `performance.now()`
//! clocks drift apart) gets the remaining delay back and waits again.
//!
//! `currentSelectedAreaFeature` must return plain data (e.g. from `geometry.toJSON()` or a
//! copied `{ CLASS_NAME, components }` tree), never the editor's live geometry object:
//! conversion walks every property, and live objects link back to their parents.

use std::time::Duration;

use kinks_core::{
    extract_polygon,
    validation::{warning_message as message_for, Controller, Host, HostEvent, NotificationSink},
    Feature, ValidatorConfig, R2,
};
use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_console_logger::DEFAULT_LOGGER;

#[wasm_bindgen(typescript_custom_section)]
const HOST_TYPES: &'static str = r#"
export interface HostEditor {
    /** Plain-data copy of the selected feature; never the editor's live geometry object. */
    currentSelectedAreaFeature(): Feature | null | undefined;
}

export interface WarningRenderer {
    showInvalid(count: number, message: string, points: R2<number>[]): void;
    clear(): void;
}
"#;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(typescript_type = "HostEditor")]
    pub type HostEditor;

    #[wasm_bindgen(method, js_name = currentSelectedAreaFeature)]
    fn current_selected_area_feature(this: &HostEditor) -> JsValue;

    #[wasm_bindgen(typescript_type = "WarningRenderer")]
    pub type WarningRenderer;

    #[wasm_bindgen(method, js_name = showInvalid)]
    fn show_invalid(this: &WarningRenderer, count: u32, message: &str, points: JsValue);

    #[wasm_bindgen(method)]
    fn clear(this: &WarningRenderer);
}

struct JsHost(HostEditor);

impl Host for JsHost {
    type Feature = Feature;

    fn current_selected_area_feature(&self) -> Option<Feature> {
        let value = self.0.current_selected_area_feature();
        if value.is_null() || value.is_undefined() {
            return None;
        }
        match serde_wasm_bindgen::from_value(value) {
            Ok(feature) => Some(feature),
            Err(e) => {
                warn!("Unreadable selected feature: {}", e);
                None
            }
        }
    }
}

struct JsSink(WarningRenderer);

impl NotificationSink for JsSink {
    fn show_invalid(&mut self, count: usize, points: &[R2<f64>]) {
        let points = serde_wasm_bindgen::to_value(points).unwrap_or_else(|e| {
            error!("Failed to convert kink points: {}", e);
            JsValue::NULL
        });
        self.0.show_invalid(count as u32, &message_for(count), points);
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

/// Milliseconds from `performance.now()`; zero where no `window` is available.
fn now() -> Duration {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| duration(p.now()))
        .unwrap_or_default()
}

fn duration(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0. {
        Duration::from_secs_f64(ms / 1000.)
    } else {
        Duration::ZERO
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.
}

/// Initializes the logging system for WASM.
///
/// Sets up console logging and panic hooks for better error reporting in the browser.
/// Should be called once at application startup.
#[wasm_bindgen]
pub fn init_logs() {
    match log::set_logger(&DEFAULT_LOGGER) {
        Ok(_) => info!("Initialized console.logger"),
        Err(e) => error!("failed to set console.logger: {}", e),
    };
    console_error_panic_hook::set_once();
}

/// Updates the log level filter.
///
/// # Arguments
/// * `level` - Log level string: "error", "warn", "info", "debug", or "trace".
///   Defaults to "info" if empty or null.
#[wasm_bindgen]
pub fn update_log_level(level: JsValue) -> Result<(), JsError> {
    let level: Option<String> = serde_wasm_bindgen::from_value(level)?;
    let level = kinks_core::parse_log_level(level.as_deref()).map_err(|e| JsError::new(&e))?;
    log::set_max_level(level);
    Ok(())
}

fn config_from(config: JsValue) -> Result<ValidatorConfig, JsError> {
    if config.is_null() || config.is_undefined() {
        Ok(ValidatorConfig::default())
    } else {
        Ok(serde_wasm_bindgen::from_value(config)?)
    }
}

/// Finds the self-intersections of a single feature.
///
/// # Arguments
/// * `feature` - A [`Feature`]: optional `kind` plus either nested `components` rings or a
///   GeoJSON-style `{ type, coordinates }` geometry.
/// * `config` - Optional [`ValidatorConfig`]; only its `detector` tolerances are used.
///
/// # Returns
/// An array of kinks (`{ p, segments }`), empty for a simple polygon.
///
/// # Errors
/// If the feature can't be analysed (not an area, holes, too few vertices, bad coordinates).
#[wasm_bindgen(js_name = findKinks)]
pub fn find_kinks(feature: JsValue, config: JsValue) -> Result<JsValue, JsError> {
    let feature: Feature = serde_wasm_bindgen::from_value(feature)?;
    let config = config_from(config)?;
    let polygon = extract_polygon(&feature)?;
    let kinks = polygon.kinks_with(&config.detector);
    Ok(serde_wasm_bindgen::to_value(&kinks)?)
}

/// Banner text for `count` kinks, e.g. "Polygon is self-intersecting at 2 points!".
#[wasm_bindgen(js_name = warningMessage)]
pub fn warning_message(count: u32) -> String {
    message_for(count as usize)
}

/// Debounced validator bound to a host editor and a warning renderer.
///
/// Event methods return the delay (ms) after which [`Validator::poll`] should be called.
#[wasm_bindgen]
pub struct Validator {
    controller: Controller<JsHost, JsSink>,
}

#[wasm_bindgen]
impl Validator {
    /// # Arguments
    /// * `host` - Object with `currentSelectedAreaFeature()`, returning plain data.
    /// * `renderer` - Object with `showInvalid(count, message, points)` and `clear()`.
    /// * `config` - Optional [`ValidatorConfig`] overrides (delays in ms, tolerances).
    #[wasm_bindgen(constructor)]
    pub fn new(host: HostEditor, renderer: WarningRenderer, config: JsValue) -> Result<Validator, JsError> {
        let config = config_from(config)?;
        Ok(Validator { controller: Controller::new(JsHost(host), JsSink(renderer), config) })
    }

    /// Schedules the initial pass, for a feature selected before the validator attached.
    pub fn start(&mut self) -> f64 {
        let now = now();
        let deadline = self.controller.start(now);
        millis(deadline.at.saturating_sub(now))
    }

    #[wasm_bindgen(js_name = selectionChanged)]
    pub fn selection_changed(&mut self) -> f64 {
        self.schedule(HostEvent::SelectionChanged)
    }

    /// Call after an edit is performed or undone.
    #[wasm_bindgen(js_name = editCommitted)]
    pub fn edit_committed(&mut self) -> f64 {
        self.schedule(HostEvent::EditCommitted)
    }

    /// Call when the host's edit history is cleared; hides any warning immediately.
    #[wasm_bindgen(js_name = actionsCleared)]
    pub fn actions_cleared(&mut self) {
        self.controller.handle(HostEvent::ActionsCleared, now());
    }

    /// Runs the pending pass if it is due.
    ///
    /// Returns the delay (ms) to wait before polling again when a pass is still pending, or
    /// `undefined` when there's nothing left to wait for.
    pub fn poll(&mut self) -> Option<f64> {
        let now = now();
        if self.controller.poll(now) {
            return None;
        }
        self.controller.remaining(now).map(|d| millis(d).ceil())
    }

    /// Validates immediately and returns the resulting [`ValidationState`](kinks_core::ValidationState).
    #[wasm_bindgen(js_name = validateNow)]
    pub fn validate_now(&mut self) -> Result<JsValue, JsError> {
        let state = self.controller.validate_now();
        Ok(serde_wasm_bindgen::to_value(state)?)
    }

    /// Current [`Status`](kinks_core::Status): idle, pending, valid, or invalid with a count.
    pub fn status(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.controller.status())?)
    }

    /// Kinks found by the last pass (empty unless invalid).
    pub fn kinks(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(self.controller.state().kinks())?)
    }
}

impl Validator {
    fn schedule(&mut self, event: HostEvent) -> f64 {
        let now = now();
        self.controller
            .handle(event, now)
            .map(|deadline| millis(deadline.at.saturating_sub(now)))
            .unwrap_or(0.)
    }
}
