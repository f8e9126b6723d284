//! WebAssembly bindings for ripple-core.
//!
//! [`DomSurface`] implements [`Surface`] over the live browser DOM and
//! [`WasmRipple`] exposes one controller to JavaScript. The JS side owns the
//! event listeners and the `requestAnimationFrame` loop and forwards them:
//!
//! ```text
//! host.onmousedown / ontouchstart  ─▶ ripple.trigger(x, y, which, type)
//! requestAnimationFrame            ─▶ ripple.timers(); ripple.frame()
//! document mouseup / touchend      ─▶ ripple.release(event.type)
//! ripple transitionend             ─▶ ripple.transitionEnd(el, propertyName)
//! ```

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, Performance, Window};

use crate::{
    Clock, ContainerStrategy, NativeEvent, PointerEvent, Rect, ReleaseKind, RippleController,
    RippleError, RippleId, RippleOptions, RipplePatch, RippleResult, Surface, TouchSupport,
};

/// Initialize the ripple WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn dom_error(context: &str, value: &JsValue) -> RippleError {
    RippleError::Dom(format!("{context}: {value:?}"))
}

/// [`Surface`] over the browser DOM.
#[derive(Debug, Clone)]
pub struct DomSurface {
    window: Window,
    document: web_sys::Document,
}

impl DomSurface {
    /// Bind to the global window and document.
    ///
    /// # Errors
    ///
    /// Returns an error outside a browser window context.
    pub fn new() -> RippleResult<Self> {
        let window = web_sys::window().ok_or_else(|| RippleError::Dom("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| RippleError::Dom("no document".into()))?;
        Ok(Self { window, document })
    }
}

impl Surface for DomSurface {
    type Node = HtmlElement;

    fn create_element(&mut self, tag: &str) -> RippleResult<HtmlElement> {
        self.document
            .create_element(tag)
            .map_err(|e| dom_error("createElement", &e))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| RippleError::Dom(format!("<{tag}> is not an HTMLElement")))
    }

    fn add_class(&mut self, node: &HtmlElement, class: &str) {
        if let Err(e) = node.class_list().add_1(class) {
            tracing::warn!("classList.add({class}) failed: {e:?}");
        }
    }

    fn set_style(&mut self, node: &HtmlElement, property: &str, value: &str) {
        if let Err(e) = node.style().set_property(property, value) {
            tracing::warn!("style.setProperty({property}) failed: {e:?}");
        }
    }

    fn computed_style(&self, node: &HtmlElement, property: &str) -> Option<String> {
        self.window
            .get_computed_style(node)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value(property).ok())
    }

    fn bounding_rect(&self, node: &HtmlElement) -> Option<Rect> {
        let rect = node.get_bounding_client_rect();
        Some(Rect::new(rect.top(), rect.left(), rect.width(), rect.height()))
    }

    fn find_child_with_class(&self, parent: &HtmlElement, class: &str) -> Option<HtmlElement> {
        let children = parent.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .find(|child| child.class_list().contains(class))
            .and_then(|child| child.dyn_into::<HtmlElement>().ok())
    }

    fn append_child(&mut self, parent: &HtmlElement, child: &HtmlElement) -> RippleResult<()> {
        parent
            .append_child(child)
            .map(|_| ())
            .map_err(|e| dom_error("appendChild", &e))
    }

    fn remove(&mut self, node: &HtmlElement) -> RippleResult<()> {
        node.remove();
        Ok(())
    }

    fn is_connected(&self, node: &HtmlElement) -> bool {
        node.is_connected()
    }

    fn discard(&mut self, _node: &HtmlElement) {
        // Nothing holds a detached element once its handle is dropped.
    }

    fn touch_support(&self) -> TouchSupport {
        let touch_start_event =
            js_sys::Reflect::has(&self.window, &JsValue::from_str("ontouchstart")).unwrap_or(false);
        let navigator = self.window.navigator();
        let max_touch_points = u32::try_from(navigator.max_touch_points()).unwrap_or(0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ms_max_touch_points =
            js_sys::Reflect::get(&navigator, &JsValue::from_str("msMaxTouchPoints"))
                .ok()
                .and_then(|v| v.as_f64())
                .filter(|v| *v >= 0.0)
                .map(|v| v as u32);
        TouchSupport {
            touch_start_event,
            max_touch_points,
            ms_max_touch_points,
        }
    }
}

/// [`Clock`] backed by `performance.now()`.
#[derive(Debug, Clone)]
pub struct PerformanceClock {
    performance: Option<Performance>,
}

impl PerformanceClock {
    /// Bind to the window's performance timeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            performance: web_sys::window().and_then(|w| w.performance()),
        }
    }
}

impl Default for PerformanceClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        self.performance.as_ref().map_or(0.0, Performance::now)
    }
}

/// Parse the options object handed over from JavaScript.
fn parse_patch(options_json: Option<&str>) -> Result<RipplePatch, String> {
    match options_json {
        None => Ok(RipplePatch::new()),
        Some(json) if json.trim().is_empty() => Ok(RipplePatch::new()),
        Some(json) => RipplePatch::from_json(json).map_err(|e| e.to_string()),
    }
}

/// Turn a JS `which`/`type` pair into a pointer event.
fn pointer_event(
    client_x: f64,
    client_y: f64,
    which: Option<u32>,
    kind: Option<String>,
) -> PointerEvent {
    let native_event = (which.is_some() || kind.is_some()).then_some(NativeEvent { which, kind });
    PointerEvent {
        client_x,
        client_y,
        native_event,
    }
}

/// Build controller options, forwarding spawns to `on_spawn(element, id)`.
fn ripple_options(
    patch: RipplePatch,
    on_spawn: Option<js_sys::Function>,
) -> RippleOptions<HtmlElement> {
    let options = RippleOptions::<HtmlElement>::from_patch(patch);
    let Some(callback) = on_spawn else {
        return options;
    };
    options.with_on_spawn(move |ctx| {
        let id = u32::try_from(ctx.ripple_id.raw()).unwrap_or(u32::MAX);
        let element: &JsValue = ctx.ripple.as_ref();
        if let Err(e) = callback.call2(&JsValue::NULL, element, &JsValue::from(id)) {
            tracing::warn!("onSpawn callback threw: {e:?}");
        }
    })
}

/// Ripple controller for one host element.
#[wasm_bindgen]
pub struct WasmRipple {
    surface: DomSurface,
    controller: RippleController<HtmlElement>,
}

#[wasm_bindgen]
impl WasmRipple {
    /// Create a ripple from a JSON options object.
    ///
    /// `on_spawn` is called with `(rippleElement, rippleId)` once each
    /// ripple is attached.
    ///
    /// # Errors
    ///
    /// Returns an error string if the options fail to parse or there is no
    /// browser document.
    #[wasm_bindgen(constructor)]
    pub fn new(
        options_json: Option<String>,
        on_spawn: Option<js_sys::Function>,
    ) -> Result<WasmRipple, String> {
        let patch = parse_patch(options_json.as_deref())?;
        let surface = DomSurface::new().map_err(|e| e.to_string())?;
        let options = ripple_options(patch, on_spawn);
        Ok(Self {
            surface,
            controller: RippleController::new(options, PerformanceClock::new()),
        })
    }

    /// Bind the host element.
    #[wasm_bindgen(js_name = bindHost)]
    pub fn bind_host(&self, host: HtmlElement) {
        self.controller.host_ref().bind(host);
    }

    /// Unbind the host and let waiting ripples fade out.
    pub fn teardown(&mut self) {
        self.controller.teardown(&mut self.surface);
        self.controller.host_ref().unbind();
    }

    /// Switch to clipping on the host instead of a container element.
    #[wasm_bindgen(js_name = useHostClip)]
    pub fn use_host_clip(&mut self, enabled: bool) {
        let strategy = if enabled {
            ContainerStrategy::HostClip
        } else {
            ContainerStrategy::Container
        };
        self.controller.set_strategy(strategy);
    }

    /// Forward a press on the host. Returns `true` if a ripple was queued.
    pub fn trigger(
        &mut self,
        client_x: f64,
        client_y: f64,
        which: Option<u32>,
        kind: Option<String>,
    ) -> bool {
        let event = pointer_event(client_x, client_y, which, kind);
        self.controller.trigger(&mut self.surface, &event)
    }

    /// Call from `requestAnimationFrame`.
    pub fn frame(&mut self) {
        self.controller.on_animation_frame(&mut self.surface);
    }

    /// Run due timers.
    pub fn timers(&mut self) {
        self.controller.on_timers(&mut self.surface);
    }

    /// Forward a document-level `mouseup` or `touchend`.
    pub fn release(&mut self, event_name: &str) {
        match ReleaseKind::from_event_name(event_name) {
            Some(kind) => self.controller.on_pointer_release(&mut self.surface, kind),
            None => tracing::warn!("Ignoring release of unknown event type: {event_name}"),
        }
    }

    /// Forward a `transitionend` from a ripple element.
    #[wasm_bindgen(js_name = transitionEnd)]
    pub fn transition_end(&mut self, node: &HtmlElement, property: &str) -> bool {
        self.controller
            .on_transition_end(&mut self.surface, node, property)
    }

    /// Cancel one ripple by the ID passed to `onSpawn`.
    pub fn cancel(&mut self, id: u32) {
        self.controller
            .cancel(&mut self.surface, RippleId::from_raw(u64::from(id)));
    }

    /// Number of ripples still attached.
    #[wasm_bindgen(js_name = activeCount)]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.controller.active_count()
    }

    /// The earliest armed timer in `performance.now()` milliseconds.
    #[wasm_bindgen(js_name = nextDeadline)]
    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        self.controller.next_deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_patch_accepts_missing_and_blank() {
        assert_eq!(parse_patch(None), Ok(RipplePatch::new()));
        assert_eq!(parse_patch(Some("  ")), Ok(RipplePatch::new()));
    }

    #[test]
    fn parse_patch_reads_camel_case_options() {
        let patch = parse_patch(Some(r#"{"duration":300,"cancelAutomatically":true}"#))
            .expect("valid options");
        let config = patch.resolve();
        assert!((config.duration - 300.0).abs() < f64::EPSILON);
        assert!(config.cancel_automatically);
    }

    #[test]
    fn parse_patch_rejects_invalid_json() {
        assert!(parse_patch(Some("{ nope }")).is_err());
    }

    #[test]
    fn pointer_event_without_native_details() {
        let event = pointer_event(4.0, 5.0, None, None);
        assert!(event.native_event.is_none());
        assert!(!event.is_secondary_mouse_down());
    }

    #[test]
    fn ripple_options_without_callback_drive_a_dom_controller() {
        let patch = parse_patch(Some(r#"{"duration":300}"#)).expect("valid options");
        let options = ripple_options(patch, None);
        assert!(options.on_spawn.is_none());

        let controller: RippleController<HtmlElement> =
            RippleController::new(options, PerformanceClock { performance: None });
        assert!((controller.config().duration - 300.0).abs() < f64::EPSILON);
        assert!(!controller.host_ref().is_bound());
        assert!(controller.is_idle());
    }

    #[test]
    fn performance_clock_without_a_window_reads_zero() {
        let clock = PerformanceClock { performance: None };
        assert!(clock.now_ms().abs() < f64::EPSILON);
    }

    #[test]
    fn pointer_event_keeps_button_and_type() {
        let event = pointer_event(4.0, 5.0, Some(3), Some("mousedown".into()));
        assert!(event.is_secondary_mouse_down());
    }
}
