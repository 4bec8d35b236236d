use std::cell::RefCell;
use std::ops::Sub;
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, DragEvent, Element, Event, EventTarget, HtmlElement, TouchEvent};

use crate::config::{
    DRAG_FORMAT, DRAG_MARKER, PageConfig, SNAP_BACK_TRANSITION, ZONE_DONE_BACKGROUND,
    ZONE_HOVER_BACKGROUND, ZONE_IDLE_BACKGROUND,
};
use crate::dom;
use crate::geometry::Rect;
use crate::log;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TouchDrag {
    start: Point,
    offset: Point,
}

impl TouchDrag {
    pub fn offset(&self) -> Point {
        self.offset
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchRelease {
    Completed,
    SnapBack,
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CaptchaState {
    Pending(TouchDrag),
    Completed,
}

impl Default for CaptchaState {
    fn default() -> Self {
        CaptchaState::Pending(TouchDrag::default())
    }
}

impl CaptchaState {
    pub fn is_completed(&self) -> bool {
        matches!(self, CaptchaState::Completed)
    }

    pub fn offset(&self) -> Option<Point> {
        match self {
            CaptchaState::Pending(drag) => Some(drag.offset()),
            CaptchaState::Completed => None,
        }
    }

    pub fn touch_start(&mut self, touch: Point) {
        if let CaptchaState::Pending(drag) = self {
            drag.start = touch - drag.offset;
        }
    }

    pub fn touch_move(&mut self, touch: Point) -> Option<Point> {
        match self {
            CaptchaState::Pending(drag) => {
                drag.offset = touch - drag.start;
                Some(drag.offset)
            }
            CaptchaState::Completed => None,
        }
    }

    pub fn touch_end(&mut self, tile: &Rect, zone: &Rect) -> TouchRelease {
        let CaptchaState::Pending(drag) = self else {
            return TouchRelease::Ignored;
        };
        if tile.intersects(zone) {
            *self = CaptchaState::Completed;
            TouchRelease::Completed
        } else {
            drag.offset = Point::default();
            TouchRelease::SnapBack
        }
    }

    /// Returns true only when this drop completes the captcha.
    pub fn drop_payload(&mut self, payload: Option<&str>) -> bool {
        if self.is_completed() || payload != Some(DRAG_MARKER) {
            return false;
        }
        *self = CaptchaState::Completed;
        true
    }
}

fn translate(el: &HtmlElement, offset: Point) {
    let _ = el.style().set_property(
        "transform",
        &format!("translate3d({}px, {}px, 0)", offset.x, offset.y),
    );
}

// Touch::client_x() is an i32 binding; read the fractional coordinates instead.
fn touch_coord(touch: &JsValue, name: &str) -> Option<f64> {
    Reflect::get(touch, &JsValue::from_str(name)).ok()?.as_f64()
}

fn first_touch(event: &Event) -> Option<Point> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some(Point::new(
        touch_coord(&touch, "clientX")?,
        touch_coord(&touch, "clientY")?,
    ))
}

pub struct CaptchaWidget {
    state: CaptchaState,
    tile: HtmlElement,
    zone: HtmlElement,
    submit: Option<Element>,
    success: Option<HtmlElement>,
}

impl CaptchaWidget {
    pub fn state(&self) -> CaptchaState {
        self.state
    }

    pub fn accept_drop(&mut self, payload: Option<&str>) -> bool {
        let completed = self.state.drop_payload(payload);
        if completed {
            self.apply_completion();
        }
        completed
    }

    pub fn release_touch(&mut self) -> TouchRelease {
        let tile = Rect::from(&self.tile.get_bounding_client_rect());
        let zone = Rect::from(&self.zone.get_bounding_client_rect());
        let release = self.state.touch_end(&tile, &zone);
        match release {
            TouchRelease::Completed => self.apply_completion(),
            TouchRelease::SnapBack => {
                translate(&self.tile, Point::default());
                let _ = self
                    .tile
                    .style()
                    .set_property("transition", SNAP_BACK_TRANSITION);
            }
            TouchRelease::Ignored => {}
        }
        release
    }

    fn apply_completion(&self) {
        if let Err(err) = self.zone.append_child(&self.tile) {
            log::error(&format!(
                "captcha: failed to move tile into drop zone: {}",
                log::js_value_to_string(&err)
            ));
        }
        self.tile.set_draggable(false);
        dom::set_styles(
            &self.tile,
            &[
                ("cursor", "default"),
                ("transform", "none"),
                ("position", "relative"),
                ("margin", "0"),
            ],
        );
        dom::set_styles(
            &self.zone,
            &[
                ("background", ZONE_DONE_BACKGROUND),
                ("border", "none"),
                ("display", "flex"),
                ("align-items", "center"),
                ("justify-content", "center"),
            ],
        );

        if let Some(success) = &self.success {
            let _ = success.style().set_property("display", "block");
        }
        if let Some(submit) = &self.submit {
            let _ = submit.remove_attribute("disabled");
        }
        log::debug("captcha: completed");
    }
}

pub fn bind(
    document: &Document,
    config: &PageConfig,
) -> Result<Option<Rc<RefCell<CaptchaWidget>>>, JsValue> {
    let (Some(tile), Some(zone)) = (
        dom::html_element_by_id(document, config.tile_id),
        dom::html_element_by_id(document, config.drop_zone_id),
    ) else {
        log::debug("captcha: widget not on page");
        return Ok(None);
    };

    let widget = Rc::new(RefCell::new(CaptchaWidget {
        state: CaptchaState::default(),
        tile: tile.clone(),
        zone: zone.clone(),
        submit: document.get_element_by_id(config.submit_id),
        success: dom::html_element_by_id(document, config.captcha_success_id),
    }));

    dom::listen(&tile, "dragstart", |event| {
        let Some(transfer) = event.dyn_ref::<DragEvent>().and_then(|e| e.data_transfer()) else {
            return;
        };
        let _ = transfer.set_data(DRAG_FORMAT, DRAG_MARKER);
    })?;

    {
        let widget = Rc::clone(&widget);
        let zone_cb = zone.clone();
        dom::listen(&zone, "dragover", move |event| {
            event.prevent_default();
            if !widget.borrow().state.is_completed() {
                let _ = zone_cb
                    .style()
                    .set_property("background", ZONE_HOVER_BACKGROUND);
            }
        })?;
    }

    {
        let widget = Rc::clone(&widget);
        let zone_cb = zone.clone();
        dom::listen(&zone, "dragleave", move |_event| {
            if !widget.borrow().state.is_completed() {
                let _ = zone_cb
                    .style()
                    .set_property("background", ZONE_IDLE_BACKGROUND);
            }
        })?;
    }

    {
        let widget = Rc::clone(&widget);
        dom::listen(&zone, "drop", move |event| {
            event.prevent_default();
            let payload = event
                .dyn_ref::<DragEvent>()
                .and_then(|e| e.data_transfer())
                .and_then(|transfer| transfer.get_data(DRAG_FORMAT).ok());
            widget.borrow_mut().accept_drop(payload.as_deref());
        })?;
    }

    {
        let widget = Rc::clone(&widget);
        let tile_cb = tile.clone();
        dom::listen_passive(&tile, "touchstart", true, move |event| {
            let Some(touch) = first_touch(&event) else {
                return;
            };
            let mut widget = widget.borrow_mut();
            if widget.state.is_completed() {
                return;
            }
            widget.state.touch_start(touch);

            let tile_target: &EventTarget = tile_cb.as_ref();
            if event.target().as_ref() == Some(tile_target) {
                let _ = tile_cb.style().set_property("transition", "none");
            }
        })?;
    }

    {
        let widget = Rc::clone(&widget);
        let tile_cb = tile.clone();
        dom::listen_passive(&tile, "touchmove", false, move |event| {
            let Some(touch) = first_touch(&event) else {
                return;
            };
            if let Some(offset) = widget.borrow_mut().state.touch_move(touch) {
                event.prevent_default();
                translate(&tile_cb, offset);
            }
        })?;
    }

    {
        let widget = Rc::clone(&widget);
        dom::listen_passive(&tile, "touchend", true, move |_event| {
            widget.borrow_mut().release_touch();
        })?;
    }

    Ok(Some(widget))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> Rect {
        Rect::new(120.0, 90.0, 200.0, 160.0)
    }

    #[test]
    fn touch_move_tracks_displacement_from_start() {
        let mut state = CaptchaState::default();
        state.touch_start(Point::new(10.0, 20.0));
        assert_eq!(state.touch_move(Point::new(40.0, 25.0)), Some(Point::new(30.0, 5.0)));
        assert_eq!(state.touch_move(Point::new(15.0, 60.0)), Some(Point::new(5.0, 40.0)));
    }

    #[test]
    fn sub_pixel_displacement_is_kept() {
        let mut state = CaptchaState::default();
        state.touch_start(Point::new(10.25, 20.0));
        state.touch_move(Point::new(40.75, 20.5));
        let CaptchaState::Pending(drag) = state else {
            panic!("still pending");
        };
        assert_eq!(drag.offset(), Point::new(30.5, 0.5));
    }

    #[test]
    fn second_gesture_resumes_from_existing_offset() {
        let mut state = CaptchaState::default();
        state.touch_start(Point::new(0.0, 0.0));
        state.touch_move(Point::new(30.0, 30.0));

        state.touch_start(Point::new(100.0, 100.0));
        assert_eq!(
            state.touch_move(Point::new(110.0, 100.0)),
            Some(Point::new(40.0, 30.0))
        );
    }

    #[test]
    fn release_outside_zone_snaps_back_to_origin() {
        let mut state = CaptchaState::default();
        state.touch_start(Point::new(0.0, 0.0));
        state.touch_move(Point::new(80.0, -20.0));

        let tile = Rect::new(300.0, 100.0, 350.0, 150.0);
        assert_eq!(state.touch_end(&tile, &zone()), TouchRelease::SnapBack);
        assert_eq!(state.offset(), Some(Point::default()));
        assert!(!state.is_completed());
    }

    #[test]
    fn release_over_zone_completes() {
        let mut state = CaptchaState::default();
        let tile = Rect::new(100.0, 100.0, 150.0, 150.0);
        assert_eq!(state.touch_end(&tile, &zone()), TouchRelease::Completed);
        assert!(state.is_completed());
        assert_eq!(state.offset(), None);
    }

    #[test]
    fn drop_requires_marker_payload() {
        let mut state = CaptchaState::default();
        assert!(!state.drop_payload(None));
        assert!(!state.drop_payload(Some("")));
        assert!(!state.drop_payload(Some("Tile")));
        assert!(!state.is_completed());

        assert!(state.drop_payload(Some(DRAG_MARKER)));
        assert!(state.is_completed());
    }

    #[test]
    fn completion_is_one_way() {
        let mut state = CaptchaState::default();
        assert!(state.drop_payload(Some(DRAG_MARKER)));

        assert!(!state.drop_payload(Some(DRAG_MARKER)));
        state.touch_start(Point::new(5.0, 5.0));
        assert_eq!(state.touch_move(Point::new(50.0, 50.0)), None);
        let far = Rect::new(900.0, 900.0, 950.0, 950.0);
        assert_eq!(state.touch_end(&far, &zone()), TouchRelease::Ignored);
        assert_eq!(state, CaptchaState::Completed);
    }
}
