//! Viewport pan and zoom.
//!
//! * Pan: a raw pointer-down in `idle`, while the pointer is not busy,
//!   where every item under the cursor is locked (vacuously true on empty
//!   canvas). Raw moves translate the captured transform by the pointer
//!   delta divided by the captured scale. Ends on pointer-up or cancel; a
//!   pan that never moved counts as a click on the canvas and clears the
//!   selection.
//! * Zoom: double-click zooms by `dblclick_zoom`, animated over
//!   `zoom_duration_ms`; the wheel zooms by `wheel_zoom_base^(deltaY/100)`
//!   immediately. Both keep the point under the cursor fixed and clamp the
//!   scale to the configured bounds.

use super::{GestureScope, Interaction, Sinks, Sources};
use crate::mode::Mode;
use crate::transition::Transition;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use vd_core::{AppConfig, Point, Selection, Transform};

fn zoomed(transform: &Transform, cursor: Point, multiplier: f64, config: &AppConfig) -> Transform {
    transform.zoom_at(cursor, multiplier, config.min_scale, config.max_scale)
}

pub fn zoom(sources: &Sources) -> Interaction {
    let sinks = Sinks::default();
    let mouse = &sources.mouse;
    let state = sources.state.latest();
    let transform = sources.transform.latest();
    let config = sources.config.latest();
    let pan = GestureScope::default();
    let panned = Rc::new(Cell::new(false));
    let animation = GestureScope::default();
    let mut subs = Vec::new();

    let pan_starts = mouse
        .raw_down
        .gate(&sources.mode, |m| *m == Mode::Idle)
        .gate(&mouse.is_busy, |busy| !busy);
    subs.push(pan_starts.subscribe({
        let (sinks, pan, panned, animation) = (sinks.clone(), pan.clone(), panned.clone(), animation.clone());
        let (transform, raw_move) = (transform.clone(), mouse.raw_move.clone());
        move |&origin| {
            let (Some(state), Some(start)) = (state.get(), transform.get()) else {
                return;
            };
            let pos = start.invert_pos(origin);
            if !state.items_at(pos).iter().all(|item| item.locked) {
                return;
            }
            animation.end();
            panned.set(false);
            sinks.busy.emit(true);
            let drag = raw_move.subscribe({
                let (next_transform, panned) = (sinks.next_transform.clone(), panned.clone());
                move |&raw| {
                    panned.set(true);
                    let (dx, dy) = (raw.x - origin.x, raw.y - origin.y);
                    next_transform.emit(start.translate(dx / start.k, dy / start.k));
                }
            });
            log::debug!("zoom: pan from {origin:?}");
            pan.begin(vec![drag]);
        }
    }));

    let end_pan = {
        let (sinks, pan, panned) = (sinks.clone(), pan.clone(), panned.clone());
        move |clicked: bool| {
            if !pan.end() {
                return;
            }
            sinks.busy.emit(false);
            if clicked && !panned.get() {
                sinks.change_selection.emit(Selection::empty());
            }
        }
    };
    let end_pan = Rc::new(end_pan);
    subs.push(mouse.raw_up.subscribe({
        let end_pan = end_pan.clone();
        move |_| end_pan(true)
    }));
    subs.push(mouse.cancel.subscribe(move |_| end_pan(false)));

    subs.push(mouse.dblclick.subscribe({
        let (sinks, animation) = (sinks.clone(), animation.clone());
        let (transform, config, frame) = (transform.clone(), config.clone(), sources.frame.clone());
        move |&cursor| {
            let (Some(from), Some(config)) = (transform.get(), config.get()) else {
                return;
            };
            let to = zoomed(&from, cursor, config.dblclick_zoom, &config);
            if to.k == from.k {
                animation.end();
                sinks.next_transform.emit(to);
                return;
            }
            log::debug!("zoom: animate k {} -> {}", from.k, to.k);
            let transition = RefCell::new(Transition::new(from, to, config.zoom_duration_ms));
            let scope = animation.downgrade();
            let tick = frame.subscribe({
                let next_transform = sinks.next_transform.clone();
                move |&now| {
                    let sample = transition.borrow_mut().sample(now);
                    if let Some(t) = sample {
                        next_transform.emit(t);
                    }
                    if transition.borrow().is_done() {
                        scope.end();
                    }
                }
            });
            animation.begin(vec![tick]);
        }
    }));

    subs.push(mouse.wheel.subscribe({
        let next_transform = sinks.next_transform.clone();
        move |wheel| {
            let (Some(current), Some(config)) = (transform.get(), config.get()) else {
                return;
            };
            animation.end();
            let multiplier = config.wheel_zoom_base.powf(wheel.delta_y / 100.0);
            next_transform.emit(zoomed(&current, wheel.pos, multiplier, &config));
        }
    }));

    Interaction::new("zoom", sinks, subs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::testing::{recorder, sources};
    use crate::mouse::WheelEvent;
    use pretty_assertions::assert_eq;
    use vd_core::{Item, ItemId, State};

    #[test]
    fn wheel_zoom_is_immediate_and_clamped() {
        let src = sources();
        let module = zoom(&src);
        let p = recorder(&module.sinks);
        src.transform.emit(Transform::new(0.0, 0.0, 9.9));
        src.mouse.wheel.emit(WheelEvent {
            pos: Point::new(100.0, 100.0),
            delta_y: -1000.0,
        });
        let t = p.transforms.borrow()[0];
        assert_eq!(t.k, 10.0);
        // the point under the cursor stays put
        let before = Transform::new(0.0, 0.0, 9.9).invert_pos(Point::new(100.0, 100.0));
        let after = t.invert_pos(Point::new(100.0, 100.0));
        assert!((before.x - after.x).abs() < 1e-9 && (before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn dblclick_animates_on_frames() {
        let src = sources();
        let module = zoom(&src);
        let p = recorder(&module.sinks);
        src.mouse.dblclick.emit(Point::new(100.0, 100.0));
        assert!(p.transforms.borrow().is_empty());

        src.frame.emit(0.0);
        src.frame.emit(125.0);
        src.frame.emit(250.0);
        src.frame.emit(400.0);
        let ks: Vec<f64> = p.transforms.borrow().iter().map(|t| t.k).collect();
        assert_eq!(ks, vec![1.0, 1.5, 2.0]);
        assert_eq!(
            p.transforms.borrow().last(),
            Some(&Transform::new(-100.0, -100.0, 2.0))
        );
        assert_eq!(src.frame.listener_count(), 0);
    }

    #[test]
    fn pan_translates_by_raw_delta_over_scale() {
        let src = sources();
        let module = zoom(&src);
        let p = recorder(&module.sinks);
        src.transform.emit(Transform::new(10.0, 10.0, 2.0));

        src.mouse.raw_down.emit(Point::new(50.0, 50.0));
        src.mouse.raw_move.emit(Point::new(70.0, 40.0));
        src.mouse.raw_up.emit(Point::new(70.0, 40.0));
        src.mouse.raw_move.emit(Point::new(90.0, 90.0));

        assert_eq!(*p.transforms.borrow(), vec![Transform::new(30.0, 0.0, 2.0)]);
        assert!(p.selections.borrow().is_empty());
    }

    #[test]
    fn no_pan_over_unlocked_item_or_when_busy() {
        let src = sources();
        src.state.emit(State::from_items([Item::line_from_points(
            ItemId(1),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        )]));
        let module = zoom(&src);
        let p = recorder(&module.sinks);

        src.mouse.raw_down.emit(Point::new(50.0, 0.0));
        src.mouse.raw_move.emit(Point::new(60.0, 0.0));
        src.mouse.raw_up.emit(Point::new(60.0, 0.0));

        src.mouse.is_busy.emit(true);
        src.mouse.raw_down.emit(Point::new(50.0, 50.0));
        src.mouse.raw_move.emit(Point::new(60.0, 60.0));
        assert!(p.transforms.borrow().is_empty());
    }

    #[test]
    fn click_on_empty_canvas_clears_selection() {
        let src = sources();
        let module = zoom(&src);
        let p = recorder(&module.sinks);
        src.mouse.raw_down.emit(Point::new(5.0, 5.0));
        src.mouse.raw_up.emit(Point::new(5.0, 5.0));
        assert_eq!(*p.selections.borrow(), vec![Selection::empty()]);
    }
}
