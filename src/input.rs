//! Window events to session intents.
//!
//! [`GestureController`] tracks the pointer between winit events and reports
//! the abstract gestures the session understands. Press, move, release is a
//! drag; press and release without leaving the tap slop is a tap; wheel and
//! trackpad pinch both become pinch scales.

use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent},
};

use crate::session::Intent;

/// Approximate pixels per wheel line on platforms that report pixels.
const PIXELS_PER_LINE: f32 = 40.0;

pub struct GestureController {
    /// Pixels the pointer may wander before a press stops being a tap.
    pub tap_slop: f32,
    /// Pinch scale change per wheel line.
    pub wheel_zoom_step: f32,
    cursor: (f32, f32),
    pressed_at: Option<(f32, f32)>,
    dragging: bool,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(6.0, 0.1)
    }
}

impl GestureController {
    pub fn new(tap_slop: f32, wheel_zoom_step: f32) -> Self {
        Self {
            tap_slop,
            wheel_zoom_step,
            cursor: (0.0, 0.0),
            pressed_at: None,
            dragging: false,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn process_events(&mut self, event: &WindowEvent) -> Vec<Intent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.on_pointer_moved(position.x as f32, position.y as f32)
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.on_pointer_pressed();
                    Vec::new()
                }
                ElementState::Released => self.on_pointer_released(),
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                        *y as f32 / PIXELS_PER_LINE
                    }
                };
                self.on_scroll(lines).into_iter().collect()
            }
            WindowEvent::PinchGesture { delta, .. } => {
                self.on_pinch(*delta as f32).into_iter().collect()
            }
            WindowEvent::Touch(Touch {
                phase, location, ..
            }) => {
                let (x, y) = (location.x as f32, location.y as f32);
                match phase {
                    TouchPhase::Started => {
                        self.cursor = (x, y);
                        self.on_pointer_pressed();
                        Vec::new()
                    }
                    TouchPhase::Moved => self.on_pointer_moved(x, y),
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        let mut intents = self.on_pointer_moved(x, y);
                        intents.extend(self.on_pointer_released());
                        intents
                    }
                }
            }
            _ => Vec::new(),
        }
    }

    pub fn on_pointer_pressed(&mut self) {
        self.pressed_at = Some(self.cursor);
        self.dragging = false;
    }

    pub fn on_pointer_moved(&mut self, x: f32, y: f32) -> Vec<Intent> {
        let (last_x, last_y) = self.cursor;
        self.cursor = (x, y);
        let Some((start_x, start_y)) = self.pressed_at else {
            return Vec::new();
        };
        if !self.dragging {
            let travelled = ((x - start_x).powi(2) + (y - start_y).powi(2)).sqrt();
            if travelled <= self.tap_slop {
                return Vec::new();
            }
            self.dragging = true;
            // the slop distance counts toward the first delta
            return vec![Intent::Drag {
                dx: x - start_x,
                dy: y - start_y,
            }];
        }
        vec![Intent::Drag {
            dx: x - last_x,
            dy: y - last_y,
        }]
    }

    pub fn on_pointer_released(&mut self) -> Vec<Intent> {
        let Some(_) = self.pressed_at.take() else {
            return Vec::new();
        };
        if std::mem::take(&mut self.dragging) {
            vec![Intent::DragEnded]
        } else {
            let (x, y) = self.cursor;
            vec![Intent::TapAt { x, y }]
        }
    }

    /// Positive `lines` scroll away from the user and zoom in.
    pub fn on_scroll(&mut self, lines: f32) -> Option<Intent> {
        let scale = 1.0 + lines * self.wheel_zoom_step;
        (lines != 0.0 && scale > 0.0).then_some(Intent::Pinch { scale })
    }

    /// `delta` is the trackpad's magnification change for this event.
    pub fn on_pinch(&mut self, delta: f32) -> Option<Intent> {
        let scale = 1.0 + delta;
        (delta != 0.0 && scale > 0.0).then_some(Intent::Pinch { scale })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_press_is_a_tap() {
        let mut gestures = GestureController::default();
        gestures.on_pointer_moved(100.0, 200.0);
        gestures.on_pointer_pressed();
        assert!(gestures.on_pointer_moved(102.0, 201.0).is_empty());
        assert_eq!(
            gestures.on_pointer_released(),
            vec![Intent::TapAt { x: 102.0, y: 201.0 }]
        );
    }

    #[test]
    fn press_move_release_is_a_drag() {
        let mut gestures = GestureController::default();
        gestures.on_pointer_moved(0.0, 0.0);
        gestures.on_pointer_pressed();
        assert_eq!(
            gestures.on_pointer_moved(10.0, 0.0),
            vec![Intent::Drag { dx: 10.0, dy: 0.0 }]
        );
        assert_eq!(
            gestures.on_pointer_moved(15.0, -2.0),
            vec![Intent::Drag { dx: 5.0, dy: -2.0 }]
        );
        assert!(gestures.is_dragging());
        assert_eq!(gestures.on_pointer_released(), vec![Intent::DragEnded]);
        assert!(!gestures.is_dragging());
    }

    #[test]
    fn hover_without_press_does_nothing() {
        let mut gestures = GestureController::default();
        assert!(gestures.on_pointer_moved(50.0, 50.0).is_empty());
        assert!(gestures.on_pointer_released().is_empty());
    }

    #[test]
    fn wheel_and_pinch_become_scales() {
        let mut gestures = GestureController::new(6.0, 0.25);
        assert_eq!(gestures.on_scroll(2.0), Some(Intent::Pinch { scale: 1.5 }));
        assert_eq!(gestures.on_scroll(0.0), None);
        assert_eq!(gestures.on_pinch(-0.25), Some(Intent::Pinch { scale: 0.75 }));
        assert_eq!(gestures.on_pinch(-1.5), None);
    }
}
