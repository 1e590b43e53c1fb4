//! The chart canvas: draws the reconciled scene and translates pointer
//! gestures into engine messages.

use crate::engine::scene::{BarVisual, Phase};
use crate::engine::ChartEngine;
use crate::Message;
use iced::mouse;
use iced::widget::canvas::{self, Action, Geometry, Program};
use iced::{Color, Event, Point, Rectangle, Renderer, Size, Theme};

pub mod header;
pub mod overview;

pub const HEADER_HEIGHT: f32 = 30.0;
pub const OVERVIEW_HEIGHT: f32 = 26.0;
pub const DETAILS_HEIGHT: f32 = 120.0;

/// Distance of the indicator arrow tip from the viewport edge.
pub const INDICATOR_INSET: f32 = 20.0;
const INDICATOR_HIT_RADIUS: f32 = 14.0;

fn draw_bar(frame: &mut canvas::Frame, bar: &BarVisual, viewport_width: f32) {
    let geometry = bar.geometry();
    let opacity = bar.opacity();
    let rect = Rectangle {
        x: geometry.x as f32,
        y: geometry.y as f32,
        width: (geometry.width as f32).max(1.0),
        height: (geometry.height as f32).max(1.0),
    };

    let fill = Color { a: bar.color.a * opacity, ..bar.color };
    frame.fill_rectangle(rect.position(), rect.size(), fill);
    frame.stroke(
        &canvas::Path::rectangle(rect.position(), rect.size()),
        canvas::Stroke::default()
            .with_color(Color::from_rgba(0.0, 0.0, 0.0, 0.25 * opacity))
            .with_width(1.0),
    );

    if bar.phase == Phase::Exiting || rect.height < 9.0 {
        return;
    }

    // Label sits to the right of the bar end, pulled back inside the
    // viewport when the bar runs off screen.
    let estimated_width = bar.label.len() as f32 * 7.0;
    let x = (rect.x + rect.width + 10.0)
        .max(40.0)
        .min(viewport_width - estimated_width - 40.0);
    frame.fill_text(canvas::Text {
        content: bar.label.clone(),
        position: Point::new(x, rect.y + rect.height / 2.0 - 6.0),
        color: Color::from_rgba(0.2, 0.2, 0.2, 0.3 + 0.7 * opacity),
        size: 12.0.into(),
        ..Default::default()
    });
}

fn indicator_path(tip: Point, size: f32, pointing_left: bool) -> canvas::Path {
    let direction = if pointing_left { 1.0 } else { -1.0 };
    canvas::Path::new(|builder| {
        builder.move_to(tip);
        builder.line_to(Point::new(tip.x + direction * size, tip.y - size / 2.0));
        builder.line_to(Point::new(tip.x + direction * size, tip.y + size / 2.0));
        builder.close();
    })
}

pub struct ChartProgram<'a> {
    pub engine: &'a ChartEngine,
}

#[derive(Default)]
pub struct ChartState {
    drag_start: Option<Point>,
}

impl<'a> ChartProgram<'a> {
    fn bar_at(&self, position: Point) -> Option<u64> {
        for bar in self.engine.scene().bars() {
            if bar.phase == Phase::Exiting {
                continue;
            }
            let geometry = bar.geometry();
            let rect = Rectangle {
                x: geometry.x as f32,
                y: geometry.y as f32,
                width: (geometry.width as f32).max(1.0),
                height: geometry.height as f32,
            };
            if rect.contains(position) {
                return Some(bar.id);
            }
        }
        None
    }

    /// An indicator triangle under the cursor, if any: `(id, is_left)`.
    fn indicator_at(&self, position: Point, bounds: Rectangle) -> Option<(u64, bool)> {
        for bar in self.engine.scene().bars() {
            let geometry = bar.geometry();
            let center_y = (geometry.y + geometry.height / 2.0) as f32;
            if (position.y - center_y).abs() > INDICATOR_HIT_RADIUS {
                continue;
            }
            if bar.scroll_left && (position.x - INDICATOR_INSET).abs() <= INDICATOR_HIT_RADIUS {
                return Some((bar.id, true));
            }
            if bar.scroll_right
                && (position.x - (bounds.width - INDICATOR_INSET)).abs() <= INDICATOR_HIT_RADIUS
            {
                return Some((bar.id, false));
            }
        }
        None
    }
}

impl<'a> Program<Message> for ChartProgram<'a> {
    type State = ChartState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        frame.fill_rectangle(
            Point::new(0.0, 0.0),
            Size::new(bounds.width, bounds.height),
            Color::from_rgb(1.0, 1.0, 1.0),
        );

        // Row background stripes behind the bars.
        for bar in self.engine.scene().bars() {
            if bar.phase == Phase::Exiting {
                continue;
            }
            let geometry = bar.geometry();
            frame.fill_rectangle(
                Point::new(0.0, geometry.y as f32),
                Size::new(bounds.width, geometry.height as f32),
                Color::from_rgb(0.97, 0.97, 0.97),
            );
        }

        // Tick guide lines matching the header axis.
        for tick in self.engine.view_ticks() {
            let x = tick.x as f32;
            frame.stroke(
                &canvas::Path::line(Point::new(x, 0.0), Point::new(x, bounds.height)),
                canvas::Stroke::default()
                    .with_color(Color::from_rgba(0.5, 0.5, 0.5, 0.2))
                    .with_width(1.0),
            );
        }

        // Point markers.
        for marker in self.engine.markers() {
            let x = marker.x as f32;
            if x < 0.0 || x > bounds.width {
                continue;
            }
            frame.stroke(
                &canvas::Path::line(Point::new(x, 0.0), Point::new(x, bounds.height)),
                canvas::Stroke::default()
                    .with_color(Color::from_rgba(0.8, 0.2, 0.2, 0.6))
                    .with_width(1.0),
            );
            if !marker.label.is_empty() {
                frame.fill_text(canvas::Text {
                    content: marker.label.clone(),
                    position: Point::new(x + 3.0, 2.0),
                    color: Color::from_rgba(0.7, 0.15, 0.15, 0.9),
                    size: 10.0.into(),
                    ..Default::default()
                });
            }
        }

        for bar in self.engine.scene().bars() {
            draw_bar(&mut frame, bar, bounds.width);
        }

        // Edge indicator triangles for bars scrolled out of view.
        for bar in self.engine.scene().bars() {
            let geometry = bar.geometry();
            let center_y = (geometry.y + geometry.height / 2.0) as f32;
            let size = (geometry.height as f32 * 0.6).clamp(6.0, 16.0);
            if bar.scroll_left {
                frame.fill(
                    &indicator_path(Point::new(INDICATOR_INSET, center_y), size, true),
                    bar.color,
                );
            }
            if bar.scroll_right {
                frame.fill(
                    &indicator_path(
                        Point::new(bounds.width - INDICATOR_INSET, center_y),
                        size,
                        false,
                    ),
                    bar.color,
                );
            }
        }

        // Selection outline on top.
        if let Some(selected) = self.engine.selected() {
            if let Some(bar) = self.engine.scene().get(selected.id) {
                let geometry = bar.geometry();
                frame.stroke(
                    &canvas::Path::rectangle(
                        Point::new(geometry.x as f32, geometry.y as f32),
                        Size::new((geometry.width as f32).max(1.0), geometry.height as f32),
                    ),
                    canvas::Stroke::default()
                        .with_color(Color::from_rgb(0.1, 0.3, 0.6))
                        .with_width(2.0),
                );
            }
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Action<Message>> {
        // The engine has no resize observer; the canvas reports its own
        // bounds whenever they drift from the engine's viewport.
        if (bounds.width as f64 - self.engine.width()).abs() > 1.0
            || (bounds.height as f64 - self.engine.height()).abs() > 1.0
        {
            return Some(Action::publish(Message::ChartResized {
                width: bounds.width,
                height: bounds.height,
            }));
        }

        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(position) = cursor.position_in(bounds) {
                    if let Some((id, is_left)) = self.indicator_at(position, bounds) {
                        return Some(Action::publish(if is_left {
                            Message::LeftIndicatorPressed(id)
                        } else {
                            Message::RightIndicatorPressed(id)
                        }));
                    }
                    if let Some(id) = self.bar_at(position) {
                        return Some(Action::publish(Message::ActivityPressed(id)));
                    }
                    state.drag_start = Some(position);
                }
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                state.drag_start = None;
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if let Some(start) = state.drag_start {
                    if let Some(position) = cursor.position_in(bounds) {
                        let dx = position.x - start.x;
                        state.drag_start = Some(position);
                        if dx != 0.0 {
                            return Some(Action::publish(Message::ChartPanned { dx }));
                        }
                    }
                }
            }
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if let Some(position) = cursor.position_in(bounds) {
                    let (x, y) = match delta {
                        mouse::ScrollDelta::Lines { x, y } | mouse::ScrollDelta::Pixels { x, y } => {
                            (*x, *y)
                        }
                    };
                    if y.abs() > x.abs() && y != 0.0 {
                        let factor = if y > 0.0 { 1.2 } else { 1.0 / 1.2 };
                        return Some(Action::publish(Message::ChartZoomed {
                            factor,
                            anchor_x: position.x,
                        }));
                    }
                    if x != 0.0 {
                        return Some(Action::publish(Message::ChartPanned { dx: -x }));
                    }
                }
            }
            _ => {}
        }
        None
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.drag_start.is_some() {
            return mouse::Interaction::Grabbing;
        }
        if let Some(position) = cursor.position_in(bounds) {
            if self.indicator_at(position, bounds).is_some() || self.bar_at(position).is_some() {
                return mouse::Interaction::Pointer;
            }
        }
        mouse::Interaction::default()
    }
}
