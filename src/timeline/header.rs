//! Time-axis header strip: ticks derived from the composed mapping, so they
//! refresh with every pan/zoom and every domain change.

use crate::engine::ticks::Tick;
use crate::Message;
use iced::mouse;
use iced::widget::canvas::{self, Geometry, Program};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

pub struct HeaderProgram<'a> {
    pub ticks: &'a [Tick],
}

impl<'a> Program<Message> for HeaderProgram<'a> {
    type State = ();

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
            Color::from_rgb(0.95, 0.95, 0.95),
        );

        for tick in self.ticks {
            let x = tick.x as f32;
            if x < 0.0 || x > bounds.width {
                continue;
            }

            frame.stroke(
                &canvas::Path::line(
                    Point::new(x, bounds.height - 6.0),
                    Point::new(x, bounds.height),
                ),
                canvas::Stroke::default()
                    .with_color(Color::from_rgb(0.3, 0.3, 0.3))
                    .with_width(1.0),
            );

            frame.fill_text(canvas::Text {
                content: tick.label.clone(),
                position: Point::new(x + 3.0, 4.0),
                color: Color::from_rgb(0.25, 0.25, 0.25),
                size: 11.0.into(),
                ..Default::default()
            });
        }

        frame.stroke(
            &canvas::Path::line(
                Point::new(0.0, bounds.height - 0.5),
                Point::new(bounds.width, bounds.height - 0.5),
            ),
            canvas::Stroke::default()
                .with_color(Color::from_rgb(0.75, 0.75, 0.75))
                .with_width(1.0),
        );

        vec![frame.into_geometry()]
    }
}
