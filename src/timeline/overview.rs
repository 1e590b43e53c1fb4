//! Overview strip: the data domain spelled out as two fixed labels.
//!
//! Unlike the header this reflects the domain itself, not the viewport
//! transform, so panning and zooming leave it untouched.

use crate::Message;
use iced::mouse;
use iced::widget::canvas::{self, Geometry, Program};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

pub struct OverviewProgram<'a> {
    pub start_label: &'a str,
    pub end_label: &'a str,
}

impl<'a> Program<Message> for OverviewProgram<'a> {
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
            Color::from_rgb(0.92, 0.92, 0.92),
        );

        let baseline_y = bounds.height / 2.0;
        frame.stroke(
            &canvas::Path::line(
                Point::new(6.0, baseline_y),
                Point::new(bounds.width - 6.0, baseline_y),
            ),
            canvas::Stroke::default()
                .with_color(Color::from_rgb(0.6, 0.6, 0.6))
                .with_width(1.0),
        );

        frame.fill_text(canvas::Text {
            content: self.start_label.to_string(),
            position: Point::new(6.0, 5.0),
            color: Color::from_rgb(0.3, 0.3, 0.3),
            size: 11.0.into(),
            ..Default::default()
        });

        let estimated_width = self.end_label.len() as f32 * 6.5;
        frame.fill_text(canvas::Text {
            content: self.end_label.to_string(),
            position: Point::new((bounds.width - estimated_width - 6.0).max(6.0), 5.0),
            color: Color::from_rgb(0.3, 0.3, 0.3),
            size: 11.0.into(),
            ..Default::default()
        });

        vec![frame.into_geometry()]
    }
}
