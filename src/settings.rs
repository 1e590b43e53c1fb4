use crate::Message;
use iced::widget::{column, container, row, text};
use iced::{Element, Length};

#[derive(Debug, Default)]
pub struct SettingsPage;

impl SettingsPage {
    pub fn view(&self, open_tabs: usize) -> Element<'_, Message> {
        let hint = |gesture: &str, effect: &str| {
            row![
                text(gesture.to_string()).width(Length::Fixed(200.0)).size(12),
                text(effect.to_string()).size(12)
            ]
        };

        let hints = column![
            text("Hints").size(16),
            hint("Left click on a bar:", "Select the activity and show details"),
            hint("Left click + drag:", "Pan the timeline"),
            hint("Mouse wheel:", "Zoom horizontally centered on the cursor"),
            hint("Horizontal wheel:", "Pan horizontally"),
            hint(
                "Left arrow click:",
                "Jump to an activity that scrolled off the left edge"
            ),
            hint(
                "Right arrow click:",
                "Notifies about an activity past the right edge"
            ),
            hint("Reset view:", "Clear the current pan and zoom"),
        ]
        .spacing(6)
        .padding(6);

        let settings_col = column![
            text("Settings").size(20),
            text(format!("Currently managing {open_tabs} open datasets")).size(12),
            container(hints).padding(6).style(|_theme: &iced::Theme| {
                container::Style::default().background(iced::Color::from_rgb(0.99, 0.99, 0.99))
            }),
        ]
        .spacing(8)
        .padding(10);

        container(settings_col)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .style(crate::ui::panel_style)
            .into()
    }
}
