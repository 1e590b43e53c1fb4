use iced::widget::canvas::Canvas;
use iced::widget::{button, column, container, row, text, Space};
use iced::{Alignment, Element, Length, Subscription, Task};
use iced_aw::{tab_bar, TabLabel};
use std::path::PathBuf;

mod data;
mod engine;
mod file;
mod settings;
mod timeline;
mod ui;

use data::{ChartConfig, Dataset};
use engine::ticks::format_long;
use engine::ChartEngine;
use file::{ChartTab, DatasetLoadState, DatasetTab};
use settings::SettingsPage;
use timeline::header::HeaderProgram;
use timeline::overview::OverviewProgram;
use timeline::{ChartProgram, DETAILS_HEIGHT, HEADER_HEIGHT, OVERVIEW_HEIGHT};

pub fn main() -> iced::Result {
    env_logger::init();
    iced::application(Spanline::new, Spanline::update, Spanline::view)
        .title(Spanline::title)
        .subscription(Spanline::subscription)
        .run()
}

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(usize),
    OpenFile,
    FileSelected(PathBuf),
    FileLoaded(PathBuf, Result<Dataset, String>),
    CloseTab(usize),
    OpenSettings,
    ActivityPressed(u64),
    LeftIndicatorPressed(u64),
    RightIndicatorPressed(u64),
    ChartPanned { dx: f32 },
    ChartZoomed { factor: f32, anchor_x: f32 },
    ChartResized { width: f32, height: f32 },
    ResetView,
    AnimationTick(iced::time::Instant),
    WindowResized(iced::Size),
    None,
}

struct Spanline {
    active_tab: usize,
    tabs: Vec<DatasetTab>,
    show_settings: bool,
    config: ChartConfig,
    settings: SettingsPage,
    last_tick: Option<iced::time::Instant>,
}

fn load_task(path: PathBuf, config: ChartConfig) -> Task<Message> {
    Task::perform(
        async move {
            let result = data::load_dataset(&path, &config).map_err(|error| format!("{error:#}"));
            Message::FileLoaded(path, result)
        },
        |message| message,
    )
}

impl Spanline {
    fn new() -> (Self, Task<Message>) {
        let config = ChartConfig::default();
        let mut app = Spanline {
            active_tab: 0,
            tabs: Vec::new(),
            show_settings: false,
            config: config.clone(),
            settings: SettingsPage,
            last_tick: None,
        };

        let mut initial_task = Task::none();
        if let Some(path_str) = std::env::args().nth(1) {
            let path = PathBuf::from(path_str);
            app.tabs.push(DatasetTab {
                path: path.clone(),
                load_state: DatasetLoadState::Loading,
            });
            initial_task = load_task(path, config);
        }

        (app, initial_task)
    }

    fn title(&self) -> String {
        if self.show_settings {
            return "Spanline - Settings".to_string();
        }
        if let Some(tab) = self.tabs.get(self.active_tab) {
            tab.title()
        } else {
            "Spanline - activity timeline viewer".to_string()
        }
    }

    fn active_engine_mut(&mut self) -> Option<&mut ChartEngine> {
        self.tabs
            .get_mut(self.active_tab)
            .and_then(DatasetTab::chart_mut)
            .map(|chart| &mut chart.engine)
    }

    fn log_notices(&mut self) {
        if let Some(engine) = self.active_engine_mut() {
            for notice in engine.drain_notices() {
                log::info!("notice: {notice:?}");
            }
        }
    }

    fn is_animating(&self) -> bool {
        self.tabs
            .iter()
            .filter_map(DatasetTab::chart)
            .any(|chart| chart.engine.scene().is_animating())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(index) => {
                self.active_tab = index;
                self.show_settings = false;
            }
            Message::OpenFile => {
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .add_filter("timeline dataset", &["json"])
                            .pick_file()
                            .await
                    },
                    |file_handle| {
                        if let Some(handle) = file_handle {
                            Message::FileSelected(handle.path().to_path_buf())
                        } else {
                            Message::None
                        }
                    },
                );
            }
            Message::FileSelected(path) => {
                self.tabs.push(DatasetTab {
                    path: path.clone(),
                    load_state: DatasetLoadState::Loading,
                });
                self.active_tab = self.tabs.len() - 1;
                self.show_settings = false;
                return load_task(path, self.config.clone());
            }
            Message::FileLoaded(path, result) => {
                let Some(tab) = self.tabs.iter_mut().find(|tab| {
                    tab.path == path && matches!(tab.load_state, DatasetLoadState::Loading)
                }) else {
                    return Task::none();
                };

                match result {
                    Ok(dataset) => {
                        log::info!(
                            "loaded {}: {} activities, {} markers, {} skipped",
                            path.display(),
                            dataset.activities.len(),
                            dataset.markers.len(),
                            dataset.skipped
                        );

                        let mut engine = ChartEngine::new(&self.config);
                        let activity_total = dataset.activities.len();
                        let marker_total = dataset.markers.len();
                        engine.add(dataset.activities);
                        engine.add_markers(dataset.markers);

                        tab.load_state = DatasetLoadState::Ready(Box::new(ChartTab {
                            engine,
                            activity_total,
                            marker_total,
                            skipped: dataset.skipped,
                        }));
                    }
                    Err(error) => {
                        log::warn!("failed to load {}: {error}", path.display());
                        tab.load_state = DatasetLoadState::Error(error);
                    }
                }
            }
            Message::CloseTab(index) => {
                if index < self.tabs.len() {
                    self.tabs.remove(index);
                    if self.active_tab >= self.tabs.len() && !self.tabs.is_empty() {
                        self.active_tab = self.tabs.len() - 1;
                    }
                }
            }
            Message::OpenSettings => {
                self.show_settings = true;
            }
            Message::ActivityPressed(id) => {
                if let Some(engine) = self.active_engine_mut() {
                    engine.click_activity(id);
                }
                self.log_notices();
            }
            Message::LeftIndicatorPressed(id) => {
                if let Some(engine) = self.active_engine_mut() {
                    engine.click_left_indicator(id);
                }
                self.log_notices();
            }
            Message::RightIndicatorPressed(id) => {
                if let Some(engine) = self.active_engine_mut() {
                    engine.click_right_indicator(id);
                }
                self.log_notices();
            }
            Message::ChartPanned { dx } => {
                if let Some(engine) = self.active_engine_mut() {
                    engine.pan(dx as f64);
                }
            }
            Message::ChartZoomed { factor, anchor_x } => {
                if let Some(engine) = self.active_engine_mut() {
                    engine.zoom(factor as f64, anchor_x as f64);
                }
            }
            Message::ChartResized { width, height } => {
                if let Some(engine) = self.active_engine_mut() {
                    engine.resize(width as f64, height as f64);
                }
            }
            Message::ResetView => {
                if let Some(engine) = self.active_engine_mut() {
                    engine.reset_view();
                }
            }
            Message::AnimationTick(now) => {
                let dt_ms = self
                    .last_tick
                    .map(|last| now.duration_since(last).as_secs_f64() * 1000.0)
                    .unwrap_or(16.0);
                self.last_tick = Some(now);
                for tab in &mut self.tabs {
                    if let Some(chart) = tab.chart_mut() {
                        chart.engine.tick(dt_ms);
                    }
                }
                if !self.is_animating() {
                    self.last_tick = None;
                }
            }
            Message::WindowResized(size) => {
                // The chart canvas publishes exact bounds itself; this is the
                // coarse fallback so an idle chart follows the window too.
                let chrome = 40.0 + HEADER_HEIGHT + OVERVIEW_HEIGHT + DETAILS_HEIGHT;
                let width = size.width as f64;
                let height = (size.height - chrome).max(100.0) as f64;
                for tab in &mut self.tabs {
                    if let Some(chart) = tab.chart_mut() {
                        chart.engine.resize(width, height);
                    }
                }
            }
            Message::None => {}
        }
        Task::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let resize =
            iced::window::resize_events().map(|(_id, size)| Message::WindowResized(size));
        if self.is_animating() {
            Subscription::batch([
                resize,
                iced::time::every(std::time::Duration::from_millis(16))
                    .map(Message::AnimationTick),
            ])
        } else {
            resize
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let mut bar = tab_bar::TabBar::new(Message::TabSelected).on_close(Message::CloseTab);
        for (index, tab) in self.tabs.iter().enumerate() {
            bar = bar.push(index, TabLabel::Text(tab.title()));
        }
        if !self.tabs.is_empty() && !self.show_settings {
            bar = bar.set_active_tab(&self.active_tab);
        }

        let mut header = row![bar, Space::new().width(Length::Fill)];
        if self
            .tabs
            .get(self.active_tab)
            .and_then(DatasetTab::chart)
            .is_some()
            && !self.show_settings
        {
            header = header.push(
                button("Reset view")
                    .style(ui::neutral_button_style)
                    .on_press(Message::ResetView),
            );
        }
        let header = header
            .push(
                button("Settings")
                    .style(ui::neutral_button_style)
                    .on_press(Message::OpenSettings),
            )
            .push(button("Open").on_press(Message::OpenFile))
            .spacing(10)
            .padding(5)
            .align_y(Alignment::Center);

        let content: Element<'_, Message> = if self.show_settings {
            self.settings.view(self.tabs.len())
        } else if let Some(tab) = self.tabs.get(self.active_tab) {
            self.chart_view(tab)
        } else {
            container(text("Open a dataset to start").size(20))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into()
        };

        column![header, content].into()
    }

    fn chart_view<'a>(&self, tab: &'a DatasetTab) -> Element<'a, Message> {
        let chart = match &tab.load_state {
            DatasetLoadState::Loading => {
                return centered_note(format!("Loading {}...", tab.title()));
            }
            DatasetLoadState::Error(error) => {
                return centered_note(format!("Failed to load {}: {error}", tab.title()));
            }
            DatasetLoadState::Ready(chart) => chart.as_ref(),
        };
        let engine = &chart.engine;

        let axis = Canvas::new(HeaderProgram { ticks: engine.view_ticks() })
            .width(Length::Fill)
            .height(Length::Fixed(HEADER_HEIGHT));

        let chart_canvas = Canvas::new(ChartProgram { engine })
            .width(Length::Fill)
            .height(Length::Fill);

        let (start_label, end_label) = engine.overview_labels();
        let overview = Canvas::new(OverviewProgram { start_label, end_label })
            .width(Length::Fill)
            .height(Length::Fixed(OVERVIEW_HEIGHT));

        let details: Element<'a, Message> = if let Some(activity) = engine.selected() {
            let end_text = match activity.end_ms {
                Some(end_ms) => format_long(end_ms),
                None => "ongoing".to_string(),
            };
            let duration = activity.effective_end(chrono::Utc::now().timestamp_millis())
                - activity.begin_ms;
            container(
                column![
                    text(activity.label.clone()).size(20),
                    text(format!("Begin: {}", format_long(activity.begin_ms))),
                    text(format!("End: {end_text}")),
                    text(format!("Duration: {}", format_duration(duration))),
                ]
                .spacing(5)
                .padding(10),
            )
            .width(Length::Fill)
            .height(Length::Fixed(DETAILS_HEIGHT))
            .style(ui::panel_style)
            .into()
        } else {
            let mut summary = format!(
                "{} activities, {} markers",
                chart.activity_total, chart.marker_total
            );
            if chart.skipped > 0 {
                summary.push_str(&format!(", {} malformed items skipped", chart.skipped));
            }
            container(
                column![
                    text("Select an activity to see details"),
                    text(summary).size(12),
                ]
                .spacing(5)
                .padding(10),
            )
            .width(Length::Fill)
            .height(Length::Fixed(DETAILS_HEIGHT))
            .center_x(Length::Fill)
            .style(ui::panel_style)
            .into()
        };

        column![axis, chart_canvas, overview, details].into()
    }
}

fn centered_note(message: String) -> Element<'static, Message> {
    container(text(message))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

fn format_duration(ms: i64) -> String {
    let seconds = ms / 1000;
    if seconds < 60 {
        return format!("{seconds} s");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{} min {} s", minutes, seconds % 60);
    }
    let hours = minutes / 60;
    if hours < 48 {
        return format!("{} h {} min", hours, minutes % 60);
    }
    format!("{} d {} h", hours / 24, hours % 24)
}
