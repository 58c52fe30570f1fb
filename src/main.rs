use iced::keyboard::{self, key::Named, Key, Modifiers};
use iced::widget::{button, column, container, image as picture, row, slider, text};
use iced::{Alignment, Element, Length, Size, Subscription, Task, Theme};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

mod imaging;
mod state;
#[cfg(test)]
mod test_util;

use state::save::SaveReport;
use state::session::{BatchSession, DEFAULT_THRESHOLD, MAX_THRESHOLD, MIN_THRESHOLD};

const APP_TITLE: &str = "monoscan";

const WINDOW_WIDTH: f32 = 1000.0;
const WINDOW_HEIGHT: f32 = 800.0;

/// Extensions offered by the open dialog.
const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "tif", "tiff", "gif"];

/// Main application state
struct MonoScan {
    /// The batch of opened images and their thresholds
    session: BatchSession,
    /// Encoded preview of the current image as opened
    input_preview: Option<picture::Handle>,
    /// Encoded preview of the current image after thresholding
    output_preview: Option<picture::Handle>,
    /// Window size, previews are rendered to fit it
    window: Size,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User asked to open files
    OpenFiles,
    /// User asked to save the batch
    SaveAll,
    /// Slider moved
    ThresholdChanged(u8),
    /// Keyboard threshold adjustment, clamped to the valid range
    AdjustThreshold(i16),
    NextImage,
    PrevImage,
    WindowResized(Size),
}

impl MonoScan {
    fn new() -> (Self, Task<Message>) {
        (
            MonoScan {
                session: BatchSession::new(),
                input_preview: None,
                output_preview: None,
                window: Size::new(WINDOW_WIDTH, WINDOW_HEIGHT),
                status: String::from("Open images to begin."),
            },
            Task::none(),
        )
    }

    fn title(&self) -> String {
        match self.session.current_entry() {
            Some(entry) => format!("{APP_TITLE} | {}", entry.filename),
            None => APP_TITLE.to_string(),
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFiles => self.open_files(),
            Message::SaveAll => self.save_all(),
            Message::ThresholdChanged(value) => {
                if !self.session.is_empty() {
                    self.session.set_threshold(value);
                    self.refresh_output_preview();
                }
            }
            Message::AdjustThreshold(delta) => {
                if let Some(entry) = self.session.current_entry() {
                    let value = (i16::from(entry.threshold) + delta)
                        .clamp(i16::from(MIN_THRESHOLD), i16::from(MAX_THRESHOLD))
                        as u8;
                    self.session.set_threshold(value);
                    self.refresh_output_preview();
                }
            }
            Message::NextImage => {
                if self.session.next() {
                    self.refresh_previews();
                }
            }
            Message::PrevImage => {
                if self.session.prev() {
                    self.refresh_previews();
                }
            }
            Message::WindowResized(size) => {
                self.window = size;
                if !self.session.is_empty() {
                    self.refresh_previews();
                }
            }
        }

        Task::none()
    }

    fn view(&self) -> Element<Message> {
        let loaded = !self.session.is_empty();
        let threshold = self
            .session
            .current_entry()
            .map(|entry| entry.threshold)
            .unwrap_or(DEFAULT_THRESHOLD);

        let controls = row![
            button("Open").on_press(Message::OpenFiles).padding(10),
            slider(MIN_THRESHOLD..=MAX_THRESHOLD, threshold, Message::ThresholdChanged)
                .width(Length::Fill),
            button("Save")
                .on_press_maybe(loaded.then_some(Message::SaveAll))
                .padding(10),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let navigation = row![
            button("<<")
                .on_press_maybe(loaded.then_some(Message::PrevImage))
                .width(50),
            container(text(format!("{threshold}%")))
                .width(Length::Fill)
                .center_x(Length::Fill),
            button(">>")
                .on_press_maybe(loaded.then_some(Message::NextImage))
                .width(50),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let input_view: Element<Message> = match &self.input_preview {
            Some(handle) => picture(handle.clone()).into(),
            None => text("Click \"Open\" to load image.").into(),
        };
        let output_view: Element<Message> = match &self.output_preview {
            Some(handle) => picture(handle.clone()).into(),
            None => text("Output preview will be here.").into(),
        };

        let previews = row![
            container(input_view)
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
            container(output_view)
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        ]
        .spacing(10);

        let content = column![
            controls,
            navigation,
            previews,
            text(&self.status).size(14),
        ]
        .spacing(10)
        .padding(10);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let keys = keyboard::on_key_press(handle_key);
        let resizes = iced::window::resize_events().map(|(_id, size)| Message::WindowResized(size));
        Subscription::batch([keys, resizes])
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn open_files(&mut self) {
        let Some(paths) = FileDialog::new()
            .set_title("Open file")
            .add_filter("Image files", &IMAGE_EXTENSIONS)
            .pick_files()
        else {
            return;
        };
        if paths.is_empty() {
            return;
        }

        match self.session.open_files(&paths) {
            Ok(()) => {
                self.status = format!("Loaded {} image(s).", self.session.len());
                self.refresh_previews();
            }
            Err(err) => {
                // The whole open aborted; whatever batch was active before
                // is still intact, so the previews stay as they were.
                log::error!("open failed: {err}");
                self.status = format!("Could not open images: {err}");
                MessageDialog::new()
                    .set_level(MessageLevel::Error)
                    .set_title(APP_TITLE)
                    .set_description(format!("Could not open the selected images.\n\n{err}"))
                    .set_buttons(MessageButtons::Ok)
                    .show();
            }
        }
    }

    fn save_all(&mut self) {
        if self.session.is_empty() {
            return;
        }

        let mut dialog = FileDialog::new().set_title("Save to Folder");
        if let Some(dir) = self.session.default_output_dir() {
            dialog = dialog.set_directory(dir);
        }
        let Some(directory) = dialog.pick_folder() else {
            return;
        };

        let report = self.session.save_all(&directory, |filename, dirname| {
            let result = MessageDialog::new()
                .set_level(MessageLevel::Warning)
                .set_title(APP_TITLE)
                .set_description(format!(
                    "\"{filename}\" already exists. Do you want to replace it?\n\n\
                     A file with the same name already exists in the folder \
                     \"{dirname}\". Replacing it will overwrite it.\n\n\
                     Tip: If you do not want to replace it, click \"Cancel\" and \
                     select a different folder."
                ))
                .set_buttons(MessageButtons::OkCancel)
                .show();
            matches!(result, MessageDialogResult::Ok)
        });

        self.report_save(&directory.display().to_string(), &report);
    }

    fn report_save(&mut self, directory: &str, report: &SaveReport) {
        if report.is_clean() {
            self.status = format!(
                "Saved {} image(s), skipped {}.",
                report.written.len(),
                report.skipped.len()
            );
            MessageDialog::new()
                .set_level(MessageLevel::Info)
                .set_title(APP_TITLE)
                .set_description(format!(
                    "Saved output images to the selected folder.\n\nSaved image files to \"{directory}\""
                ))
                .set_buttons(MessageButtons::Ok)
                .show();
        } else {
            let failures: Vec<String> = report
                .failed
                .iter()
                .map(|(path, err)| format!("{}: {err}", path.display()))
                .collect();
            self.status = format!(
                "Saved {} image(s), {} failed.",
                report.written.len(),
                report.failed.len()
            );
            MessageDialog::new()
                .set_level(MessageLevel::Warning)
                .set_title(APP_TITLE)
                .set_description(format!(
                    "Some images could not be saved:\n\n{}",
                    failures.join("\n")
                ))
                .set_buttons(MessageButtons::Ok)
                .show();
        }
    }

    /// Target size for one preview pane: half the window minus chrome.
    fn preview_target(&self) -> (u32, u32) {
        let width = ((self.window.width - 50.0) / 2.0).max(1.0) as u32;
        let height = (self.window.height - 180.0).max(1.0) as u32;
        (width, height)
    }

    fn refresh_previews(&mut self) {
        self.refresh_input_preview();
        self.refresh_output_preview();
    }

    fn refresh_input_preview(&mut self) {
        let Some(entry) = self.session.current_entry() else {
            self.input_preview = None;
            return;
        };
        match entry.input_preview(self.preview_target()) {
            Ok(preview) => {
                self.input_preview = Some(picture::Handle::from_bytes(preview.bytes));
            }
            Err(err) => {
                log::error!("input preview failed: {err}");
                self.status = format!("Preview failed: {err}");
            }
        }
    }

    fn refresh_output_preview(&mut self) {
        let Some(entry) = self.session.current_entry() else {
            self.output_preview = None;
            return;
        };
        match entry.output_preview(self.preview_target()) {
            Ok(preview) => {
                self.output_preview = Some(picture::Handle::from_bytes(preview.bytes));
            }
            Err(err) => {
                log::error!("output preview failed: {err}");
                self.status = format!("Preview failed: {err}");
            }
        }
    }
}

fn handle_key(key: Key, modifiers: Modifiers) -> Option<Message> {
    match key.as_ref() {
        Key::Named(Named::ArrowRight) if modifiers.shift() => Some(Message::AdjustThreshold(5)),
        Key::Named(Named::ArrowRight) => Some(Message::AdjustThreshold(1)),
        Key::Named(Named::ArrowLeft) if modifiers.shift() => Some(Message::AdjustThreshold(-5)),
        Key::Named(Named::ArrowLeft) => Some(Message::AdjustThreshold(-1)),
        Key::Named(Named::PageDown) => Some(Message::NextImage),
        Key::Named(Named::PageUp) => Some(Message::PrevImage),
        Key::Character("o") if modifiers.command() => Some(Message::OpenFiles),
        Key::Character("s") if modifiers.command() => Some(Message::SaveAll),
        _ => None,
    }
}

fn main() -> iced::Result {
    env_logger::init();

    iced::application(MonoScan::title, MonoScan::update, MonoScan::view)
        .subscription(MonoScan::subscription)
        .theme(MonoScan::theme)
        .window_size(Size::new(WINDOW_WIDTH, WINDOW_HEIGHT))
        .centered()
        .run_with(MonoScan::new)
}
