use iced::widget::{
    button, canvas, column, container, image as image_widget, progress_bar, row, scrollable,
    stack, text, text_input, Column, Row,
};
use iced::{Alignment, Element, Length, Size, Task, Theme};
use rfd::FileDialog;
use std::net::SocketAddr;
use std::path::PathBuf;

mod crop;
mod limits;
mod server;
mod ui;
mod wizard;

use crop::output::{render_output, CropRendered, CropRequest};
use crop::{stepper, AspectRatio, CropArea, DisplayImage, Layout};
use limits::{usage_percent, Tier};
use wizard::validate::{mime_for_path, validate_selection, CandidateFile};
use wizard::{PhotoMetadata, PreviewRef, WizardState};

/// Wizard step sequencing: selection, cropping, description, review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WizardStep {
    Select,
    Edit,
    Metadata,
    Review,
}

/// One accepted file with its decoded dimensions, delivered by the loader
#[derive(Debug, Clone)]
struct LoadedFile {
    candidate: CandidateFile,
    natural: Option<(u32, u32)>,
}

/// Result of reading and validating a picked batch
#[derive(Debug, Clone)]
struct LoadedBatch {
    files: Vec<LoadedFile>,
    error: Option<String>,
}

/// The crop session for the file currently being edited
#[derive(Debug, Clone)]
struct EditSession {
    file_id: String,
    image: DisplayImage,
    ratio: AspectRatio,
    area: CropArea,
    rendering: bool,
}

/// Metadata form backing the description step
#[derive(Debug, Clone, Default)]
struct MetadataForm {
    title: String,
    description: String,
    tags: String,
}

/// Main application state
struct Brushstack {
    wizard: WizardState,
    step: WizardStep,
    layout: Layout,
    tier: Tier,
    editing: Option<EditSession>,
    metadata_index: usize,
    form: MetadataForm,
    status: String,
    error: Option<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    // Selection step
    PickFiles,
    FilesLoaded(LoadedBatch),
    RemoveFile(String),

    // Edit step
    EditFile(String),
    SelectRatio(AspectRatio),
    CropMoved(f32, f32),
    IncreaseCrop,
    DecreaseCrop,
    ApplyCrop,
    CropRendered(CropRendered),
    SkipEditing(String),
    ResetEdit(String),
    CloseEditor,

    // Metadata step
    DescribeFile(usize),
    TitleChanged(String),
    DescriptionChanged(String),
    TagsChanged(String),
    SaveMetadata,

    // Navigation
    NextStep,
    PreviousStep,
    Finish,

    WindowResized(Size),
}

impl Brushstack {
    fn new() -> (Self, Task<Message>) {
        let tier = Tier::Casual;
        println!(
            "🎨 Brushstack wizard ready ({} tier, {} photos per project)",
            tier.name(),
            tier.limits().max_photos_per_project
        );

        (
            Brushstack {
                wizard: WizardState::new(),
                step: WizardStep::Select,
                layout: Layout::Wide,
                tier,
                editing: None,
                metadata_index: 0,
                form: MetadataForm::default(),
                status: "Add photos of your minis to get started.".to_string(),
                error: None,
            },
            Task::none(),
        )
    }

    fn remaining_slots(&self) -> usize {
        let cap = self.tier.limits().max_photos_per_project as usize;
        cap.saturating_sub(self.wizard.len())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickFiles => {
                let picked = FileDialog::new()
                    .set_title("Select Photos")
                    .add_filter("Images", &["jpg", "jpeg", "png", "webp", "heic"])
                    .pick_files();

                if let Some(paths) = picked {
                    let remaining = self.remaining_slots();
                    self.status = format!("Reading {} file(s)...", paths.len());
                    return Task::perform(load_files(paths, remaining), Message::FilesLoaded);
                }
                Task::none()
            }

            Message::FilesLoaded(batch) => {
                self.error = batch.error;
                let count = batch.files.len();
                for loaded in batch.files {
                    let preview_bytes = loaded.candidate.bytes.clone();
                    let id = self.wizard.add_candidate(loaded.candidate);
                    if let Some((nw, nh)) = loaded.natural {
                        let image = DisplayImage::new(nw, nh, self.layout);
                        self.wizard
                            .set_preview(&id, PreviewRef::from_bytes(preview_bytes), Some(image));
                    }
                }
                if count > 0 {
                    self.status = format!("Added {} photo(s).", count);
                }
                Task::none()
            }

            Message::RemoveFile(id) => {
                if self.wizard.remove_file(&id) {
                    if self
                        .editing
                        .as_ref()
                        .is_some_and(|session| session.file_id == id)
                    {
                        self.editing = None;
                    }
                    self.status = "Photo removed.".to_string();
                }
                Task::none()
            }

            Message::EditFile(id) => {
                let Some(file) = self.wizard.file(&id) else {
                    return Task::none();
                };
                let Some(image) = file.image else {
                    self.error = Some(format!("{} could not be decoded for editing", file.name));
                    return Task::none();
                };

                let ratio = AspectRatio::Square;
                let Some(area) = CropArea::fit(&image, ratio, self.layout) else {
                    return Task::none();
                };
                self.wizard.begin_crop_session(&id);
                self.editing = Some(EditSession {
                    file_id: id,
                    image,
                    ratio,
                    area,
                    rendering: false,
                });
                Task::none()
            }

            Message::SelectRatio(ratio) => {
                if let Some(session) = self.editing.as_mut() {
                    // Ratio change refits from scratch; any dragged position
                    // is deliberately discarded
                    if let Some(area) = CropArea::fit(&session.image, ratio, self.layout) {
                        session.ratio = ratio;
                        session.area = area;
                        let file_id = session.file_id.clone();
                        self.wizard.begin_crop_session(&file_id);
                    }
                }
                Task::none()
            }

            Message::CropMoved(x, y) => {
                if let Some(session) = self.editing.as_mut() {
                    session.area.x = x;
                    session.area.y = y;
                }
                Task::none()
            }

            Message::IncreaseCrop => {
                if let Some(session) = self.editing.as_mut() {
                    session.area = stepper::increase(
                        &session.area,
                        &session.image,
                        session.ratio,
                        self.layout,
                    );
                }
                Task::none()
            }

            Message::DecreaseCrop => {
                if let Some(session) = self.editing.as_mut() {
                    session.area = stepper::decrease(
                        &session.area,
                        &session.image,
                        session.ratio,
                        self.layout,
                    );
                }
                Task::none()
            }

            Message::ApplyCrop => {
                let Some(session) = self.editing.as_mut() else {
                    return Task::none();
                };
                let Some(file) = self.wizard.file(&session.file_id) else {
                    return Task::none();
                };

                session.rendering = true;
                let request = CropRequest {
                    file_id: session.file_id.clone(),
                    generation: self.wizard.current_generation(),
                    source: file.bytes.clone(),
                    area: session.area,
                    image: session.image,
                    ratio: session.ratio,
                };
                self.status = "Cropping...".to_string();
                Task::perform(render_output(request), Message::CropRendered)
            }

            Message::CropRendered(rendered) => {
                if let Some(session) = self.editing.as_mut() {
                    if session.file_id == rendered.file_id {
                        session.rendering = false;
                    }
                }

                match self.wizard.apply_crop_result(&rendered) {
                    wizard::state::CropApplied::Applied => {
                        self.status = "Crop applied.".to_string();
                        self.editing = None;
                    }
                    wizard::state::CropApplied::StaleDiscarded => {}
                    wizard::state::CropApplied::RenderFailed => {
                        // Logged no-op: the file simply stays unprocessed
                        eprintln!("⚠️  Crop produced no output for {}", rendered.file_id);
                    }
                    wizard::state::CropApplied::UnknownFile => {}
                }
                Task::none()
            }

            Message::SkipEditing(id) => {
                self.wizard.mark_skipped(&id);
                if self
                    .editing
                    .as_ref()
                    .is_some_and(|session| session.file_id == id)
                {
                    self.editing = None;
                }
                self.status = "Photo kept as-is.".to_string();
                Task::none()
            }

            Message::ResetEdit(id) => {
                self.wizard.reset_edit(&id);
                self.status = "Edit state reset.".to_string();
                Task::none()
            }

            Message::CloseEditor => {
                self.editing = None;
                Task::none()
            }

            Message::DescribeFile(index) => {
                if index < self.wizard.len() {
                    self.metadata_index = index;
                    self.form = form_for(&self.wizard, index);
                }
                Task::none()
            }

            Message::TitleChanged(value) => {
                self.form.title = value;
                Task::none()
            }
            Message::DescriptionChanged(value) => {
                self.form.description = value;
                Task::none()
            }
            Message::TagsChanged(value) => {
                self.form.tags = value;
                Task::none()
            }

            Message::SaveMetadata => {
                if let Some(file) = self.wizard.files().get(self.metadata_index) {
                    let id = file.id.clone();
                    let tags: Vec<String> = self
                        .form
                        .tags
                        .split(',')
                        .map(|tag| tag.trim().to_string())
                        .filter(|tag| !tag.is_empty())
                        .collect();
                    self.wizard.set_metadata(
                        &id,
                        PhotoMetadata {
                            title: self.form.title.clone(),
                            description: self.form.description.clone(),
                            tags,
                        },
                    );
                    self.status = "Details saved.".to_string();
                }
                Task::none()
            }

            Message::NextStep => {
                self.step = match self.step {
                    WizardStep::Select if !self.wizard.is_empty() => WizardStep::Edit,
                    WizardStep::Edit if self.wizard.all_processed() => {
                        self.metadata_index = 0;
                        self.form = form_for(&self.wizard, 0);
                        WizardStep::Metadata
                    }
                    WizardStep::Metadata => WizardStep::Review,
                    step => step,
                };
                Task::none()
            }

            Message::PreviousStep => {
                self.step = match self.step {
                    WizardStep::Edit => {
                        self.editing = None;
                        WizardStep::Select
                    }
                    WizardStep::Metadata => WizardStep::Edit,
                    WizardStep::Review => WizardStep::Metadata,
                    step => step,
                };
                Task::none()
            }

            Message::Finish => {
                let shared = self.wizard.len();
                self.wizard.clear();
                self.editing = None;
                self.step = WizardStep::Select;
                self.status = format!("✅ Shared {} photo(s) to your project.", shared);
                println!(
                    "📊 Wizard finished: {} photos shared, {} previews released",
                    shared,
                    self.wizard.released_previews()
                );
                Task::none()
            }

            Message::WindowResized(size) => {
                self.layout = Layout::from_window_width(size.width);
                Task::none()
            }
        }
    }

    fn view(&self) -> Element<Message> {
        let body: Element<Message> = match self.step {
            WizardStep::Select => self.view_select(),
            WizardStep::Edit => self.view_edit(),
            WizardStep::Metadata => self.view_metadata(),
            WizardStep::Review => self.view_review(),
        };

        let mut content = column![text("Brushstack").size(32), body]
            .spacing(16)
            .padding(24);

        if let Some(error) = &self.error {
            content = content.push(text(format!("⚠ {}", error)).size(14));
        }
        content = content.push(text(&self.status).size(14));

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Step 1: pick files, show the accepted list and the tier usage bar
    fn view_select(&self) -> Element<Message> {
        let limits = self.tier.limits();
        let used = self.wizard.len() as u32;
        let percent = usage_percent(used, limits.max_photos_per_project);

        let mut files: Column<Message> = Column::new().spacing(8);
        for file in self.wizard.files() {
            let label = format!("{} ({} KB)", file.name, file.size / 1024);
            files = files.push(
                row![
                    text(label).size(14).width(Length::Fill),
                    button("Remove").on_press(Message::RemoveFile(file.id.clone())),
                ]
                .spacing(8)
                .align_y(Alignment::Center),
            );
        }

        column![
            text("Step 1 of 4 — Select photos").size(20),
            button("Add Photos")
                .on_press_maybe((self.remaining_slots() > 0).then_some(Message::PickFiles))
                .padding(10),
            text(format!(
                "{} / {} photos ({} tier)",
                used,
                limits.max_photos_per_project,
                self.tier.name()
            ))
            .size(14),
            progress_bar(0.0..=100.0, percent).height(8.0),
            scrollable(files).height(Length::Fill),
            button("Next: Edit")
                .on_press_maybe((!self.wizard.is_empty()).then_some(Message::NextStep)),
        ]
        .spacing(12)
        .into()
    }

    /// Step 2: crop or skip each photo
    fn view_edit(&self) -> Element<Message> {
        if let Some(session) = &self.editing {
            return self.view_crop_session(session);
        }

        let mut files: Column<Message> = Column::new().spacing(8);
        for file in self.wizard.files() {
            let marker = if file.is_processed() {
                if file.edit.skip_editing {
                    "kept as-is"
                } else {
                    "cropped"
                }
            } else {
                "pending"
            };

            let mut actions: Row<Message> = row![].spacing(8);
            if file.is_processed() {
                actions =
                    actions.push(button("Reset").on_press(Message::ResetEdit(file.id.clone())));
            } else {
                actions = actions
                    .push(button("Crop").on_press(Message::EditFile(file.id.clone())))
                    .push(button("Keep as-is").on_press(Message::SkipEditing(file.id.clone())));
            }

            files = files.push(
                row![
                    text(format!("{} — {}", file.name, marker))
                        .size(14)
                        .width(Length::Fill),
                    actions,
                ]
                .spacing(8)
                .align_y(Alignment::Center),
            );
        }

        column![
            text("Step 2 of 4 — Edit photos").size(20),
            scrollable(files).height(Length::Fill),
            row![
                button("Back").on_press(Message::PreviousStep),
                button("Next: Describe")
                    .on_press_maybe(self.wizard.all_processed().then_some(Message::NextStep)),
            ]
            .spacing(8),
        ]
        .spacing(12)
        .into()
    }

    /// The active crop editor: preview image, overlay, ratio and size controls
    fn view_crop_session<'a>(&'a self, session: &'a EditSession) -> Element<'a, Message> {
        let Some(file) = self.wizard.file(&session.file_id) else {
            return column![text("Photo no longer available")].into();
        };

        let width = Length::Fixed(session.image.display_width);
        let height = Length::Fixed(session.image.display_height);

        let editor: Element<Message> = match &file.preview {
            Some(preview) => stack![
                image_widget(preview.handle().clone())
                    .width(width)
                    .height(height),
                canvas(ui::crop_canvas::CropCanvas {
                    image: &session.image,
                    area: &session.area,
                })
                .width(width)
                .height(height),
            ]
            .into(),
            None => text("Preview unavailable").into(),
        };

        let mut ratios: Row<Message> = row![].spacing(8);
        for ratio in AspectRatio::CROPPABLE {
            let label = format!(
                "{}{}",
                if ratio == session.ratio { "• " } else { "" },
                ratio
            );
            ratios = ratios.push(button(text(label)).on_press(Message::SelectRatio(ratio)));
        }

        let can_grow = stepper::can_increase(&session.area, &session.image);
        let can_shrink = stepper::can_decrease(&session.area);

        column![
            text(format!("Cropping {}", file.name)).size(20),
            editor,
            ratios,
            row![
                button("−").on_press_maybe(can_shrink.then_some(Message::DecreaseCrop)),
                button("+").on_press_maybe(can_grow.then_some(Message::IncreaseCrop)),
                button(if session.rendering {
                    "Cropping..."
                } else {
                    "Apply Crop"
                })
                .on_press_maybe((!session.rendering).then_some(Message::ApplyCrop)),
                button("Keep as-is").on_press(Message::SkipEditing(session.file_id.clone())),
                button("Cancel").on_press(Message::CloseEditor),
            ]
            .spacing(8),
        ]
        .spacing(12)
        .align_x(Alignment::Center)
        .into()
    }

    /// Step 3: title, description, and tags per photo
    fn view_metadata(&self) -> Element<Message> {
        let total = self.wizard.len();
        let name = self
            .wizard
            .files()
            .get(self.metadata_index)
            .map(|f| f.name.clone())
            .unwrap_or_default();

        let previous = self.metadata_index.checked_sub(1);
        let next = (self.metadata_index + 1 < total).then_some(self.metadata_index + 1);

        column![
            text("Step 3 of 4 — Describe photos").size(20),
            text(format!(
                "{} ({} of {})",
                name,
                self.metadata_index + 1,
                total
            ))
            .size(14),
            text_input("Title", &self.form.title).on_input(Message::TitleChanged),
            text_input("Description", &self.form.description)
                .on_input(Message::DescriptionChanged),
            text_input("Tags (comma separated)", &self.form.tags).on_input(Message::TagsChanged),
            row![
                button("Previous photo").on_press_maybe(previous.map(Message::DescribeFile)),
                button("Save").on_press(Message::SaveMetadata),
                button("Next photo").on_press_maybe(next.map(Message::DescribeFile)),
            ]
            .spacing(8),
            row![
                button("Back").on_press(Message::PreviousStep),
                button("Next: Review").on_press(Message::NextStep),
            ]
            .spacing(8),
        ]
        .spacing(12)
        .into()
    }

    /// Step 4: summary and final share
    fn view_review(&self) -> Element<Message> {
        let mut files: Column<Message> = Column::new().spacing(8);
        for file in self.wizard.files() {
            let outcome = if file.edit.skip_editing {
                "original".to_string()
            } else {
                format!("cropped ({})", file.edit.aspect_ratio)
            };
            let title = if file.metadata.title.is_empty() {
                "(untitled)"
            } else {
                &file.metadata.title
            };
            files = files.push(text(format!("{} — {} — {}", file.name, outcome, title)).size(14));
        }

        column![
            text("Step 4 of 4 — Review").size(20),
            scrollable(files).height(Length::Fill),
            row![
                button("Back").on_press(Message::PreviousStep),
                button("Share").on_press(Message::Finish),
            ]
            .spacing(8),
        ]
        .spacing(12)
        .into()
    }

    fn subscription(&self) -> iced::Subscription<Message> {
        iced::event::listen_with(|event, _status, _window| match event {
            iced::Event::Window(iced::window::Event::Resized(size)) => {
                Some(Message::WindowResized(size))
            }
            _ => None,
        })
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Build the metadata form for the file at an index
fn form_for(wizard: &WizardState, index: usize) -> MetadataForm {
    match wizard.files().get(index) {
        Some(file) => MetadataForm {
            title: file.metadata.title.clone(),
            description: file.metadata.description.clone(),
            tags: file.metadata.tags.join(", "),
        },
        None => MetadataForm::default(),
    }
}

/// Read, validate, and decode a picked batch of files
///
/// Runs off the UI thread; decode happens on a blocking worker because
/// image parsing is CPU-bound.
async fn load_files(paths: Vec<PathBuf>, remaining_slots: usize) -> LoadedBatch {
    let mut candidates = Vec::new();
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        match tokio::fs::read(&path).await {
            Ok(bytes) => candidates.push(CandidateFile {
                name,
                size: bytes.len() as u64,
                mime: mime_for_path(&path),
                bytes,
            }),
            Err(e) => {
                eprintln!("⚠️  Could not read {}: {}", name, e);
            }
        }
    }

    let outcome = validate_selection(candidates, remaining_slots);
    let error = outcome.error;
    let accepted = outcome.accepted;

    let files = tokio::task::spawn_blocking(move || {
        use image::GenericImageView;

        accepted
            .into_iter()
            .map(|candidate| {
                let natural = image::load_from_memory(&candidate.bytes)
                    .ok()
                    .map(|img| (img.width(), img.height()));
                LoadedFile { candidate, natural }
            })
            .collect::<Vec<_>>()
    })
    .await;

    match files {
        Ok(files) => LoadedBatch { files, error },
        Err(e) => LoadedBatch {
            files: Vec::new(),
            error: error.or_else(|| Some(format!("Failed to decode photos: {}", e))),
        },
    }
}

fn main() -> iced::Result {
    // `brushstack serve` runs the HTTP functions instead of the wizard UI
    if std::env::args().nth(1).as_deref() == Some("serve") {
        run_functions_server();
        return Ok(());
    }

    iced::application("Brushstack", Brushstack::update, Brushstack::view)
        .subscription(Brushstack::subscription)
        .theme(Brushstack::theme)
        .centered()
        .run_with(Brushstack::new)
}

/// Blocking entry for the functions server
fn run_functions_server() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr: SocketAddr = std::env::var("FUNCTIONS_ADDR")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8787)));

    let runtime = tokio::runtime::Runtime::new().expect("Failed to start the tokio runtime");
    if let Err(e) = runtime.block_on(server::serve(addr)) {
        eprintln!("⚠️  Functions server exited with error: {}", e);
    }
}
