use std::fmt;
use std::time::Duration;

use iced::{
    widget::{button, column, container, pick_list, row, text, text_editor, text_input},
    Alignment, Element, Length, Subscription, Task, Theme,
    clipboard,
    keyboard::{self, Key},
    event::{self, Event as IcedEvent},
};
use metaprompt_forge::{
    config::Config, ollama::DEFAULT_HOST, ForgeError, MetaPrompt, ModelDirectory, OllamaClient,
    ServerEndpoint,
};

#[derive(Debug, Clone)]
pub enum Message {
    QueryEdited(text_editor::Action),
    OutputEdited(text_editor::Action),
    AddressChanged(String),
    ModelSelected(String),
    RefreshModels,
    ModelsLoaded(Result<Vec<String>, ForgeError>),
    Generate,
    Generated(Result<String, ForgeError>),
    CopyOutput,
}

/// Text shown in the status line.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Ready,
    FetchingModels,
    ModelsLoaded,
    ModelsFailed(ForgeError),
    Generating,
    EmptyQuery,
    GenerateFailed(ForgeError),
    Copied,
    NothingToCopy,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => write!(f, "Ready"),
            Status::FetchingModels => write!(f, "Fetching models..."),
            Status::ModelsLoaded => write!(f, "Models loaded successfully"),
            Status::ModelsFailed(e) => write!(f, "Failed to fetch models: {e}"),
            Status::Generating => write!(f, "Generating prompt..."),
            Status::EmptyQuery => write!(f, "Error: Query cannot be empty!"),
            Status::GenerateFailed(e) => write!(f, "Error: {e}"),
            Status::Copied => write!(f, "Prompt copied to clipboard"),
            Status::NothingToCopy => write!(f, "No prompt to copy"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Requesting,
}

pub struct App {
    endpoint: ServerEndpoint,
    directory: ModelDirectory,
    template: MetaPrompt,
    timeout: Option<Duration>,
    query: text_editor::Content,
    output: text_editor::Content,
    status: Status,
    phase: Phase,
    refreshing: bool,
}

/// Run a blocking core call off the UI thread.
async fn run_blocking<T, F>(job: F) -> Result<T, ForgeError>
where
    F: FnOnce() -> Result<T, ForgeError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .unwrap_or_else(|e| Err(ForgeError::unreachable(format!("background worker failed: {e}"))))
}

impl App {
    pub fn new(config: Config) -> (Self, Task<Message>) {
        let mut app = App {
            endpoint: config.endpoint(),
            directory: ModelDirectory::default(),
            template: config.meta_prompt(),
            timeout: config.timeout(),
            query: text_editor::Content::new(),
            output: text_editor::Content::new(),
            status: Status::Ready,
            phase: Phase::Idle,
            refreshing: false,
        };

        let task = app.fetch_models();
        (app, task)
    }

    fn fetch_models(&mut self) -> Task<Message> {
        self.refreshing = true;
        self.status = Status::FetchingModels;

        let address = self.endpoint.address.clone();
        let timeout = self.timeout;
        Task::perform(
            run_blocking(move || OllamaClient::new(timeout)?.list_models(&address)),
            Message::ModelsLoaded,
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::QueryEdited(action) => {
                self.query.perform(action);
                Task::none()
            }
            Message::OutputEdited(action) => {
                // Selection and scrolling only; the output pane is read-only.
                if !action.is_edit() {
                    self.output.perform(action);
                }
                Task::none()
            }
            Message::AddressChanged(address) => {
                self.endpoint.address = address;
                Task::none()
            }
            Message::ModelSelected(model) => {
                self.endpoint.selected_model = model;
                Task::none()
            }
            Message::RefreshModels => {
                if self.refreshing {
                    return Task::none();
                }
                self.fetch_models()
            }
            Message::ModelsLoaded(result) => {
                self.refreshing = false;
                match result {
                    Ok(names) => {
                        self.directory.replace(names);
                        if self.directory.is_empty() {
                            tracing::warn!("server reports no installed models");
                        }
                        if let Some(model) = self.directory.preferred(&self.endpoint.selected_model) {
                            self.endpoint.selected_model = model;
                        }
                        self.status = Status::ModelsLoaded;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "could not refresh models");
                        self.status = Status::ModelsFailed(e);
                    }
                }
                Task::none()
            }
            Message::Generate => {
                if self.phase == Phase::Requesting {
                    return Task::none();
                }

                let query = self.query.text().trim().to_string();
                if query.is_empty() {
                    self.status = Status::EmptyQuery;
                    return Task::none();
                }

                self.phase = Phase::Requesting;
                self.status = Status::Generating;
                self.output = text_editor::Content::new();

                let endpoint = self.endpoint.clone();
                let template = self.template.clone();
                let timeout = self.timeout;
                Task::perform(
                    run_blocking(move || {
                        OllamaClient::new(timeout)?
                            .with_template(template)
                            .generate(&endpoint, &query)
                    }),
                    Message::Generated,
                )
            }
            Message::Generated(result) => {
                self.phase = Phase::Idle;
                match result {
                    Ok(response) => {
                        self.output = text_editor::Content::with_text(&response);
                        self.status = Status::Ready;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "generation failed");
                        self.output = text_editor::Content::with_text(&format!("API Error: {e}"));
                        self.status = Status::GenerateFailed(e);
                    }
                }
                Task::none()
            }
            Message::CopyOutput => {
                let output = self.output.text().trim().to_string();
                if output.is_empty() {
                    self.status = Status::NothingToCopy;
                    return Task::none();
                }
                self.status = Status::Copied;
                clipboard::write(output)
            }
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _id| {
            if let IcedEvent::Keyboard(keyboard::Event::KeyPressed {
                key: Key::Named(keyboard::key::Named::Enter),
                modifiers,
                ..
            }) = event
            {
                if modifiers.command() {
                    return Some(Message::Generate);
                }
            }
            None
        })
    }

    pub fn view(&self) -> Element<Message> {
        let refresh = button(text("↻"))
            .on_press_maybe((!self.refreshing).then_some(Message::RefreshModels));

        let settings = row![
            text("Model:"),
            pick_list(
                self.directory.names(),
                Some(&self.endpoint.selected_model),
                Message::ModelSelected,
            )
            .placeholder("Select model")
            .width(Length::Fixed(220.0)),
            text("URL:"),
            text_input(DEFAULT_HOST, &self.endpoint.address)
                .on_input(Message::AddressChanged)
                .width(Length::Fill),
            refresh,
        ]
        .spacing(5)
        .align_y(Alignment::Center);

        let input_panel = column![
            text("Input").size(16),
            settings,
            text("Enter your query:"),
            text_editor(&self.query)
                .on_action(Message::QueryEdited)
                .height(Length::Fill),
        ]
        .spacing(5)
        .width(Length::FillPortion(1));

        let output_panel = column![
            text("Structured Prompt Output").size(16),
            text_editor(&self.output)
                .on_action(Message::OutputEdited)
                .height(Length::Fill),
        ]
        .spacing(5)
        .width(Length::FillPortion(1));

        let generate = button(text("Generate Structured Prompt").size(16))
            .on_press_maybe((self.phase == Phase::Idle).then_some(Message::Generate))
            .padding(5)
            .width(Length::Fill);
        let copy = button(text("Copy to Clipboard"))
            .on_press(Message::CopyOutput)
            .padding(5)
            .width(Length::Fill);

        let content = column![
            row![input_panel, output_panel].spacing(4).height(Length::Fill),
            row![generate, copy].spacing(4),
            text(format!("Status: {}", self.status)).size(13),
        ]
        .spacing(4)
        .padding(4);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        Theme::TokyoNight
    }
}
