mod app;

use iced::{window, Font, Size};
use metaprompt_forge::config::Config;
use tracing_subscriber::EnvFilter;

use app::App;

fn init_tracing() {
    let default_level = if std::env::var("FORGE_DEBUG").is_ok() { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("FORGE_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> iced::Result {
    init_tracing();

    let config = Config::load();
    let window_settings = window::Settings {
        size: Size::new(config.window.width as f32, config.window.height as f32),
        min_size: Some(Size::new(
            config.window.min_width as f32,
            config.window.min_height as f32,
        )),
        position: window::Position::Centered,
        ..Default::default()
    };

    tracing::info!(host = %config.ollama.host, model = %config.ollama.model, "starting");

    iced::application("MetaPrompt Forge v1.0", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(window_settings)
        .default_font(Font::DEFAULT)
        .run_with(move || App::new(config))
}
