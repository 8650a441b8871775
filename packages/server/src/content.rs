use anyhow::{Context, Result};
use vivah_common::event::EventContent;

use crate::config::EventConfig;

const BUNDLED_CONTENT: &str = include_str!("../../../config/event.toml");

/// Load the event details, schedule and RSVP list.
pub fn load_event_content(config: &EventConfig) -> Result<EventContent> {
    match &config.content_path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read event content from {}", path.display()))?;
            let content = EventContent::from_toml(&source)
                .with_context(|| format!("Invalid event content in {}", path.display()))?;
            tracing::info!(path = %path.display(), "Loaded event content");
            Ok(content)
        }
        None => bundled_content(),
    }
}

pub fn bundled_content() -> Result<EventContent> {
    EventContent::from_toml(BUNDLED_CONTENT).context("Bundled event content is invalid")
}
