//! In-process session configuration.
//!
//! Unlike a full editor's on-disk `oxidized.toml`, a line-editing session is
//! configured by its embedding application at construction time, not by a
//! config file on the user's machine — there's no persistent install to
//! carry settings between runs. `SessionConfig` is therefore a plain builder
//! rather than a deserializer; the fields it exposes mirror what a caller
//! would otherwise have passed as constructor arguments.

use core_color::Rgb;
use core_render::FrameStyle;
use core_state::FrameMode;
use std::sync::Arc;

/// Either a fixed prompt string or a callback invoked each time the prompt
/// is drawn (for prompts that embed e.g. a clock or a changing working
/// directory).
#[derive(Clone)]
pub enum PromptSpec {
    Literal(String),
    Callback(Arc<dyn Fn() -> String + Send + Sync>),
}

impl PromptSpec {
    pub fn render(&self) -> String {
        match self {
            PromptSpec::Literal(s) => s.clone(),
            PromptSpec::Callback(f) => f(),
        }
    }
}

impl std::fmt::Debug for PromptSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptSpec::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            PromptSpec::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Construction-time configuration for one line-editing session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub prompt: PromptSpec,
    pub frame_mode: FrameMode,
    pub frame_style: FrameStyle,
    pub fg: Rgb,
    pub bg: Rgb,
    pub empty_message: Option<String>,
    pub osc133: bool,
    pub max_lines: usize,
    pub initial_buffer: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt: PromptSpec::Literal(String::new()),
            frame_mode: FrameMode::Multiline,
            frame_style: FrameStyle::Line,
            fg: Rgb::new(220, 220, 220),
            bg: Rgb::new(20, 20, 20),
            empty_message: None,
            osc133: false,
            max_lines: 10,
            initial_buffer: None,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = PromptSpec::Literal(prompt.into());
        self
    }

    pub fn with_prompt_fn(mut self, f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.prompt = PromptSpec::Callback(Arc::new(f));
        self
    }

    pub fn with_frame_mode(mut self, mode: FrameMode) -> Self {
        self.frame_mode = mode;
        self
    }

    pub fn with_frame_style(mut self, style: FrameStyle) -> Self {
        self.frame_style = style;
        self
    }

    pub fn with_colors(mut self, fg: Rgb, bg: Rgb) -> Self {
        self.fg = fg;
        self.bg = bg;
        self
    }

    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = Some(message.into());
        self
    }

    pub fn with_osc133(mut self, enabled: bool) -> Self {
        self.osc133 = enabled;
        self
    }

    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines.max(1);
        self
    }

    /// Seed the session with an initial line instead of starting empty
    /// (e.g. re-editing a previously submitted command).
    pub fn with_initial_buffer(mut self, buffer: impl Into<String>) -> Self {
        self.initial_buffer = Some(buffer.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_has_no_initial_buffer_or_empty_message() {
        let cfg = SessionConfig::new();
        assert!(cfg.initial_buffer.is_none());
        assert!(cfg.empty_message.is_none());
        assert!(!cfg.osc133);
    }

    #[test]
    fn builder_chain_applies_all_fields() {
        let cfg = SessionConfig::new()
            .with_prompt("> ")
            .with_frame_mode(FrameMode::SingleLine)
            .with_max_lines(3)
            .with_initial_buffer("resume me");
        assert_eq!(cfg.prompt.render(), "> ");
        assert_eq!(cfg.frame_mode, FrameMode::SingleLine);
        assert_eq!(cfg.max_lines, 3);
        assert_eq!(cfg.initial_buffer.as_deref(), Some("resume me"));
    }

    #[test]
    fn prompt_callback_is_invoked_on_render() {
        let cfg = SessionConfig::new().with_prompt_fn(|| "dynamic> ".to_string());
        assert_eq!(cfg.prompt.render(), "dynamic> ");
    }

    #[test]
    fn max_lines_is_clamped_to_at_least_one() {
        let cfg = SessionConfig::new().with_max_lines(0);
        assert_eq!(cfg.max_lines, 1);
    }
}
