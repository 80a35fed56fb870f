use std::fmt::Write;
use std::time::Duration;

use html_escape::encode_double_quoted_attribute;
use spdlog::{debug, warn};
use tokio::time::Instant;

use crate::config::Translate;

pub const SCRIPT_ID: &str = "google-translate-script";
pub const WIDGET_ELEMENT_ID: &str = "google_translate_element";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Tamil,
}

impl Language {
    pub fn from_code(code: &str) -> Option<Language> {
        match code {
            "en" => Some(Language::English),
            "ta" => Some(Language::Tamil),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Tamil => "ta",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Tamil => "தமிழ்",
        }
    }

    pub fn short_label(&self) -> &'static str {
        match self {
            Language::English => "EN",
            Language::Tamil => "த",
        }
    }

    pub fn menu_label(&self) -> &'static str {
        match self {
            Language::English => "🇬🇧 English",
            Language::Tamil => "🇮🇳 தமிழ் (Tamil)",
        }
    }
}

/// Layout of the toggle: `Compact` for the mobile header, `Full` for the side
/// navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleVariant {
    Compact,
    Full,
}

/// Script includes of one page, each id emitted at most once.
#[derive(Debug, Default)]
pub struct ScriptRegistry {
    scripts: Vec<(String, String)>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the script unless one with the same id is present. Returns true
    /// when it was added.
    pub fn ensure(&mut self, id: &str, src: &str) -> bool {
        if self.scripts.iter().any(|(script_id, _)| script_id == id) {
            debug!("Script {} already included", id);
            return false;
        }
        self.scripts.push((id.to_string(), src.to_string()));
        true
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for (id, src) in self.scripts.iter() {
            let _ = writeln!(html, "<script id=\"{}\" src=\"{}\" async></script>",
                             encode_double_quoted_attribute(id),
                             encode_double_quoted_attribute(src));
        }
        html
    }
}

/// The third party translation widget loaded in the page.
pub trait TranslateWidget {
    fn is_ready(&self) -> bool;

    /// Selects `code` on the widget's own control. False when the control is
    /// not in the page.
    fn dispatch_change(&self, code: &str) -> bool;
}

/// Two-option language selector driving a [`TranslateWidget`]. The server
/// uses it to render the toggle markup; in the page, `res/public/site.js`
/// follows [`LanguageToggle::select`] with the poll interval and timeout
/// carried in the markup's data attributes.
pub struct LanguageToggle {
    source: Language,
    target: Language,
    current: Language,
    variant: ToggleVariant,
    poll_every: Duration,
    give_up_after: Duration,
}

impl LanguageToggle {
    pub fn new(source: Language, target: Language, variant: ToggleVariant, cfg: &Translate) -> Self {
        LanguageToggle {
            source,
            target,
            current: source,
            variant,
            poll_every: Duration::from_millis(cfg.ready_poll_ms.max(1)),
            give_up_after: Duration::from_millis(cfg.ready_timeout_ms),
        }
    }

    pub fn current(&self) -> Language {
        self.current
    }

    pub fn options(&self) -> [Language; 2] {
        [self.source, self.target]
    }

    /// Records the selection and hands it to the widget once it is ready.
    /// Returns false when the widget never became ready or rejected the change.
    pub async fn select<W: TranslateWidget>(&mut self, widget: &W, language: Language) -> bool {
        self.current = language;

        let started = Instant::now();
        loop {
            if widget.is_ready() {
                return widget.dispatch_change(language.code());
            }
            if started.elapsed() >= self.give_up_after {
                warn!("Translation widget not ready after {:?}, {} not applied", self.give_up_after, language.code());
                return false;
            }
            tokio::time::sleep(self.poll_every).await;
        }
    }

    /// Markup of the toggle. The widget script is registered in `scripts`.
    pub fn render(&self, scripts: &mut ScriptRegistry, cfg: &Translate) -> String {
        scripts.ensure(SCRIPT_ID, &cfg.script_src);

        let (root_class, button_label) = match self.variant {
            ToggleVariant::Compact => ("language-toggle compact", self.current.short_label()),
            ToggleVariant::Full => ("language-toggle full", self.current.label()),
        };

        let mut html = String::new();
        let _ = write!(html, "<div class=\"{}\" data-page-language=\"{}\" data-included-languages=\"{},{}\" data-ready-poll-ms=\"{}\" data-ready-timeout-ms=\"{}\">",
                       root_class, self.source.code(), self.source.code(), self.target.code(),
                       self.poll_every.as_millis(), self.give_up_after.as_millis());
        let _ = write!(html, "<button type=\"button\" class=\"language-toggle-button\" aria-haspopup=\"menu\">{}</button>", button_label);
        html.push_str("<ul class=\"language-toggle-menu\" role=\"menu\">");
        for language in self.options() {
            let selected = if language == self.current { " selected" } else { "" };
            let _ = write!(html, "<li role=\"menuitem\" class=\"language-option{}\" data-lang=\"{}\">{}</li>",
                           selected, language.code(), language.menu_label());
        }
        html.push_str("</ul></div>");
        html
    }
}
