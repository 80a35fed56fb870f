use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use html_escape::{encode_double_quoted_attribute, encode_text};
use lazy_static::lazy_static;
use regex::Regex;
use spdlog::{debug, error};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use tokio::task::JoinHandle;

use crate::markup::style::StyleMap;

pub const HIGHLIGHT_THEME: &str = "base16-ocean.dark";

/// Language tag of a fence info string, e.g. `python` or `language-python`.
pub fn parse_language(info: &str) -> Option<String> {
    lazy_static! {
        static ref LANGUAGE_REGEX: Regex = Regex::new(r"^(?:language-)?(\w+)").unwrap();
    }

    LANGUAGE_REGEX.captures(info.trim())
        .and_then(|cap| cap.get(1))
        .map(|tag| tag.as_str().to_string())
}

pub fn strip_trailing_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

/// Renders fenced code: highlighted with a fixed theme plus a copy control
/// when a language is declared, plain preformatted text otherwise.
pub struct CodeBlockPresenter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl CodeBlockPresenter {
    pub fn new() -> Self {
        let theme = ThemeSet::load_defaults().themes.remove(HIGHLIGHT_THEME).unwrap_or_default();
        CodeBlockPresenter {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    pub fn render(&self, language: Option<&str>, text: &str, styles: &StyleMap) -> String {
        let text = strip_trailing_newline(text);
        let Some(language) = language else {
            return format!("<pre><code{}>{}</code></pre>", class_attr(&styles.plain_code_block), encode_text(text));
        };

        let highlighted = match self.highlight(language, text) {
            Ok(html) => html,
            Err(e) => {
                debug!("Highlighting {} failed, using plain text: {}", language, e);
                format!("<pre><code>{}</code></pre>", encode_text(text))
            }
        };

        format!(
            "<div{} data-language=\"{}\"><button type=\"button\"{} aria-label=\"Copy code\" data-copy-code=\"{}\">Copy</button>{}</div>",
            class_attr(&styles.code_block_wrapper),
            encode_double_quoted_attribute(language),
            class_attr(&styles.copy_button),
            encode_double_quoted_attribute(text),
            highlighted,
        )
    }

    fn highlight(&self, language: &str, text: &str) -> Result<String, syntect::Error> {
        let syntax = self.syntax_set
            .find_syntax_by_token(language)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        highlighted_html_for_string(text, &self.syntax_set, syntax, &self.theme)
    }
}

impl Default for CodeBlockPresenter {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn class_attr(class: &str) -> String {
    if class.is_empty() {
        String::new()
    } else {
        format!(" class=\"{}\"", encode_double_quoted_attribute(class))
    }
}

pub trait Clipboard {
    fn write_text(&self, text: &str) -> impl Future<Output = io::Result<()>> + Send;
}

/// Copy-to-clipboard state of one code block. A successful copy raises the
/// `copied` flag and schedules its reversion; a later copy cancels the
/// pending reversion and schedules a fresh one.
///
/// Must be driven from inside a tokio runtime. The copy button of a rendered
/// page runs the same rules in `res/public/site.js`.
pub struct CopyControl<C> {
    clipboard: C,
    code: String,
    copied: Arc<AtomicBool>,
    pending_revert: Option<JoinHandle<()>>,
    revert_after: Duration,
}

impl<C: Clipboard> CopyControl<C> {
    pub fn new(clipboard: C, code: &str, revert_after: Duration) -> Self {
        CopyControl {
            clipboard,
            code: strip_trailing_newline(code).to_string(),
            copied: Arc::new(AtomicBool::new(false)),
            pending_revert: None,
            revert_after,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_copied(&self) -> bool {
        self.copied.load(Ordering::SeqCst)
    }

    /// Writes the code to the clipboard. Failures are only logged.
    pub async fn copy(&mut self) -> bool {
        if let Err(e) = self.clipboard.write_text(&self.code).await {
            error!("Failed to copy code block: {}", e);
            return false;
        }

        self.copied.store(true, Ordering::SeqCst);
        if let Some(pending) = self.pending_revert.take() {
            pending.abort();
        }

        let copied = self.copied.clone();
        let revert_after = self.revert_after;
        self.pending_revert = Some(tokio::spawn(async move {
            tokio::time::sleep(revert_after).await;
            copied.store(false, Ordering::SeqCst);
        }));
        true
    }
}

impl<C> Drop for CopyControl<C> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending_revert.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Clone, Default)]
    struct FakeClipboard {
        writes: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl Clipboard for FakeClipboard {
        async fn write_text(&self, text: &str) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "clipboard blocked"));
            }
            self.writes.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_parse_language() {
        assert_eq!(parse_language("python"), Some("python".to_string()));
        assert_eq!(parse_language("language-python"), Some("python".to_string()));
        assert_eq!(parse_language("powershell title=\"x\""), Some("powershell".to_string()));
        assert_eq!(parse_language("c++"), Some("c".to_string()));
        assert_eq!(parse_language("{.python}"), None);
        assert_eq!(parse_language(""), None);
    }

    #[test]
    fn test_render_without_language() {
        let presenter = CodeBlockPresenter::new();
        let styles = StyleMap::default();
        let html = presenter.render(None, "a < b\n", &styles);
        assert_eq!(html, format!("<pre><code class=\"{}\">a &lt; b</code></pre>", styles.plain_code_block));
    }

    #[test]
    fn test_render_with_language() {
        let presenter = CodeBlockPresenter::new();
        let styles = StyleMap::default();
        let html = presenter.render(Some("python"), "print(\"1\")\n", &styles);
        assert!(html.starts_with("<div class=\"relative group\" data-language=\"python\">"));
        assert!(html.contains("aria-label=\"Copy code\""));
        assert!(html.contains("data-copy-code=\"print(&quot;1&quot;)\""));
        assert!(html.contains("<pre style=\"background-color:"));
        assert!(html.ends_with("</div>"));
    }

    #[test]
    fn test_unknown_language_still_gets_copy_control() {
        let presenter = CodeBlockPresenter::new();
        let html = presenter.render(Some("notalanguage"), "x", &StyleMap::default());
        assert!(html.contains("data-copy-code=\"x\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_strips_trailing_newline() {
        let clipboard = FakeClipboard::default();
        let mut control = CopyControl::new(clipboard.clone(), "print(1)\n", Duration::from_secs(2));

        assert!(!control.is_copied());
        assert!(control.copy().await);
        assert!(control.is_copied());
        assert_eq!(*clipboard.writes.lock().unwrap(), vec!["print(1)".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_copied_flag_reverts() {
        let mut control = CopyControl::new(FakeClipboard::default(), "Get-ADDomain", Duration::from_secs(2));
        control.copy().await;

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(control.is_copied());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!control.is_copied());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_copy_supersedes_pending_revert() {
        let mut control = CopyControl::new(FakeClipboard::default(), "repadmin /syncall", Duration::from_secs(2));
        control.copy().await;

        tokio::time::sleep(Duration::from_millis(1500)).await;
        control.copy().await;

        // The first revert would have fired at 2000 ms
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(control.is_copied());

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert!(!control.is_copied());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_copy_never_sets_flag() {
        let clipboard = FakeClipboard { fail: true, ..Default::default() };
        let mut control = CopyControl::new(clipboard.clone(), "secret", Duration::from_secs(2));

        assert!(!control.copy().await);
        assert!(!control.is_copied());
        assert!(clipboard.writes.lock().unwrap().is_empty());
    }
}
