//! Reading progress of a post page. The server renders the initial bar with
//! [`bar_style`]; `res/public/site.js` applies the same completion rule and
//! listener lifecycle in the browser, and [`ReadingProgress`] is the model
//! those rules are tested against.

use std::cell::Cell;
use std::rc::Rc;

/// Viewport scroll state, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        ScrollMetrics {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Scroll completion between 0 and 100.
    pub fn completion(&self) -> f64 {
        let total = self.scroll_height - self.client_height;
        if self.scroll_top <= 0.0 {
            return 0.0;
        }
        if self.scroll_top >= total {
            return 100.0;
        }
        self.scroll_top / total * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub type ScrollListener = Box<dyn Fn(ScrollMetrics)>;

/// Anything that emits scroll events, normally the page viewport.
pub trait ScrollSource {
    fn metrics(&self) -> ScrollMetrics;
    fn add_listener(&self, listener: ScrollListener) -> ListenerId;
    fn remove_listener(&self, id: ListenerId);
}

/// Width of the progress bar, recomputed on every scroll event while attached.
#[derive(Clone, Default)]
pub struct ReadingProgress {
    percent: Rc<Cell<f64>>,
}

impl ReadingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> f64 {
        self.percent.get()
    }

    /// Starts listening to `source`. The listener stays registered until the
    /// returned guard is dropped.
    pub fn attach<'s, S: ScrollSource>(&self, source: &'s S) -> ProgressGuard<'s, S> {
        self.percent.set(source.metrics().completion());

        let percent = self.percent.clone();
        let id = source.add_listener(Box::new(move |metrics| percent.set(metrics.completion())));
        ProgressGuard {
            source,
            id,
        }
    }
}

pub struct ProgressGuard<'s, S: ScrollSource> {
    source: &'s S,
    id: ListenerId,
}

impl<S: ScrollSource> Drop for ProgressGuard<'_, S> {
    fn drop(&mut self) {
        self.source.remove_listener(self.id);
    }
}

/// Inline style of the progress bar element.
pub fn bar_style(percent: f64) -> String {
    format!("width: {:.2}%", percent.clamp(0.0, 100.0))
}
