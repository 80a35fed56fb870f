use std::collections::{HashMap, HashSet};
use std::io;

use serde::Deserialize;

use crate::content::post::{HeadingRef, Post};
use crate::markup::surface::Surface;

/// How rendered headings get their fragment identifiers.
#[derive(Deserialize, Copy, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AnchorStrategy {
    /// Pair the i-th rendered heading with the i-th declared heading.
    #[default]
    Positional,
    /// Slugify the rendered heading text, ignoring the declared list.
    Derived,
}

/// Assigns anchors to the rendered headings of `surface` and returns how many
/// were assigned.
pub fn apply(strategy: AnchorStrategy, surface: &mut Surface, post: &Post) -> usize {
    match strategy {
        AnchorStrategy::Positional => synchronize(surface, &post.headings),
        AnchorStrategy::Derived => derive_anchors(surface),
    }
}

/// Pairs rendered headings with `declared` by index, up to the shorter of the
/// two. Headings past that point keep whatever anchor they had. Order and
/// count mismatches are not detected.
pub fn synchronize(surface: &mut Surface, declared: &[HeadingRef]) -> usize {
    let count = surface.heading_count().min(declared.len());
    for (index, heading) in declared.iter().take(count).enumerate() {
        surface.set_anchor(index, &heading.id);
    }
    count
}

/// Gives every rendered heading a slug of its own text. Repeated slugs get a
/// numeric suffix.
pub fn derive_anchors(surface: &mut Surface) -> usize {
    let slugs: Vec<String> = {
        let mut counter = SlugCounter::new();
        surface.headings().iter().map(|(_, text)| counter.next(text)).collect()
    };

    for (index, slug) in slugs.iter().enumerate() {
        surface.set_anchor(index, slug);
    }
    slugs.len()
}

/// Heading list of a rendered body, with derived ids, in header format order.
pub fn derive_heading_refs(surface: &Surface) -> io::Result<Vec<HeadingRef>> {
    let mut counter = SlugCounter::new();
    surface.headings().iter()
        .map(|(level, text)| HeadingRef::new(&counter.next(text), text, *level))
        .collect()
}

/// A position where the declared heading list and the rendered body disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingDrift {
    pub index: usize,
    pub declared: Option<HeadingRef>,
    pub rendered: Option<(u8, String)>,
}

/// Compares level and text of declared headings against the rendered ones.
pub fn find_drift(surface: &Surface, declared: &[HeadingRef]) -> Vec<HeadingDrift> {
    let rendered = surface.headings();
    let len = rendered.len().max(declared.len());

    (0..len).filter_map(|index| {
        let declared = declared.get(index);
        let rendered = rendered.get(index);
        let matches = match (declared, rendered) {
            (Some(declared), Some((level, text))) => declared.level == *level && declared.text == *text,
            _ => false,
        };
        if matches {
            return None;
        }
        Some(HeadingDrift {
            index,
            declared: declared.cloned(),
            rendered: rendered.cloned(),
        })
    }).collect()
}

/// Lowercase ASCII slug: transliterated, with each run of other characters
/// collapsed into a single dash.
pub fn slugify(text: &str) -> String {
    let ascii = unidecode::unidecode(text).to_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("section");
    }
    slug
}

/// Hands out unique slugs: `a`, `a-1`, `a-2`...
pub struct SlugCounter {
    seen: HashMap<String, usize>,
    used: HashSet<String>,
}

impl SlugCounter {
    pub fn new() -> Self {
        SlugCounter {
            seen: HashMap::new(),
            used: HashSet::new(),
        }
    }

    pub fn next(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();
        let count = self.seen.entry(base.clone()).or_insert(0);

        while self.used.contains(&slug) {
            *count += 1;
            slug = format!("{}-{}", base, count);
        }

        self.used.insert(slug.clone());
        slug
    }
}

impl Default for SlugCounter {
    fn default() -> Self {
        Self::new()
    }
}
