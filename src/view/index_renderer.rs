use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::content::content_store::ContentStore;

#[derive(ramhorns::Content)]
struct IndexPage<'a> {
    site_title: &'a str,
    page_language: &'a str,
    post_count: usize,
    categories: Vec<CategoryItem<'a>>,
    scripts: &'a str,
    toggle_compact: &'a str,
    toggle_full: &'a str,
}

#[derive(ramhorns::Content)]
struct CategoryItem<'a> {
    id: &'a str,
    title: &'a str,
    posts: Vec<PostItem<'a>>,
}

#[derive(ramhorns::Content)]
struct PostItem<'a> {
    link: String,
    title: &'a str,
}

/// Page chrome shared by every page.
pub struct SiteChrome<'a> {
    pub site_title: &'a str,
    pub page_language: &'a str,
    pub scripts: &'a str,
    pub toggle_compact: &'a str,
    pub toggle_full: &'a str,
}

pub struct IndexRenderer<'a> {
    pub template: Template<'a>,
}

impl IndexRenderer<'_> {
    pub fn new(index_tpl_src: &str) -> io::Result<IndexRenderer> {
        let template = match Template::new(index_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing index template: {}", e)));
            }
        };

        Ok(IndexRenderer {
            template,
        })
    }

    pub fn render(&self, chrome: &SiteChrome, store: &ContentStore) -> String {
        let categories = store.categories().iter()
            .map(|category| CategoryItem {
                id: category.id.as_str(),
                title: category.title.as_str(),
                posts: category.posts.iter()
                    .filter_map(|post_id| store.get(&post_id.0))
                    .map(|post| PostItem {
                        link: format!("/post/{}/", post.id),
                        title: post.title.as_str(),
                    })
                    .collect(),
            })
            .collect();

        self.template.render(&IndexPage {
            site_title: chrome.site_title,
            page_language: chrome.page_language,
            post_count: store.len(),
            categories,
            scripts: chrome.scripts,
            toggle_compact: chrome.toggle_compact,
            toggle_full: chrome.toggle_full,
        })
    }
}
