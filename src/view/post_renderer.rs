use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::article::RenderedArticle;
use crate::comments::comment::{comment_datetime, format_comment_date, message_html, Comment, MAX_MESSAGE_CHARS, MAX_NAME_CHARS};
use crate::comments::comment_panel::Notification;
use crate::content::post::Post;
use crate::progress::bar_style;

#[derive(ramhorns::Content)]
struct ViewHeading<'a> {
    id: &'a str,
    text: &'a str,
    level: u8,
}

#[derive(ramhorns::Content)]
struct ViewComment<'a> {
    author: &'a str,
    datetime: String,
    date: String,
    message: String,
}

#[derive(ramhorns::Content)]
struct ViewNotification<'a> {
    error: bool,
    message: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    site_title: &'a str,
    page_language: &'a str,
    id: &'a str,
    post_title: &'a str,
    category: &'a str,
    post_content: &'a str,
    toc: Vec<ViewHeading<'a>>,
    progress_style: String,
    copy_revert_ms: u64,
    scripts: &'a str,
    toggle_compact: &'a str,
    toggle_full: &'a str,
    comments: Vec<ViewComment<'a>>,
    no_comments: bool,
    comments_hidden: bool,
    max_name_chars: usize,
    max_message_chars: usize,
    form_name: &'a str,
    form_message: &'a str,
    notifications: Vec<ViewNotification<'a>>,
}

/// Everything shown on the page of one post.
pub struct PostPage<'a> {
    pub site_title: &'a str,
    pub page_language: &'a str,
    pub post: &'a Post,
    pub category_title: &'a str,
    pub article: &'a RenderedArticle,
    pub copy_revert_ms: u64,
    pub scripts: &'a str,
    pub toggle_compact: &'a str,
    pub toggle_full: &'a str,
    pub comments: &'a [Comment],
    /// False when the list was not fetched for this response.
    pub comments_loaded: bool,
    pub form_name: &'a str,
    pub form_message: &'a str,
    pub notifications: &'a [Notification],
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> io::Result<PostRenderer> {
        let template = match Template::new(view_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing post view template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
        })
    }

    pub fn render(&self, page: &PostPage) -> String {
        let toc = page.article.toc.iter()
            .map(|entry| ViewHeading {
                id: entry.id.as_str(),
                text: entry.text.as_str(),
                level: entry.level,
            })
            .collect();

        let comments: Vec<ViewComment> = page.comments.iter()
            .map(|comment| ViewComment {
                author: comment.author_name.as_str(),
                datetime: comment_datetime(&comment.created_at),
                date: format_comment_date(&comment.created_at),
                message: message_html(&comment.message),
            })
            .collect();

        let notifications = page.notifications.iter()
            .map(|notification| ViewNotification {
                error: notification.is_error(),
                message: notification.message(),
            })
            .collect();

        self.template.render(&ViewItem {
            site_title: page.site_title,
            page_language: page.page_language,
            id: page.post.id.0.as_str(),
            post_title: page.post.title.as_str(),
            category: page.category_title,
            post_content: page.article.html.as_str(),
            toc,
            progress_style: bar_style(0.0),
            copy_revert_ms: page.copy_revert_ms,
            scripts: page.scripts,
            toggle_compact: page.toggle_compact,
            toggle_full: page.toggle_full,
            no_comments: page.comments_loaded && comments.is_empty(),
            comments_hidden: !page.comments_loaded,
            max_name_chars: MAX_NAME_CHARS,
            max_message_chars: MAX_MESSAGE_CHARS,
            comments,
            form_name: page.form_name,
            form_message: page.form_message,
            notifications,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{TimeZone, Utc};

    use crate::article::TocEntry;
    use crate::content::post::Post;

    use super::*;

    #[test]
    fn render_view() {
        let template_src = r##"
TITLE=[{{post_title}}]
CATEGORY=[{{category}}]
TOC=[{{#toc}}({{level}} {{id}} {{text}}){{/toc}}]
POST_CONTENT=[{{{post_content}}}]
COMMENTS=[{{#comments}}({{author}} {{datetime}} {{date}} {{{message}}}){{/comments}}{{#no_comments}}none{{/no_comments}}{{#comments_hidden}}hidden{{/comments_hidden}}]
FORM=[{{form_name}}|{{form_message}}]
NOTES=[{{#notifications}}{{#error}}E:{{/error}}{{message}}{{/notifications}}]
"##;
        let post_renderer = PostRenderer::new(template_src).unwrap();
        let post = Post::from_string(&PathBuf::from("posts/entra/eam.md"), "# <EAM>\n").unwrap();
        let article = RenderedArticle {
            html: "<h1 id=\"eam\">&lt;EAM&gt;</h1>".to_string(),
            toc: vec![TocEntry { id: "eam".to_string(), text: "<EAM>".to_string(), level: 1 }],
        };
        let comments = vec![Comment {
            id: "1".to_string(),
            post_id: "eam".to_string(),
            author_name: "<Ada>".to_string(),
            message: "one\ntwo".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 8, 12, 15, 45, 0).unwrap(),
        }];
        let notifications = vec![Notification::Error("Failed".to_string())];

        let res = post_renderer.render(&PostPage {
            site_title: "Directory Notes",
            page_language: "en",
            post: &post,
            category_title: "Entra ID",
            article: &article,
            copy_revert_ms: 2000,
            scripts: "",
            toggle_compact: "",
            toggle_full: "",
            comments: &comments,
            comments_loaded: true,
            form_name: "Ada",
            form_message: "Hi",
            notifications: &notifications,
        });
        assert_eq!(res, r##"
TITLE=[&lt;EAM&gt;]
CATEGORY=[Entra ID]
TOC=[(1 eam &lt;EAM&gt;)]
POST_CONTENT=[<h1 id="eam">&lt;EAM&gt;</h1>]
COMMENTS=[(&lt;Ada&gt; 2025-08-12T15:45:00Z Aug 12, 2025, 03:45 PM one<br />two)]
FORM=[Ada|Hi]
NOTES=[E:Failed]"##);
    }

    #[test]
    fn render_without_loaded_comments() {
        let post_renderer = PostRenderer::new("[{{#no_comments}}none{{/no_comments}}{{#comments_hidden}}hidden{{/comments_hidden}}]").unwrap();
        let post = Post::from_string(&PathBuf::from("posts/entra/eam.md"), "# EAM\n").unwrap();
        let article = RenderedArticle { html: String::new(), toc: vec![] };
        let page = |comments_loaded| PostPage {
            site_title: "Directory Notes",
            page_language: "en",
            post: &post,
            category_title: "Entra ID",
            article: &article,
            copy_revert_ms: 2000,
            scripts: "",
            toggle_compact: "",
            toggle_full: "",
            comments: &[],
            comments_loaded,
            form_name: "",
            form_message: "",
            notifications: &[],
        };

        assert_eq!(post_renderer.render(&page(false)), "[hidden]");
        assert_eq!(post_renderer.render(&page(true)), "[none]");
    }
}
