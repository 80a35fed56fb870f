use std::fs;
use std::io;
use std::sync::Arc;

use ntex::util::Bytes;
use ntex::web;
use ntex_files::NamedFile;
use serde::Deserialize;
use spdlog::{error, info, warn};

use crate::article::{render_post, RenderedArticle};
use crate::code_block::CodeBlockPresenter;
use crate::comments::comment::NewComment;
use crate::comments::comment_panel::{CommentPanel, MSG_POST_FAILED};
use crate::comments::comment_store::{CommentBackend, CommentStore};
use crate::config::Config;
use crate::content::content_cache::{ContentCache, Expire};
use crate::content::content_store::ContentStore;
use crate::content::post::Post;
use crate::translate::{Language, LanguageToggle, ScriptRegistry, ToggleVariant};
use crate::view::index_renderer::{IndexRenderer, SiteChrome};
use crate::view::post_renderer::{PostPage, PostRenderer};

struct AppState<S = CommentBackend> {
    config: Config,
    store: ContentStore,
    code_blocks: CodeBlockPresenter,
    articles: ContentCache<RenderedArticle>,
    comments: S,
}

type State = web::types::State<Arc<AppState>>;

#[derive(Deserialize)]
struct CommentForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    message: String,
}

/// Toggles and script includes of the page header.
struct Chrome {
    scripts: String,
    toggle_compact: String,
    toggle_full: String,
}

impl Chrome {
    fn new(config: &Config) -> Chrome {
        let source = Language::from_code(&config.site.page_language).unwrap_or(Language::English);
        let target = Language::from_code(&config.translate.target_language).unwrap_or_else(|| {
            warn!("Unsupported translation language {}, using ta", config.translate.target_language);
            Language::Tamil
        });

        let mut scripts = ScriptRegistry::new();
        let toggle_compact = LanguageToggle::new(source, target, ToggleVariant::Compact, &config.translate)
            .render(&mut scripts, &config.translate);
        let toggle_full = LanguageToggle::new(source, target, ToggleVariant::Full, &config.translate)
            .render(&mut scripts, &config.translate);

        Chrome {
            scripts: scripts.to_html(),
            toggle_compact,
            toggle_full,
        }
    }
}

fn read_template(config: &Config, name: &str) -> io::Result<String> {
    let template_path = config.paths.template_dir.join(name);
    fs::read_to_string(&template_path).map_err(|e| {
        io::Error::new(e.kind(), format!("Error reading template {}: {}", template_path.display(), e))
    })
}

fn article_of<S>(state: &AppState<S>, post: &Post) -> Arc<RenderedArticle> {
    if let Some(article) = state.articles.get_article(&post.id.0) {
        return article;
    }

    let article = render_post(post, state.config.defaults.anchor_strategy, &state.config.styles, &state.code_blocks);
    state.articles.add_article(&post.id.0, article, Expire::Never)
}

fn render_post_page<S: CommentStore>(state: &AppState<S>, post: &Post, panel: &CommentPanel<S>) -> io::Result<String> {
    let template_src = read_template(&state.config, "view.tpl")?;
    let renderer = PostRenderer::new(&template_src)?;

    let article = article_of(state, post);
    let chrome = Chrome::new(&state.config);
    let category_title = state.store.categories().iter()
        .find(|category| category.id == post.category)
        .map(|category| category.title.as_str())
        .unwrap_or(post.category.as_str());

    Ok(renderer.render(&PostPage {
        site_title: &state.config.site.title,
        page_language: &state.config.site.page_language,
        post,
        category_title,
        article: &article,
        copy_revert_ms: state.config.defaults.copy_revert_ms,
        scripts: &chrome.scripts,
        toggle_compact: &chrome.toggle_compact,
        toggle_full: &chrome.toggle_full,
        comments: panel.comments(),
        comments_loaded: panel.is_loaded(),
        form_name: panel.name(),
        form_message: panel.message(),
        notifications: panel.notifications(),
    }))
}

fn html_response(rendered: io::Result<String>) -> web::HttpResponse {
    match rendered {
        Ok(rendered) => web::HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(rendered),
        Err(e) => {
            error!("Error rendering page: {}", e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error rendering page: {}", e))
        }
    }
}

fn post_not_found(post_id: &str) -> web::HttpResponse {
    web::HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(format!("Post {} not found", post_id))
}

#[web::get("/post/{post_id}")]
async fn post_wo_slash(path: web::types::Path<String>) -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", path.into_inner() + "/")
        .content_type("text/html; charset=utf-8")
        .finish()
}

#[web::get("/post/{post_id}/")]
async fn view(path: web::types::Path<String>, state: State) -> web::HttpResponse {
    let post_id = path.into_inner();
    let Some(post) = state.store.get(&post_id) else {
        return post_not_found(&post_id);
    };

    let mut panel = CommentPanel::new(&state.comments, &post_id);
    panel.fetch().await;

    html_response(render_post_page(&state, post, &panel))
}

#[web::post("/post/{post_id}/comments")]
async fn post_comment(path: web::types::Path<String>, body: Bytes, state: State) -> web::HttpResponse {
    let post_id = path.into_inner();
    let Some(post) = state.store.get(&post_id) else {
        return post_not_found(&post_id);
    };

    let form: CommentForm = match serde_urlencoded::from_bytes(&body) {
        Ok(form) => form,
        Err(e) => {
            return web::HttpResponse::BadRequest()
                .body(format!("Invalid comment form: {}", e));
        }
    };

    html_response(submit_comment_form(&state, post, &form).await)
}

/// Form submission without the page script. A rejected submission renders the
/// form with its input and no list, so the backend sees no `list` call.
async fn submit_comment_form<S: CommentStore>(state: &AppState<S>, post: &Post, form: &CommentForm) -> io::Result<String> {
    let mut panel = CommentPanel::new(&state.comments, &post.id.0);
    panel.set_name(&form.name);
    panel.set_message(&form.message);
    panel.submit().await;

    render_post_page(state, post, &panel)
}

#[web::get("/api/comments/{post_id}")]
async fn api_list_comments(path: web::types::Path<String>, state: State) -> web::HttpResponse {
    let post_id = path.into_inner();
    match state.comments.list(&post_id).await {
        Ok(comments) => web::HttpResponse::Ok().json(&comments),
        Err(e) => {
            error!("Error fetching comments of post {}: {}", post_id, e);
            web::HttpResponse::BadGateway().json(&serde_json::json!({ "error": e.to_string() }))
        }
    }
}

#[web::post("/api/comments/{post_id}")]
async fn api_create_comment(path: web::types::Path<String>, form: web::types::Json<CommentForm>, state: State) -> web::HttpResponse {
    let post_id = path.into_inner();
    if state.store.get(&post_id).is_none() {
        return web::HttpResponse::NotFound().json(&serde_json::json!({ "error": format!("Post {} not found", post_id) }));
    }

    let new_comment = match NewComment::validated(&post_id, &form.name, &form.message) {
        Ok(new_comment) => new_comment,
        Err(e) => {
            return web::HttpResponse::BadRequest().json(&serde_json::json!({ "error": e.to_string() }));
        }
    };

    match state.comments.create(&new_comment).await {
        Ok(comment) => web::HttpResponse::Created().json(&comment),
        Err(e) => {
            error!("Error posting comment on post {}: {}", post_id, e);
            web::HttpResponse::BadGateway().json(&serde_json::json!({ "error": MSG_POST_FAILED }))
        }
    }
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: State) -> Result<NamedFile, web::Error> {
    if path.contains("..") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join(path.into_inner());
    Ok(NamedFile::open(file_path)?)
}

#[web::get("/")]
async fn index(state: State) -> web::HttpResponse {
    let rendered = read_template(&state.config, "index.tpl")
        .and_then(|template_src| {
            let renderer = IndexRenderer::new(&template_src)?;
            let chrome = Chrome::new(&state.config);
            Ok(renderer.render(&SiteChrome {
                site_title: &state.config.site.title,
                page_language: &state.config.site.page_language,
                scripts: &chrome.scripts,
                toggle_compact: &chrome.toggle_compact,
                toggle_full: &chrome.toggle_full,
            }, &state.store))
        });

    html_response(rendered)
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let store = ContentStore::load(&config.paths.posts_dir, &config.categories).map_err(|e| {
        io::Error::new(e.kind(), format!("Error loading posts from {}: {}", config.paths.posts_dir.display(), e))
    })?;
    info!("Loaded {} posts in {} categories", store.len(), store.categories().len());

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let app_state = Arc::new(AppState {
        store,
        code_blocks: CodeBlockPresenter::new(),
        articles: ContentCache::from_flag(config.defaults.rendering_cache_enabled),
        comments: CommentBackend::from_config(config.comments.as_ref()),
        config,
    });

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(index)
            .service(public_files)
            .service(view)
            .service(post_wo_slash)
            .service(post_comment)
            .service(api_list_comments)
            .service(api_create_comment)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
