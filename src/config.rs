use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

use crate::anchors::AnchorStrategy;
use crate::markup::style::StyleMap;

#[derive(Deserialize)]
pub struct Site {
    pub title: String,
    #[serde(default = "default_page_language")]
    pub page_language: String,
}

#[derive(Deserialize)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
    pub posts_dir: PathBuf,
}

#[derive(Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub anchor_strategy: AnchorStrategy,
    #[serde(default)]
    pub rendering_cache_enabled: bool,
    #[serde(default = "default_copy_revert_ms")]
    pub copy_revert_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            anchor_strategy: AnchorStrategy::default(),
            rendering_cache_enabled: false,
            copy_revert_ms: default_copy_revert_ms(),
        }
    }
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Copy, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CommentBackendKind {
    #[default]
    Memory,
    Rest,
}

#[derive(Deserialize)]
pub struct Comments {
    #[serde(default)]
    pub backend: CommentBackendKind,
    pub url: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_comment_table")]
    pub table: String,
}

#[derive(Deserialize, Clone)]
pub struct Translate {
    #[serde(default = "default_script_src")]
    pub script_src: String,
    #[serde(default = "default_target_language")]
    pub target_language: String,
    #[serde(default = "default_ready_poll_ms")]
    pub ready_poll_ms: u64,
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
}

impl Default for Translate {
    fn default() -> Self {
        Translate {
            script_src: default_script_src(),
            target_language: default_target_language(),
            ready_poll_ms: default_ready_poll_ms(),
            ready_timeout_ms: default_ready_timeout_ms(),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct CategoryConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub posts: Vec<String>,
}

#[derive(Deserialize)]
pub struct Config {
    pub site: Site,
    pub paths: Paths,
    #[serde(default)]
    pub defaults: Defaults,
    pub server: Server,
    pub log: Option<Log>,
    pub comments: Option<Comments>,
    #[serde(default)]
    pub translate: Translate,
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    #[serde(default)]
    pub styles: StyleMap,
}

fn default_page_language() -> String {
    "en".to_string()
}

fn default_copy_revert_ms() -> u64 {
    2000
}

fn default_comment_table() -> String {
    "comments".to_string()
}

fn default_script_src() -> String {
    "https://translate.google.com/translate_a/element.js?cb=googleTranslateElementInit".to_string()
}

fn default_target_language() -> String {
    "ta".to_string()
}

fn default_ready_poll_ms() -> u64 {
    500
}

fn default_ready_timeout_ms() -> u64 {
    30_000
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    if !path.starts_with("${exe_dir}") {
        return Ok(path);
    }

    let cur_exe = env::current_exe()?;
    let exe_dir = cur_exe.parent().unwrap_or(Path::new("."));
    let str_path = path.to_string_lossy();
    Ok(PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy())))
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    if let Some(ref comments) = cfg.comments {
        if comments.backend == CommentBackendKind::Rest && comments.url.is_none() {
            return Err(io::Error::new(
                ErrorKind::InvalidData, "The rest comment backend requires comments.url"));
        }
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    let mut cfg = parse_config(&cfg_content)?;

    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir)?,
        public_dir: parse_path(cfg.paths.public_dir)?,
        posts_dir: parse_path(cfg.paths.posts_dir)?,
    };

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use crate::test_data::CONFIG_DATA;

    use super::*;

    #[test]
    fn test_parse_full_config() {
        let cfg = parse_config(CONFIG_DATA).unwrap();
        assert_eq!(cfg.site.title, "Directory Notes");
        assert_eq!(cfg.site.page_language, "en");
        assert_eq!(cfg.paths.posts_dir, PathBuf::from("res/posts"));
        assert_eq!(cfg.defaults.anchor_strategy, AnchorStrategy::Positional);
        assert!(cfg.defaults.rendering_cache_enabled);
        assert_eq!(cfg.defaults.copy_revert_ms, 2000);
        assert_eq!(cfg.server.port, 8001);
        assert_eq!(cfg.translate.target_language, "ta");
        assert_eq!(cfg.translate.ready_poll_ms, 500);
        assert_eq!(cfg.categories.len(), 2);
        assert_eq!(cfg.categories[1].posts, vec!["eam".to_string()]);
        assert_eq!(cfg.comments.unwrap().backend, CommentBackendKind::Memory);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = parse_config(r##"
[site]
title = "Notes"

[paths]
template_dir = "template"
public_dir = "public"
posts_dir = "posts"

[server]
address = "127.0.0.1"
port = 8080
"##).unwrap();
        assert_eq!(cfg.defaults.anchor_strategy, AnchorStrategy::Positional);
        assert_eq!(cfg.defaults.copy_revert_ms, 2000);
        assert!(cfg.comments.is_none());
        assert!(cfg.log.is_none());
        assert!(cfg.categories.is_empty());
        assert_eq!(cfg.translate.ready_timeout_ms, 30_000);
    }

    #[test]
    fn test_rest_backend_requires_url() {
        let res = parse_config(r##"
[site]
title = "Notes"

[paths]
template_dir = "template"
public_dir = "public"
posts_dir = "posts"

[server]
address = "127.0.0.1"
port = 8080

[comments]
backend = "rest"
"##);
        let err = res.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_exe_dir_is_expanded() {
        let path = parse_path(PathBuf::from("${exe_dir}/posts")).unwrap();
        assert!(!path.to_string_lossy().contains("${exe_dir}"));
        assert!(path.ends_with("posts"));
    }
}
