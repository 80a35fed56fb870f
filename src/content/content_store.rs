use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{fs, io};

use spdlog::{error, info, warn};

use crate::config::CategoryConfig;
use crate::content::post::{Post, PostId};

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub title: String,
    pub posts: Vec<PostId>,
}

/// Read-only map of every post known to the site, grouped by category.
pub struct ContentStore {
    posts: HashMap<PostId, Post>,
    categories: Vec<Category>,
}

impl ContentStore {
    pub fn new(posts: Vec<Post>, category_cfg: &[CategoryConfig]) -> ContentStore {
        let mut by_id: HashMap<PostId, Post> = HashMap::with_capacity(posts.len());
        for post in posts {
            if by_id.contains_key(&post.id) {
                warn!("Duplicated post id {} in {}. Keeping the first one", post.id, post.file_name.display());
                continue;
            }
            by_id.insert(post.id.clone(), post);
        }

        let categories = Self::group_categories(&by_id, category_cfg);

        ContentStore {
            posts: by_id,
            categories,
        }
    }

    /// Loads every markdown file under `posts_dir`. Files that fail to parse are
    /// logged and skipped.
    pub fn load(posts_dir: &Path, category_cfg: &[CategoryConfig]) -> io::Result<ContentStore> {
        let mut files = vec![];
        list_markdown_files(posts_dir, &mut files)?;
        files.sort();

        let mut posts = Vec::with_capacity(files.len());
        for file in files {
            match Post::from_file(&file) {
                Ok(post) => {
                    info!("Post: {} ({})", post.id, file.display());
                    posts.push(post);
                }
                Err(e) => error!("Skipping post {}: {}", file.display(), e),
            }
        }

        Ok(Self::new(posts, category_cfg))
    }

    pub fn get(&self, post_id: &str) -> Option<&Post> {
        self.posts.get(&PostId(post_id.to_string()))
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    fn group_categories(posts: &HashMap<PostId, Post>, category_cfg: &[CategoryConfig]) -> Vec<Category> {
        let mut by_category: HashMap<&str, Vec<&PostId>> = HashMap::new();
        for post in posts.values() {
            by_category.entry(post.category.as_str()).or_default().push(&post.id);
        }
        for ids in by_category.values_mut() {
            ids.sort();
        }

        let mut categories = vec![];
        for cfg in category_cfg {
            let mut ordered: Vec<PostId> = vec![];
            for post_id in cfg.posts.iter() {
                let post_id = PostId(post_id.clone());
                match posts.get(&post_id) {
                    Some(post) if post.category == cfg.id => ordered.push(post_id),
                    Some(post) => warn!("Post {} is listed in category {} but belongs to {}", post_id, cfg.id, post.category),
                    None => warn!("Post {} listed in category {} does not exist", post_id, cfg.id),
                }
            }

            if let Some(ids) = by_category.remove(cfg.id.as_str()) {
                for id in ids {
                    if !ordered.contains(id) {
                        ordered.push(id.clone());
                    }
                }
            }

            categories.push(Category {
                id: cfg.id.clone(),
                title: cfg.title.clone(),
                posts: ordered,
            });
        }

        // Categories without configuration are listed by their raw id
        let mut remaining: Vec<(&str, Vec<&PostId>)> = by_category.into_iter().collect();
        remaining.sort_by(|a, b| a.0.cmp(b.0));
        for (id, ids) in remaining {
            categories.push(Category {
                id: id.to_string(),
                title: id.to_string(),
                posts: ids.into_iter().cloned().collect(),
            });
        }

        categories
    }
}

fn list_markdown_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    let entries = fs::read_dir(dir)?;
    for entry in entries {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();
        if file_type.is_dir() {
            list_markdown_files(&path, files)?;
        } else if file_type.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }
    Ok(())
}
