use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

pub enum Expire {
    Never,
    After(Duration),
}

struct CacheValue<T> {
    expire_date: DateTime<Utc>,
    value: Arc<T>,
}

type CacheMap<T> = HashMap<String, CacheValue<T>>;

/// Rendered output keyed by post id. A non caching instance hands the value
/// back without storing it.
pub struct ContentCache<T> {
    cache: Option<RwLock<CacheMap<T>>>,
}

impl<T> ContentCache<T> {
    pub fn new() -> Self {
        ContentCache {
            cache: Some(RwLock::new(HashMap::new())),
        }
    }

    pub fn non_caching() -> Self {
        ContentCache {
            cache: None,
        }
    }

    pub fn from_flag(enabled: bool) -> Self {
        if enabled { Self::new() } else { Self::non_caching() }
    }

    pub fn get_article(&self, post_id: &str) -> Option<Arc<T>> {
        self.get(&format!("article-{}", post_id))
    }

    pub fn add_article(&self, post_id: &str, content: T, expire_after: Expire) -> Arc<T> {
        self.add(format!("article-{}", post_id), content, expire_after)
    }

    fn add(&self, key: String, content: T, expire_after: Expire) -> Arc<T> {
        let value = Arc::new(content);
        let Some(ref cache) = self.cache else {
            return value;
        };

        let expire_date = match expire_after {
            Expire::Never => DateTime::<Utc>::MAX_UTC,
            Expire::After(duration) => Utc::now() + duration,
        };

        // A poisoned lock only means the value is not cached
        if let Ok(mut cache) = cache.write() {
            cache.insert(key, CacheValue {
                expire_date,
                value: value.clone(),
            });
        }
        value
    }

    fn get(&self, key: &str) -> Option<Arc<T>> {
        let cache = self.cache.as_ref()?.read().ok()?;
        let cache_value = cache.get(key)?;
        if Utc::now() > cache_value.expire_date {
            return None;
        }
        Some(cache_value.value.clone())
    }
}

impl<T> Default for ContentCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get_never_expires() {
        let cache = ContentCache::new();
        let content = "<h1>Hello</h1>".to_string();

        let cached_content = cache.add_article("eam", content.clone(), Expire::Never);
        assert_eq!(Arc::strong_count(&cached_content), 2);

        let retrieved_content = cache.get_article("eam").unwrap();
        assert_eq!(retrieved_content.as_ref(), &content);
    }

    #[test]
    fn test_add_and_get_expires_after() {
        let cache = ContentCache::new();
        let content = "<h1>Hello</h1>".to_string();

        let cached_content = cache.add_article("eam", content.clone(), Expire::After(Duration::milliseconds(100)));
        let retrieved_content = cache.get_article("eam").unwrap();
        assert_eq!(cached_content.as_ref(), &content);
        assert_eq!(retrieved_content.as_ref(), &content);

        std::thread::sleep(std::time::Duration::from_millis(200));
        assert!(cache.get_article("eam").is_none());
    }

    #[test]
    fn test_get_nonexistent_key() {
        let cache: ContentCache<String> = ContentCache::new();
        assert!(cache.get_article("nonexistent").is_none());
    }

    #[test]
    fn test_non_caching_behavior() {
        let cache: ContentCache<String> = ContentCache::from_flag(false);
        let cached_content = cache.add_article("eam", "content".to_string(), Expire::Never);
        assert_eq!(Arc::strong_count(&cached_content), 1);
        assert!(cache.get_article("eam").is_none());
    }
}
