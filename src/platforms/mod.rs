//! User-editable list of AI chat sites a prompt can be opened in.

use crate::error::{ResumeError, Result};
use crate::models::{default_platforms, AiPlatform};
use crate::storage::{KvStore, PLATFORMS_KEY};
use crate::util::{mint_time_id, non_blank, system_clock, Clock};
use leptos::logging::log;
use url::Url;

/// Accepts only absolute `http`/`https` URLs.
pub fn validate_platform_url(raw: &str) -> Result<String> {
    let raw = non_blank(raw).ok_or_else(|| ResumeError::validation("请输入平台地址"))?;
    let url = Url::parse(&raw).map_err(|_| ResumeError::validation("请输入有效的网址"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ResumeError::validation("请输入有效的网址"));
    }
    Ok(raw)
}

fn normalized(platform: AiPlatform) -> Result<AiPlatform> {
    let name = non_blank(&platform.name).ok_or_else(|| ResumeError::validation("请输入平台名称"))?;
    let url = validate_platform_url(&platform.url)?;
    Ok(AiPlatform {
        name,
        url,
        icon: platform.icon.as_deref().and_then(non_blank),
        ..platform
    })
}

pub struct AiPlatformRegistry<S> {
    store: S,
    clock: Clock,
    platforms: Vec<AiPlatform>,
}

impl<S: KvStore> AiPlatformRegistry<S> {
    pub fn load(store: S) -> Self {
        Self::load_with_clock(store, system_clock())
    }

    pub fn load_with_clock(store: S, clock: Clock) -> Self {
        let platforms = store
            .load_json::<Vec<AiPlatform>>(PLATFORMS_KEY)
            .unwrap_or_else(|| {
                let seed = default_platforms();
                store.persist_json(PLATFORMS_KEY, &seed);
                seed
            });
        Self {
            store,
            clock,
            platforms,
        }
    }

    fn persist(&self) {
        self.store.persist_json(PLATFORMS_KEY, &self.platforms);
    }

    pub fn list(&self) -> &[AiPlatform] {
        &self.platforms
    }

    pub fn get(&self, id: &str) -> Option<&AiPlatform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn add(&mut self, name: &str, url: &str, icon: Option<&str>) -> Result<String> {
        let id = mint_time_id((self.clock)(), |id| self.get(id).is_some());
        let platform = normalized(AiPlatform {
            id: id.clone(),
            name: name.to_string(),
            url: url.to_string(),
            icon: icon.map(str::to_string),
        })?;
        self.platforms.push(platform);
        self.persist();
        log!("added AI platform {}", id);
        Ok(id)
    }

    /// Replaces the entry with the same id.
    pub fn update(&mut self, platform: AiPlatform) -> Result<()> {
        let platform = normalized(platform)?;
        let slot = self
            .platforms
            .iter_mut()
            .find(|p| p.id == platform.id)
            .ok_or_else(|| ResumeError::not_found(format!("platform {}", platform.id)))?;
        *slot = platform;
        self.persist();
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.platforms.len();
        self.platforms.retain(|p| p.id != id);
        if self.platforms.len() == before {
            return Err(ResumeError::not_found(format!("platform {}", id)));
        }
        self.persist();
        log!("deleted AI platform {}", id);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.platforms = default_platforms();
        self.persist();
        log!("AI platforms reset to defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::util::testing::frozen_clock;

    fn registry() -> (MemoryStore, AiPlatformRegistry<MemoryStore>) {
        let store = MemoryStore::new();
        let r = AiPlatformRegistry::load_with_clock(store.clone(), frozen_clock());
        (store, r)
    }

    #[test]
    fn test_seeded_on_first_load() {
        let (store, r) = registry();
        let names: Vec<&str> = r.list().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["DeepSeek Chat", "Qwen Chat", "豆包"]);
        assert!(store.get_item(PLATFORMS_KEY).is_some());
    }

    #[test]
    fn test_validate_platform_url() {
        assert!(validate_platform_url("https://chat.example.com/").is_ok());
        assert_eq!(validate_platform_url("  http://x.io ").unwrap(), "http://x.io");
        for bad in ["", "   ", "chat.example.com", "javascript:alert(1)", "ftp://x.io"] {
            assert!(
                matches!(validate_platform_url(bad), Err(ResumeError::Validation(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_add_mints_distinct_ids() {
        let (store, mut r) = registry();
        let a = r.add("Kimi", "https://kimi.moonshot.cn/", Some(" ")).unwrap();
        let b = r.add("Other", "https://other.ai/", Some("bot")).unwrap();
        assert_ne!(a, b);
        assert_eq!(r.get(&a).unwrap().icon, None);
        assert_eq!(r.get(&b).unwrap().icon.as_deref(), Some("bot"));

        let reloaded = AiPlatformRegistry::load_with_clock(store, frozen_clock());
        assert_eq!(reloaded.list().len(), 5);
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let (_, mut r) = registry();
        assert!(r.add("", "https://x.io", None).is_err());
        assert!(r.add("X", "not a url", None).is_err());
        assert_eq!(r.list().len(), 3);
    }

    #[test]
    fn test_update_and_delete() {
        let (_, mut r) = registry();
        let mut qwen = r.get("qwen").unwrap().clone();
        qwen.name = "通义千问".to_string();
        r.update(qwen).unwrap();
        assert_eq!(r.get("qwen").unwrap().name, "通义千问");

        let mut broken = r.get("qwen").unwrap().clone();
        broken.url = "nope".to_string();
        assert!(r.update(broken).is_err());
        assert_eq!(r.get("qwen").unwrap().url, "https://chat.qwen.ai/");

        let ghost = AiPlatform {
            id: "ghost".to_string(),
            name: "g".to_string(),
            url: "https://g.io".to_string(),
            icon: None,
        };
        assert!(matches!(r.update(ghost), Err(ResumeError::NotFound(_))));

        r.delete("qwen").unwrap();
        assert!(r.delete("qwen").is_err());
        r.reset();
        assert_eq!(r.list().len(), 3);
    }
}
