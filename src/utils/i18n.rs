//! 界面语言：内置资源加载、语言解析与偏好持久化

use std::collections::HashMap;

use crate::model::data_core::AppError;
use crate::utils::fs::PreferenceStore;
use crate::vm::bridge::LANG_STORAGE_KEY;

const ES_RESOURCE: &str = include_str!("../../i18n/es.json");
const EN_RESOURCE: &str = include_str!("../../i18n/en.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    pub const ALL: [Self; 2] = [Self::Es, Self::En];

    pub fn code(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }

    /// 取语言标签前两位（如 `en_US.UTF-8` → `en`）；不支持的语言返回 None
    pub fn from_tag(tag: &str) -> Option<Self> {
        let prefix: String = tag.trim().chars().take(2).collect::<String>().to_lowercase();
        Self::ALL.into_iter().find(|l| l.code() == prefix)
    }

    fn raw_resource(self) -> &'static str {
        match self {
            Self::Es => ES_RESOURCE,
            Self::En => EN_RESOURCE,
        }
    }
}

/// 加载语言资源；不支持的语言回退到西班牙语
pub fn load_resource(lang: &str) -> Result<HashMap<String, String>, AppError> {
    let locale = Locale::from_tag(lang).unwrap_or_default();
    let map: HashMap<String, String> = serde_json::from_str(locale.raw_resource())?;
    Ok(map)
}

/// 依次取界面选择、已保存的偏好、系统语言中第一个存在的值
pub fn resolve_locale(selected: Option<&str>, stored: Option<&str>, system: Option<&str>) -> Locale {
    selected
        .or(stored)
        .or(system)
        .and_then(Locale::from_tag)
        .unwrap_or_default()
}

/// 系统语言（取自 `LANG` 环境变量）
pub fn system_language() -> Option<String> {
    std::env::var("LANG").ok().filter(|s| !s.is_empty())
}

/// 当前生效的翻译表
#[derive(Debug, Clone)]
pub struct Translations {
    locale: Locale,
    map: HashMap<String, String>,
}

impl Translations {
    pub fn load(locale: Locale) -> Result<Self, AppError> {
        Ok(Self {
            locale,
            map: load_resource(locale.code())?,
        })
    }

    /// 按偏好解析语言，加载资源，并把最终语言写回偏好
    pub fn from_preferences(
        store: &mut PreferenceStore,
        selected: Option<&str>,
    ) -> Result<Self, AppError> {
        let system = system_language();
        let locale = resolve_locale(selected, store.get(LANG_STORAGE_KEY), system.as_deref());
        let t = Self::load(locale)?;
        store.set(LANG_STORAGE_KEY, locale.code())?;
        tracing::info!("界面语言: {}", locale.code());
        Ok(t)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// 缺失的键原样返回
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.map.get(key).map(String::as_str).unwrap_or(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resources_have_same_keys() {
        let es = load_resource("es").unwrap();
        let en = load_resource("en").unwrap();
        let mut es_keys: Vec<_> = es.keys().collect();
        let mut en_keys: Vec<_> = en.keys().collect();
        es_keys.sort();
        en_keys.sort();
        assert_eq!(es_keys, en_keys);
        assert_eq!(en["views.tree"], "Tree");
    }

    #[test]
    fn test_unknown_language_falls_back_to_spanish() {
        let fr = load_resource("fr").unwrap();
        assert_eq!(fr["views.table"], "Tabla");
    }

    #[test]
    fn test_resolve_locale_order() {
        assert_eq!(resolve_locale(Some("en"), Some("es"), None), Locale::En);
        assert_eq!(resolve_locale(None, Some("en"), Some("es_MX")), Locale::En);
        assert_eq!(resolve_locale(None, None, Some("en_US.UTF-8")), Locale::En);
        assert_eq!(resolve_locale(None, None, Some("de_DE")), Locale::Es);
        assert_eq!(resolve_locale(None, None, None), Locale::Es);
    }

    #[test]
    fn test_selection_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PreferenceStore::open(dir.path().join("prefs.json")).unwrap();
        let t = Translations::from_preferences(&mut store, Some("en")).unwrap();
        assert_eq!(t.locale(), Locale::En);
        assert_eq!(store.get(LANG_STORAGE_KEY), Some("en"));

        let again = Translations::from_preferences(&mut store, None).unwrap();
        assert_eq!(again.locale(), Locale::En);
        assert_eq!(again.get("views.cards"), "Cards");
        assert_eq!(again.get("missing.key"), "missing.key");
    }
}
