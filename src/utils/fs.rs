//! IO helper: 读取数据文档与偏好设置文件

use std::{
    collections::BTreeMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde_json::Value;
use crate::model::data_core::AppError;

/// 从文件读取JSON数据
pub fn read_json_file(p: &Path) -> Result<Value, AppError> {
    let f = File::open(p)?;
    let rdr = BufReader::new(f);
    let v: Value = serde_json::from_reader(rdr)?;
    Ok(v)
}

/// 键值偏好存储，持久化为一个 JSON 对象文件
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl PreferenceStore {
    /// 打开偏好文件；文件不存在时从空集合开始
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let values = if path.exists() {
            let f = File::open(&path)?;
            serde_json::from_reader(BufReader::new(f))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 写入并立即保存到文件（格式化输出）
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.values.insert(key.to_string(), value.to_string());
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let f = File::create(&self.path)?;
        serde_json::to_writer_pretty(f, &self.values)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_json_file() {
        let mut file = tempfile::NamedTempFile::new().expect("创建临时文件失败");
        file.write_all(br#"{"code": "0", "name": "root"}"#).unwrap();
        let v = read_json_file(file.path()).unwrap();
        assert_eq!(v["code"], "0");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json_file(&dir.path().join("no.json")).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn test_preferences_persist_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let mut store = PreferenceStore::open(&path).unwrap();
        assert_eq!(store.get("sinco-lang"), None);
        store.set("sinco-lang", "en").unwrap();

        let reopened = PreferenceStore::open(&path).unwrap();
        assert_eq!(reopened.get("sinco-lang"), Some("en"));
    }
}
