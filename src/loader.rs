//! @acp:module "Loader"
//! @acp:summary "Reads API source files and discovers per-version files"
//! @acp:domain schema
//! @acp:layer data-access

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{ApiError, Result};
use crate::parse::normalize_source;

/// Name of the version index inside an API directory
pub const VERSION_INDEX_FILE: &str = "index.js";

/// @acp:summary "Read an API source file and normalize it"
pub fn load_api_file(path: &Path) -> Result<String> {
    let code = std::fs::read_to_string(path).map_err(|source| ApiError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(normalize_source(&code))
}

/// @acp:summary "Locate the API file for `version` through the directory's index.js"
///
/// Understands both index layouts:
/// `get '5.3'() { return require('./5_3'); },` and `'5.0': require('./5_0'),`
pub fn find_api_version_file(version: &str, apis_dir: &Path) -> Result<PathBuf> {
    let index = apis_dir.join(VERSION_INDEX_FILE);
    let code = std::fs::read_to_string(&index).map_err(|source| ApiError::ApiListLoad {
        path: index.clone(),
        source,
    })?;

    let quoted = regex::escape(version);
    let getter = Regex::new(&format!(r"'{}'\(\).*require\('([^']+)'\)", quoted))
        .map_err(|e| ApiError::Config(e.to_string()))?;
    let mapped = Regex::new(&format!(r"'{}':\s*require\('([^']+)'\)", quoted))
        .map_err(|e| ApiError::Config(e.to_string()))?;

    let module = getter
        .captures(&code)
        .or_else(|| mapped.captures(&code))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ApiError::UnknownVersion {
            version: version.to_string(),
            index: index.clone(),
        })?;

    let file = apis_dir.join(format!("{}.js", module.trim_start_matches("./")));
    tracing::debug!("API version {} resolved to {}", version, file.display());
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_index(dir: &TempDir, content: &str) {
        std::fs::write(dir.path().join(VERSION_INDEX_FILE), content).unwrap();
    }

    #[test]
    fn test_getter_layout() {
        let dir = TempDir::new().unwrap();
        write_index(
            &dir,
            "module.exports = {\n  get '_default'() { return require('./5_3'); },\n  get '5.3'() { return require('./5_3'); },\n  get '2.4'() { return require('./2_4'); },\n};",
        );
        assert_eq!(
            find_api_version_file("2.4", dir.path()).unwrap(),
            dir.path().join("2_4.js")
        );
        assert_eq!(
            find_api_version_file("_default", dir.path()).unwrap(),
            dir.path().join("5_3.js")
        );
    }

    #[test]
    fn test_map_layout() {
        let dir = TempDir::new().unwrap();
        write_index(
            &dir,
            "module.exports = {\n  '_default': require('./5_0'),\n  '5.0': require('./5_0'),\n  '1.7': require('./1_7'),\n};",
        );
        assert_eq!(
            find_api_version_file("1.7", dir.path()).unwrap(),
            dir.path().join("1_7.js")
        );
    }

    #[test]
    fn test_version_dot_is_literal() {
        let dir = TempDir::new().unwrap();
        write_index(&dir, "  '5x0': require('./wrong'),\n");
        let err = find_api_version_file("5.0", dir.path()).unwrap_err();
        assert!(matches!(err, ApiError::UnknownVersion { .. }));
    }

    #[test]
    fn test_missing_files() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            find_api_version_file("5.0", dir.path()),
            Err(ApiError::ApiListLoad { .. })
        ));
        let err = load_api_file(&dir.path().join("nope.js")).unwrap_err();
        assert!(err.to_string().contains("nope.js"));
    }

    #[test]
    fn test_load_normalizes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api.js");
        std::fs::write(&path, "api.indices.prototype['delete'] = ca({});").unwrap();
        assert_eq!(
            load_api_file(&path).unwrap(),
            "api.indices.prototype.delete = ca({});"
        );
    }
}
