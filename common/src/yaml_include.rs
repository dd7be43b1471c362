use std::fs;
use std::path::Path;
use yaml_rust2::{Yaml, YamlLoader};

use crate::config::ConfigError;

/// Loads a YAML document, replacing `!include <relative path>` lines with the
/// referenced documents. Included documents are merged first, in order, and
/// the including document overrides them key by key.
pub fn load_yaml_with_includes(path: &Path) -> Result<Yaml, ConfigError> {
    let merged = process_includes_recursive(path, &mut Vec::new())?;
    tracing::debug!(path = %path.display(), "Resolved config includes");
    Ok(merged)
}

fn process_includes_recursive(path: &Path, stack: &mut Vec<std::path::PathBuf>) -> Result<Yaml, ConfigError> {
    if stack.iter().any(|p| p == path) {
        return Err(ConfigError::Scan {
            path: path.to_path_buf(),
            reason: "include cycle".to_string(),
        });
    }
    stack.push(path.to_path_buf());

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let base_path = path.parent().unwrap_or(Path::new(""));

    let (includes, rest): (Vec<&str>, Vec<&str>) = contents
        .lines()
        .partition(|&line| line.trim().starts_with("!include"));

    let mut merged_includes: Option<Yaml> = None;
    for line in includes {
        let include_path = line.trim().trim_start_matches("!include").trim();
        let included = process_includes_recursive(&base_path.join(include_path), stack)?;
        merged_includes = Some(match merged_includes {
            Some(acc) => merge_yaml(&acc, &included),
            None => included,
        });
    }

    let rest_yamls = YamlLoader::load_from_str(&rest.join("\n")).map_err(|e| ConfigError::Scan {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let merged_rest = rest_yamls
        .into_iter()
        .reduce(|acc, next| merge_yaml(&acc, &next))
        .unwrap_or_else(|| Yaml::Hash(Default::default()));

    stack.pop();

    Ok(match merged_includes {
        Some(base) => merge_yaml(&base, &merged_rest),
        None => merged_rest,
    })
}

fn merge_yaml(base: &Yaml, override_yaml: &Yaml) -> Yaml {
    match (base, override_yaml) {
        (Yaml::Hash(base_hash), Yaml::Hash(override_hash)) => {
            let mut result = base_hash.clone();
            for (key, value) in override_hash {
                match base_hash.get(key) {
                    Some(base_value) => {
                        result.insert(key.clone(), merge_yaml(base_value, value));
                    }
                    None => {
                        result.insert(key.clone(), value.clone());
                    }
                }
            }
            Yaml::Hash(result)
        }
        (_, override_value) => override_value.clone(),
    }
}
