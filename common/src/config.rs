use std::{collections::HashMap, path::Path};

use anyhow::{bail, Context, Result};
use hocon::{Hocon, HoconLoader};
use log::debug;

/// Reads typed options out of a HOCON file.
///
/// Lookups check, in order: an environment variable with the exact key name, the key inside
/// the configured scope, then the key at the top level of the file.
#[derive(Debug)]
pub struct ConfigLoader {
    hocon: Hocon,
    env: HashMap<String, String>,
    scope: String,
}

impl ConfigLoader {
    pub fn new(path: impl AsRef<Path>, scope: String) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The config file {:?} was not found", path);
        }

        let env = std::env::vars().collect::<HashMap<_, _>>();

        let hocon = HoconLoader::new()
            .load_file(path)
            .with_context(|| format!("Failed to find or load config file at: {:?}", path))?
            .hocon()
            .with_context(|| format!("Failed to parse config file at: {:?}", path))?;

        debug!("Loaded config {:?} with scope {}", path, scope);

        Ok(Self { hocon, env, scope })
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.env.get(name) {
            return Some(Value::String(value.clone()));
        }

        let scope = &self.hocon[self.scope.as_str()];
        if matches!(scope, Hocon::Hash(_)) {
            if let Some(value) = Self::map_hocon(scope, name) {
                return Some(value);
            }
        }

        Self::map_hocon(&self.hocon, name)
    }

    pub fn load<T: Config>(&self) -> Result<T> {
        let res = T::load(self)?;
        Ok(res)
    }

    fn map_hocon(hocon: &Hocon, name: &str) -> Option<Value> {
        match &hocon[name] {
            Hocon::Real(f64) => Some(Value::Float(*f64)),
            Hocon::Integer(i64) => Some(Value::Integer(*i64)),
            Hocon::String(string) => Some(Value::String(string.clone())),
            Hocon::Boolean(bool) => Some(Value::Boolean(*bool)),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(val) => Some(*val),
            Value::String(val) => Hocon::String(val.clone()).as_bool(),
            _ => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            Value::Integer(val) => usize::try_from(*val).ok(),
            Value::String(val) => val.parse::<usize>().ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Integer(val) => u64::try_from(*val).ok(),
            Value::String(val) => val.parse::<u64>().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(val) => Some(*val),
            Value::Integer(val) => Some(*val as f64),
            Value::String(val) => val.parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::String(val) => Some(val.clone()),
            Value::Boolean(true) => Some("true".to_string()),
            Value::Boolean(false) => Some("false".to_string()),
            Value::Float(val) => Some(val.to_string()),
            Value::Integer(val) => Some(val.to_string()),
        }
    }
}

pub trait Config {
    fn load(config: &ConfigLoader) -> Result<Self>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".conf")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ConfigLoader::new("/definitely/not/here.conf", "play".to_string());

        assert!(result.is_err());
    }

    #[test]
    fn test_scoped_value_takes_precedence_over_top_level() {
        let file = write_config(
            r#"
            mcts_test_iterations = 10
            play {
                mcts_test_iterations = 25
            }
            "#,
        );

        let config = ConfigLoader::new(file.path(), "play".to_string()).unwrap();

        assert_eq!(
            config.get("mcts_test_iterations").and_then(|v| v.as_usize()),
            Some(25)
        );
    }

    #[test]
    fn test_falls_back_to_top_level() {
        let file = write_config(
            r#"
            mcts_test_exploration = 1.5
            mcts_test_flip = true
            self_play {
                mcts_test_games = 3
            }
            "#,
        );

        let config = ConfigLoader::new(file.path(), "play".to_string()).unwrap();

        assert_eq!(
            config.get("mcts_test_exploration").and_then(|v| v.as_f64()),
            Some(1.5)
        );
        assert_eq!(
            config.get("mcts_test_flip").and_then(|v| v.as_bool()),
            Some(true)
        );
        assert!(config.get("mcts_test_games").is_none());
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::Integer(4).as_f64(), Some(4.0));
        assert_eq!(Value::Integer(-4).as_usize(), None);
        assert_eq!(Value::String("12".to_string()).as_usize(), Some(12));
        assert_eq!(Value::String("0.25".to_string()).as_f64(), Some(0.25));
        assert_eq!(Value::Boolean(false).as_string(), Some("false".to_string()));
        assert_eq!(Value::Float(1.0).as_bool(), None);
    }
}
