use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

pub type Map = BTreeMap<String, String>;

/// Selects resources by exact label equality.
///
/// An empty selector selects everything, which mirrors how the API server treats an empty
/// `labelSelector` query parameter.
#[derive(Clone, Debug, Eq, PartialEq, Default, Deserialize, Serialize)]
pub struct Selector(Map);

// === Selector ===

impl Selector {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Formats the selector as a `labelSelector` query, e.g. `app=reviews,version=v1`.
impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

impl From<Option<Map>> for Selector {
    fn from(map: Option<Map>) -> Self {
        Self(map.unwrap_or_default())
    }
}
