use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a data field.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fid(String);

impl Fid {
    pub fn new(fid: impl Into<String>) -> Self {
        Self(fid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fid {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Fid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A selectable data field. Only its identity matters to the selection logic,
/// name and description are carried for labelling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    fid: Fid,
    name: String,
    description: Option<String>,
}

impl Field {
    pub fn new(fid: impl Into<Fid>, name: impl Into<String>) -> Self {
        Self {
            fid: fid.into(),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn fid(&self) -> &Fid {
        &self.fid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Text shown next to the node: description when present, name otherwise.
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_description() {
        let plain = Field::new("f0", "age");
        assert_eq!(plain.label(), "age");

        let described = Field::new("f1", "inc").with_description("yearly income");
        assert_eq!(described.label(), "yearly income");
        assert_eq!(described.name(), "inc");
    }

    #[test]
    fn fid_serializes_as_plain_string() {
        let json = serde_json::to_string(&Fid::new("f0")).unwrap();
        assert_eq!(json, r#""f0""#);
    }
}
