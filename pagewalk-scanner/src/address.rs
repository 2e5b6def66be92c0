use serde::{Deserialize, Serialize};
use std::fmt;

/// Schemes that name a contact point rather than a fetchable page.
const CONTACT_SCHEMES: [&str; 4] = ["mailto:", "tel:", "sms:", "callto:"];

/// An absolute page reference with its fragment removed.
///
/// Two references that only differ by fragment are the same `Address`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl Into<String>) -> Self {
        let mut raw = raw.into();
        if let Some(idx) = raw.find('#') {
            raw.truncate(idx);
        }
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `mailto:`-style references, which are recorded but never fetched.
    pub fn is_contact(&self) -> bool {
        let lowered = self.0.to_lowercase();
        CONTACT_SCHEMES
            .iter()
            .any(|scheme| lowered.starts_with(scheme))
    }

    /// Case-insensitive substring test. An empty needle matches everything.
    pub fn contains_ci(&self, needle: &str) -> bool {
        self.0.to_lowercase().contains(&needle.to_lowercase())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Address {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}
