use crate::utils::error::{Result, TravelError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceKey {
    TravelDates,
    Interests,
    LockedLocations,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 3] = [
        PreferenceKey::TravelDates,
        PreferenceKey::Interests,
        PreferenceKey::LockedLocations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceKey::TravelDates => "travel_dates",
            PreferenceKey::Interests => "interests",
            PreferenceKey::LockedLocations => "locked_locations",
        }
    }
}

impl FromStr for PreferenceKey {
    type Err = TravelError;

    fn from_str(s: &str) -> Result<Self> {
        PreferenceKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s.trim())
            .ok_or_else(|| TravelError::UnknownPreferenceKey { key: s.to_string() })
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceValue {
    Text(Option<String>),
    List(Vec<String>),
}

impl fmt::Display for PreferenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceValue::Text(Some(text)) => f.write_str(text),
            PreferenceValue::Text(None) => f.write_str("not set"),
            PreferenceValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// Travel constraints collected over one conversation.
///
/// List-valued fields are append-only and never hold the same entry twice;
/// `travel_dates` is a single opaque string that later updates overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    travel_dates: Option<String>,
    interests: Vec<String>,
    locked_locations: Vec<String>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `value` to the field named by `key` and returns the
    /// confirmation shown to the user. Unknown keys are rejected.
    pub fn update(&mut self, key: &str, value: &str) -> Result<String> {
        let key: PreferenceKey = key.parse()?;
        let value = value.trim();
        if value.is_empty() {
            return Err(TravelError::InvalidPreferenceValue {
                key: key.to_string(),
                reason: "value cannot be empty".to_string(),
            });
        }

        match key {
            PreferenceKey::TravelDates => self.set_travel_dates(value),
            PreferenceKey::Interests => {
                self.add_interest(value);
            }
            PreferenceKey::LockedLocations => {
                self.lock_location(value);
            }
        }

        tracing::debug!("Preference {} updated", key);
        Ok(format!("Updated {}: {}", key, self.value_of(key)))
    }

    pub fn get(&self, key: &str) -> Result<PreferenceValue> {
        let key: PreferenceKey = key.parse()?;
        Ok(self.value_of(key))
    }

    pub fn value_of(&self, key: PreferenceKey) -> PreferenceValue {
        match key {
            PreferenceKey::TravelDates => PreferenceValue::Text(self.travel_dates.clone()),
            PreferenceKey::Interests => PreferenceValue::List(self.interests.clone()),
            PreferenceKey::LockedLocations => PreferenceValue::List(self.locked_locations.clone()),
        }
    }

    pub fn travel_dates(&self) -> Option<&str> {
        self.travel_dates.as_deref()
    }

    pub fn interests(&self) -> &[String] {
        &self.interests
    }

    pub fn locked_locations(&self) -> &[String] {
        &self.locked_locations
    }

    pub fn set_travel_dates(&mut self, dates: &str) {
        self.travel_dates = Some(dates.trim().to_string());
    }

    /// Returns `false` when the interest was already recorded.
    pub fn add_interest(&mut self, interest: &str) -> bool {
        push_unique(&mut self.interests, interest)
    }

    /// Returns `false` when the location was already locked.
    pub fn lock_location(&mut self, location: &str) -> bool {
        push_unique(&mut self.locked_locations, location)
    }
}

fn push_unique(items: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || items.iter().any(|existing| existing == value) {
        return false;
    }
    items.push(value.to_string());
    true
}
