// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Interpreted Command Domain
//!
//! Value types produced by the two-stage interpreter: the situation
//! [`Intent`], the [`ActivationCode`] armed on the device and the
//! [`InterpretedCommand`] record that carries both to the goal compiler.
//!
//! ## Invariants
//!
//! | Type | Invariant |
//! |------|-----------|
//! | `Intent` | Exactly five values; any foreign label coerces to `NORMAL` |
//! | `ActivationCode` | `SURVIVAL` never carries a duration suffix |
//! | `InterpretedCommand` | `device_battery` is always `null` |
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements the structured intent record

use serde::{Deserialize, Serialize};
use std::fmt;

/// Situation context selected in the Survival Agent app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum Intent {
    #[default]
    Normal,
    Traveling,
    Crowded,
    Aggressive,
    SaveBattery,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::Normal,
        Intent::Traveling,
        Intent::Crowded,
        Intent::Aggressive,
        Intent::SaveBattery,
    ];

    /// Wire label, e.g. `SAVE_BATTERY`
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Normal => "NORMAL",
            Intent::Traveling => "TRAVELING",
            Intent::Crowded => "CROWDED",
            Intent::Aggressive => "AGGRESSIVE",
            Intent::SaveBattery => "SAVE_BATTERY",
        }
    }

    /// Coerce an arbitrary label into the closed set.
    ///
    /// Unknown labels become [`Intent::Normal`], the safety default.
    pub fn coerce(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|intent| intent.as_str().eq_ignore_ascii_case(label.trim()))
            .unwrap_or_default()
    }

    /// Label rendered into the compiled goal: first letter upper-cased,
    /// the rest lower-cased (`TRAVELING` -> `Traveling`).
    pub fn display_label(&self) -> String {
        let lower = self.as_str().to_lowercase();
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<String> for Intent {
    fn from(label: String) -> Self {
        Self::coerce(&label)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating mode prefix of an activation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationCategory {
    Hiking,
    Out,
    Travel,
    /// Default category; never carries a duration
    Survival,
}

impl ActivationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationCategory::Hiking => "HIKING",
            ActivationCategory::Out => "OUT",
            ActivationCategory::Travel => "TRAVEL",
            ActivationCategory::Survival => "SURVIVAL",
        }
    }
}

/// Token telling the automation engine which mode to arm, e.g. `HIKING-2H`.
///
/// The duration is kept as the digits the user wrote (`02` stays `02`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActivationCode {
    category: ActivationCategory,
    hours: Option<String>,
}

impl ActivationCode {
    /// Build a code. A duration on `SURVIVAL`, a non-numeric duration or an
    /// all-zero duration is dropped.
    pub fn new(category: ActivationCategory, hours: Option<String>) -> Self {
        let hours = match category {
            ActivationCategory::Survival => None,
            _ => hours.filter(|h| is_duration_digits(h)),
        };
        Self { category, hours }
    }

    pub fn survival() -> Self {
        Self::new(ActivationCategory::Survival, None)
    }

    pub fn category(&self) -> ActivationCategory {
        self.category
    }

    pub fn hours(&self) -> Option<&str> {
        self.hours.as_deref()
    }

    /// Parse the wire form (`OUT`, `TRAVEL-12H`, ...).
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim().to_ascii_uppercase();
        let (prefix, suffix) = match token.split_once('-') {
            Some((prefix, suffix)) => (prefix.to_string(), Some(suffix.to_string())),
            None => (token, None),
        };

        let category = match prefix.as_str() {
            "HIKING" => ActivationCategory::Hiking,
            "OUT" => ActivationCategory::Out,
            "TRAVEL" => ActivationCategory::Travel,
            "SURVIVAL" => ActivationCategory::Survival,
            _ => return None,
        };

        let hours = match suffix {
            Some(s) => {
                let digits = s.strip_suffix('H')?;
                if !is_duration_digits(digits) || category == ActivationCategory::Survival {
                    return None;
                }
                Some(digits.to_string())
            }
            None => None,
        };

        Some(Self::new(category, hours))
    }
}

/// Non-empty ASCII digits, not all zero
pub fn is_duration_digits(digits: &str) -> bool {
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && digits.bytes().any(|b| b != b'0')
}

impl fmt::Display for ActivationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hours {
            Some(hours) => write!(f, "{}-{}H", self.category.as_str(), hours),
            None => f.write_str(self.category.as_str()),
        }
    }
}

impl Serialize for ActivationCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ActivationCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ActivationCode::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid activation code '{}'", raw)))
    }
}

/// Where the trusted person's name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameSource {
    /// Deterministic rule extraction
    Rule,
    /// Language-model fallback (untrusted)
    Resolver,
    #[default]
    Unresolved,
}

/// Structured intent produced once per input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretedCommand {
    /// Possibly empty; the goal compiler rejects an empty name
    pub trusted_person: String,

    pub activation_code: ActivationCode,

    /// Always `null`: the automation engine reads the battery from Settings
    #[serde(default, deserialize_with = "always_none")]
    pub device_battery: Option<u8>,

    pub situation_intent: Intent,

    /// Provenance of `trusted_person`, kept out of the wire record
    #[serde(skip)]
    pub name_source: NameSource,
}

impl InterpretedCommand {
    pub fn new(
        trusted_person: impl Into<String>,
        activation_code: ActivationCode,
        situation_intent: Intent,
        name_source: NameSource,
    ) -> Self {
        Self {
            trusted_person: trusted_person.into(),
            activation_code,
            device_battery: None,
            situation_intent,
            name_source,
        }
    }

    pub fn has_trusted_person(&self) -> bool {
        !self.trusted_person.trim().is_empty()
    }
}

fn always_none<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    let _ = serde_json::Value::deserialize(deserializer)?;
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_intent_coercion_defaults_to_normal() {
        assert_eq!(Intent::coerce("TRAVELING"), Intent::Traveling);
        assert_eq!(Intent::coerce("save_battery"), Intent::SaveBattery);
        assert_eq!(Intent::coerce("PANIC"), Intent::Normal);
        assert_eq!(Intent::coerce(""), Intent::Normal);
    }

    #[test]
    fn test_intent_display_label() {
        assert_eq!(Intent::Traveling.display_label(), "Traveling");
        assert_eq!(Intent::Normal.display_label(), "Normal");
        assert_eq!(Intent::SaveBattery.display_label(), "Save_battery");
    }

    #[test]
    fn test_intent_deserializes_unknown_as_normal() {
        let intent: Intent = serde_json::from_str("\"HYSTERICAL\"").unwrap();
        assert_eq!(intent, Intent::Normal);
        assert_eq!(serde_json::to_string(&Intent::SaveBattery).unwrap(), "\"SAVE_BATTERY\"");
    }

    #[test]
    fn test_survival_never_carries_duration() {
        let code = ActivationCode::new(ActivationCategory::Survival, Some("4".to_string()));
        assert_eq!(code.to_string(), "SURVIVAL");
        assert_eq!(code.hours(), None);
        assert!(ActivationCode::parse("SURVIVAL-4H").is_none());
    }

    #[test]
    fn test_activation_code_rendering_and_parsing() {
        let code = ActivationCode::new(ActivationCategory::Hiking, Some("2".to_string()));
        assert_eq!(code.to_string(), "HIKING-2H");
        assert_eq!(ActivationCode::parse("HIKING-2H"), Some(code));
        assert_eq!(
            ActivationCode::new(ActivationCategory::Out, Some("00".to_string())).to_string(),
            "OUT"
        );
        assert!(ActivationCode::parse("CAMPING").is_none());
        assert!(ActivationCode::parse("TRAVEL-xH").is_none());
        assert!(ActivationCode::parse("TRAVEL-0H").is_none());
    }

    #[test]
    fn test_activation_code_keeps_written_digits() {
        let padded = ActivationCode::new(ActivationCategory::Out, Some("02".to_string()));
        assert_eq!(padded.to_string(), "OUT-02H");
        assert_eq!(padded.hours(), Some("02"));

        let parsed = ActivationCode::parse("TRAVEL-5000000000H").unwrap();
        assert_eq!(parsed.hours(), Some("5000000000"));
        assert_eq!(parsed.to_string(), "TRAVEL-5000000000H");
    }

    #[test]
    fn test_interpreted_command_wire_shape() {
        let command = InterpretedCommand::new(
            "Aryan",
            ActivationCode::new(ActivationCategory::Hiking, Some("2".to_string())),
            Intent::Traveling,
            NameSource::Rule,
        );

        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "trusted_person": "Aryan",
                "activation_code": "HIKING-2H",
                "device_battery": null,
                "situation_intent": "TRAVELING"
            })
        );
    }

    proptest! {
        #[test]
        fn prop_any_label_coerces_into_closed_set(label in any::<String>()) {
            let intent = Intent::coerce(&label);
            prop_assert!(Intent::ALL.contains(&intent));

            let decoded: Intent = serde_json::from_value(serde_json::Value::String(label)).unwrap();
            prop_assert_eq!(decoded, intent);
        }
    }
}
