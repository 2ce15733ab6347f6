//! Declared side effects and their execution.
//!
//! Action objects from the settings file are validated once at load time
//! into the closed [`Action`] enum; each object carries exactly one
//! primary key (`showStatusBarItem`, `removeStatusBarItem`, `notify`,
//! `autoSave`) and the remaining keys are that action's parameters.

mod executor;
mod status;

pub use executor::{ActionExecutor, DEFAULT_OPEN_LABEL, ExecutionReport};
pub use status::{StatusIndicatorCache, StatusItem};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fields applied to a status indicator by `showStatusBarItem`.
///
/// Absent fields leave an existing indicator unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    pub id: String,
    pub text: Option<String>,
    pub tooltip: Option<String>,
    pub color: Option<String>,
    pub name: Option<String>,
    pub background_color: Option<String>,
}

/// One declared effect.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "RawAction", into = "RawAction")]
pub enum Action {
    /// Create or update a status indicator and make it visible.
    ShowStatus(StatusUpdate),
    /// Hide and discard a status indicator.
    RemoveStatus { id: String },
    /// Show a notification offering to open the triggering file.
    Notify {
        message: String,
        open_label: Option<String>,
    },
    /// Reload the triggering file from disk and save it.
    AutoSave,
}

impl Action {
    /// Primary key of the action, as written in settings.
    pub fn key(&self) -> &'static str {
        match self {
            Action::ShowStatus(_) => "showStatusBarItem",
            Action::RemoveStatus { .. } => "removeStatusBarItem",
            Action::Notify { .. } => "notify",
            Action::AutoSave => "autoSave",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error(
        "action has no recognized key; expected one of showStatusBarItem, \
         removeStatusBarItem, notify, autoSave"
    )]
    MissingKey,

    #[error("action has more than one primary key: {}", .0.join(", "))]
    ConflictingKeys(Vec<&'static str>),

    #[error("autoSave must be true")]
    AutoSaveDisabled,

    #[error("{action} does not take {}", .keys.join(", "))]
    UnexpectedParameters {
        action: &'static str,
        keys: Vec<&'static str>,
    },
}

/// Settings-file shape of an action object.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    show_status_bar_item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remove_status_bar_item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notify: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auto_save: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    open_label: Option<String>,
}

impl RawAction {
    fn primary_keys(&self) -> Vec<&'static str> {
        [
            ("showStatusBarItem", self.show_status_bar_item.is_some()),
            ("removeStatusBarItem", self.remove_status_bar_item.is_some()),
            ("notify", self.notify.is_some()),
            ("autoSave", self.auto_save.is_some()),
        ]
        .into_iter()
        .filter_map(|(key, present)| present.then_some(key))
        .collect()
    }

    fn parameter_keys(&self) -> Vec<&'static str> {
        [
            ("text", self.text.is_some()),
            ("tooltip", self.tooltip.is_some()),
            ("color", self.color.is_some()),
            ("name", self.name.is_some()),
            ("backgroundColor", self.background_color.is_some()),
            ("openLabel", self.open_label.is_some()),
        ]
        .into_iter()
        .filter_map(|(key, present)| present.then_some(key))
        .collect()
    }
}

/// Parameters each primary key accepts.
fn allowed_parameters(action: &str) -> &'static [&'static str] {
    match action {
        "showStatusBarItem" => &["text", "tooltip", "color", "name", "backgroundColor"],
        "notify" => &["openLabel"],
        _ => &[],
    }
}

impl TryFrom<RawAction> for Action {
    type Error = ActionError;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        let keys = raw.primary_keys();
        if keys.len() > 1 {
            return Err(ActionError::ConflictingKeys(keys));
        }
        let Some(&action) = keys.first() else {
            return Err(ActionError::MissingKey);
        };

        let allowed = allowed_parameters(action);
        let unexpected: Vec<_> = raw
            .parameter_keys()
            .into_iter()
            .filter(|key| !allowed.contains(key))
            .collect();
        if !unexpected.is_empty() {
            return Err(ActionError::UnexpectedParameters {
                action,
                keys: unexpected,
            });
        }

        if let Some(id) = raw.show_status_bar_item {
            return Ok(Action::ShowStatus(StatusUpdate {
                id,
                text: raw.text,
                tooltip: raw.tooltip,
                color: raw.color,
                name: raw.name,
                background_color: raw.background_color,
            }));
        }
        if let Some(id) = raw.remove_status_bar_item {
            return Ok(Action::RemoveStatus { id });
        }
        if let Some(message) = raw.notify {
            return Ok(Action::Notify {
                message,
                open_label: raw.open_label,
            });
        }
        match raw.auto_save {
            Some(true) => Ok(Action::AutoSave),
            Some(false) => Err(ActionError::AutoSaveDisabled),
            None => Err(ActionError::MissingKey),
        }
    }
}

impl From<Action> for RawAction {
    fn from(action: Action) -> Self {
        match action {
            Action::ShowStatus(update) => RawAction {
                show_status_bar_item: Some(update.id),
                text: update.text,
                tooltip: update.tooltip,
                color: update.color,
                name: update.name,
                background_color: update.background_color,
                ..Default::default()
            },
            Action::RemoveStatus { id } => RawAction {
                remove_status_bar_item: Some(id),
                ..Default::default()
            },
            Action::Notify {
                message,
                open_label,
            } => RawAction {
                notify: Some(message),
                open_label,
                ..Default::default()
            },
            Action::AutoSave => RawAction {
                auto_save: Some(true),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Action, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_parse_each_kind() {
        assert_eq!(
            parse(r#"{"showStatusBarItem": "build", "text": "$(sync) building", "color": "yellow"}"#)
                .unwrap(),
            Action::ShowStatus(StatusUpdate {
                id: "build".to_string(),
                text: Some("$(sync) building".to_string()),
                color: Some("yellow".to_string()),
                ..Default::default()
            })
        );
        assert_eq!(
            parse(r#"{"removeStatusBarItem": "build"}"#).unwrap(),
            Action::RemoveStatus {
                id: "build".to_string()
            }
        );
        assert_eq!(
            parse(r#"{"notify": "${fileBasename} changed", "openLabel": "Show"}"#).unwrap(),
            Action::Notify {
                message: "${fileBasename} changed".to_string(),
                open_label: Some("Show".to_string()),
            }
        );
        assert_eq!(parse(r#"{"autoSave": true}"#).unwrap(), Action::AutoSave);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let err = parse(r#"{"notify": "x", "autoSave": true}"#).unwrap_err();
        assert!(err.to_string().contains("more than one primary key"));

        let err = parse(r#"{"text": "orphan"}"#).unwrap_err();
        assert!(err.to_string().contains("no recognized key"));

        assert!(parse(r#"{"autoSave": false}"#).is_err());
        assert!(parse(r#"{"notify": "x", "bogus": 1}"#).is_err());
    }

    #[test]
    fn test_rejects_parameters_of_another_kind() {
        let err = parse(r#"{"showStatusBarItem": "build", "openLabel": "Show"}"#).unwrap_err();
        assert!(err.to_string().contains("showStatusBarItem does not take openLabel"));

        let err = parse(r#"{"notify": "x", "text": "y", "color": "red"}"#).unwrap_err();
        assert!(err.to_string().contains("notify does not take text, color"));

        assert!(parse(r#"{"removeStatusBarItem": "build", "tooltip": "t"}"#).is_err());
        assert!(parse(r#"{"autoSave": true, "name": "n"}"#).is_err());
    }

    #[test]
    fn test_serializes_back_to_settings_shape() {
        let action = Action::Notify {
            message: "hello".to_string(),
            open_label: None,
        };
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"notify":"hello"}"#);
    }
}
