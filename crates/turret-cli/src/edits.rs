//! Field edits given on the command line

use anyhow::{anyhow, bail};
use std::str::FromStr;
use turret_core::SettingsSession;
use turret_form::FormState;

/// One requested change to the rendered form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// `--set key=value`: check the toggle and fill the control
    Set {
        /// Setting key
        key: String,
        /// New control content
        value: String,
    },
    /// `--on key`: check the toggle, keeping the existing value or default
    On {
        /// Setting key
        key: String,
    },
    /// `--off key`: uncheck the toggle
    Off {
        /// Setting key
        key: String,
    },
}

impl Edit {
    /// Key the edit targets
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Set { key, .. } | Self::On { key } | Self::Off { key } => key,
        }
    }
}

impl FromStr for Edit {
    type Err = anyhow::Error;

    /// Parse `key=value`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected key=value, got '{s}'"))?;
        let key = key.trim();
        if key.is_empty() {
            bail!("empty key in '{s}'");
        }
        Ok(Self::Set {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// Apply edits to the selected group and return the resulting form state
///
/// Toggles switched on go through the session first so they pick up their
/// existing value or default; explicit values and toggles switched off are
/// then written over the re-rendered state.
pub fn form_state(session: &mut SettingsSession, edits: &[Edit]) -> anyhow::Result<FormState> {
    let mut form = session.render()?;
    for edit in edits {
        if form.setting(edit.key()).is_none() {
            bail!(
                "setting '{}' is not in group {} ({:?} view)",
                edit.key(),
                form.group,
                form.view
            );
        }
    }

    for edit in edits {
        if let Edit::On { key } = edit {
            let id = form
                .setting(key)
                .map(|s| s.schema.id.clone())
                .ok_or_else(|| anyhow!("setting '{key}' vanished"))?;
            form = session.enable_setting(&id, &FormState::from_rendered(&form))?;
        }
    }

    let mut state = FormState::from_rendered(&form);
    for edit in edits {
        match edit {
            Edit::Set { key, value } => state.enable(key.as_str(), value.as_str()),
            Edit::Off { key } => state.disable(key),
            Edit::On { .. } => {}
        }
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value() {
        let edit: Edit = "maxVolume=70".parse().unwrap();
        assert_eq!(
            edit,
            Edit::Set {
                key: "maxVolume".into(),
                value: "70".into()
            }
        );

        let empty: Edit = "pin=".parse().unwrap();
        assert_eq!(empty.key(), "pin");
        assert!("novalue".parse::<Edit>().is_err());
        assert!("=x".parse::<Edit>().is_err());
    }
}
