use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Stored state label that names none of the conversation states
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown conversation state label: {0:?}")]
pub struct UnknownStateLabel(pub String);

/// Represents the current state of a chat's conversation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    /// Initial state, also forced by the `/start` command
    #[default]
    Start,
    /// Product menu is shown
    HandleMenu,
    /// Product card with quantity buttons is shown
    HandleDescription,
    /// Cart contents are shown
    HandleCart,
    /// Waiting for the customer's email to check out
    WaitingEmail,
}

impl State {
    /// All states, in conversation order
    pub const ALL: [Self; 5] = [
        Self::Start,
        Self::HandleMenu,
        Self::HandleDescription,
        Self::HandleCart,
        Self::WaitingEmail,
    ];

    /// Label persisted in the session store
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::HandleMenu => "HANDLE_MENU",
            Self::HandleDescription => "HANDLE_DESCRIPTION",
            Self::HandleCart => "HANDLE_CART",
            Self::WaitingEmail => "WAITING_EMAIL",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for State {
    type Err = UnknownStateLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.label() == s)
            .ok_or_else(|| UnknownStateLabel(s.to_string()))
    }
}
