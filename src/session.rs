//! Per-conversation state.
//!
//! The fields the router and the built-in providers rely on are typed
//! (`state`, `authenticated`, `user_id`); everything else a provider needs to
//! carry between turns goes into the `slots` map.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use std::fmt;

/// Initial state of every conversation.
pub const START: &str = "START";
/// Terminal state: the conversation was closed.
pub const END: &str = "END";

/// Well-known slot key backed by `Context::user_id`.
pub(crate) const USER_SLOT: &str = "user";
/// Well-known slot key backed by `Context::authenticated`.
pub(crate) const AUTH_SLOT: &str = "auth_ok";

/// Value stored in a context slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    Text(String),
    Flag(bool),
    Int(i64),
}

impl SlotValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SlotValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            SlotValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotValue::Text(s) => f.write_str(s),
            SlotValue::Flag(b) => write!(f, "{b}"),
            SlotValue::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for SlotValue {
    fn from(s: &str) -> Self {
        SlotValue::Text(s.to_string())
    }
}

impl From<String> for SlotValue {
    fn from(s: String) -> Self {
        SlotValue::Text(s)
    }
}

impl From<bool> for SlotValue {
    fn from(b: bool) -> Self {
        SlotValue::Flag(b)
    }
}

impl From<i64> for SlotValue {
    fn from(n: i64) -> Self {
        SlotValue::Int(n)
    }
}

/// Session context threaded through every turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    state: String,
    authenticated: bool,
    user_id: Option<String>,
    slots: BTreeMap<String, SlotValue>,
    started_at: NaiveDateTime,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            state: START.to_string(),
            authenticated: false,
            user_id: None,
            slots: BTreeMap::new(),
            started_at: session_clock(),
        }
    }
}

fn session_clock() -> NaiveDateTime {
    if cfg!(test) {
        let date = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap_or_default();
        NaiveDateTime::new(date, NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default())
    } else {
        Local::now().naive_local()
    }
}

impl Context {
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Set the current state. Empty labels are ignored so the state is
    /// never blank.
    pub fn set_state(&mut self, state: impl Into<String>) {
        let state = state.into();
        if state.trim().is_empty() {
            tracing::warn!(current = %self.state, "ignoring empty state label");
            return;
        }
        self.state = state;
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn authenticate(&mut self) {
        self.authenticated = true;
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn set_user(&mut self, user: impl Into<String>) {
        self.user_id = Some(user.into());
    }

    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    /// Look up a slot. `"user"` and `"auth_ok"` resolve to the typed fields.
    pub fn slot(&self, key: &str) -> Option<SlotValue> {
        match key {
            USER_SLOT => self.user_id.clone().map(SlotValue::Text),
            AUTH_SLOT => self.authenticated.then_some(SlotValue::Flag(true)),
            _ => self.slots.get(key).cloned(),
        }
    }

    /// Store a slot. Values for `"user"` / `"auth_ok"` are written to the
    /// typed fields when they have the matching kind.
    pub fn set_slot(&mut self, key: impl Into<String>, value: impl Into<SlotValue>) {
        let key = key.into();
        match value.into() {
            SlotValue::Text(user) if key == USER_SLOT => self.user_id = Some(user),
            SlotValue::Flag(flag) if key == AUTH_SLOT => self.authenticated = flag,
            value => {
                self.slots.insert(key, value);
            }
        }
    }

    /// Remove and return a provider slot.
    pub fn take_slot(&mut self, key: &str) -> Option<SlotValue> {
        self.slots.remove(key)
    }

    /// Provider slots only (the typed fields are not listed).
    pub fn slots(&self) -> impl Iterator<Item = (&str, &SlotValue)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// True when no user, no auth flag and no provider slot is set.
    pub fn is_blank(&self) -> bool {
        self.user_id.is_none() && !self.authenticated && self.slots.is_empty()
    }

    /// Drop user, authentication and every slot; go back to `START`.
    pub fn clear(&mut self) {
        self.user_id = None;
        self.authenticated = false;
        self.slots.clear();
        self.state = START.to_string();
    }
}
