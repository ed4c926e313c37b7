//! crates/mindful_core/src/locale.rs
//!
//! The display-language selector and the service that tracks which language
//! each signed-in user has chosen.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

/// The languages the application is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Th,
    En,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::Th, Locale::En];

    pub fn code(self) -> &'static str {
        match self {
            Locale::Th => "th",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported language '{0}' (expected 'th' or 'en')")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "th" => Ok(Locale::Th),
            "en" => Ok(Locale::En),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

//=========================================================================================
// LocaleManager
//=========================================================================================

/// Published whenever a user switches language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleChanged {
    pub user_id: Uuid,
    pub locale: Locale,
}

/// Tracks the selected language per user.
///
/// Only the language switcher writes here (`select`); everything that renders
/// text reads via `current` or follows changes through `subscribe`.
pub struct LocaleManager {
    fallback: Locale,
    selections: RwLock<HashMap<Uuid, Locale>>,
    events: broadcast::Sender<LocaleChanged>,
}

impl LocaleManager {
    pub fn new(fallback: Locale) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            fallback,
            selections: RwLock::new(HashMap::new()),
            events,
        }
    }

    pub fn fallback(&self) -> Locale {
        self.fallback
    }

    /// The user's selected language, or the fallback when they never chose one.
    pub async fn current(&self, user_id: Uuid) -> Locale {
        self.selections
            .read()
            .await
            .get(&user_id)
            .copied()
            .unwrap_or(self.fallback)
    }

    /// The explicit or seeded selection, if this process has one for the user.
    pub async fn selection(&self, user_id: Uuid) -> Option<Locale> {
        self.selections.read().await.get(&user_id).copied()
    }

    /// Seeds a selection at startup of a session without notifying listeners.
    /// An explicit earlier selection wins.
    pub async fn seed(&self, user_id: Uuid, locale: Locale) {
        self.selections.write().await.entry(user_id).or_insert(locale);
    }

    /// Records a new selection and notifies subscribers when it actually changed.
    pub async fn select(&self, user_id: Uuid, locale: Locale) {
        let previous = self.selections.write().await.insert(user_id, locale);
        if previous != Some(locale) {
            debug!(%user_id, %locale, "Locale changed");
            // No receivers is fine: nobody is listening right now.
            let _ = self.events.send(LocaleChanged { user_id, locale });
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LocaleChanged> {
        self.events.subscribe()
    }
}
