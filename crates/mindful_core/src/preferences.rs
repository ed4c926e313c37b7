//! crates/mindful_core/src/preferences.rs
//!
//! State the client keeps between visits: the data-processing consent flag with
//! the moment it was given, and the chosen display language. Stored as plain
//! string pairs under fixed keys.

use crate::locale::Locale;
use chrono::{DateTime, Utc};
use tracing::debug;

pub const CONSENT_KEY: &str = "mindful-thai-pdpa-consent";
pub const CONSENT_DATE_KEY: &str = "mindful-thai-consent-date";
pub const LANGUAGE_KEY: &str = "mindful-thai-language";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientPreferences {
    /// `None` until the visitor answered the consent prompt.
    pub consent: Option<bool>,
    pub consent_date: Option<DateTime<Utc>>,
    pub language: Option<Locale>,
}

impl ClientPreferences {
    /// Reads the known keys; unknown keys and unreadable values are skipped.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut prefs = Self::default();
        for (key, value) in pairs {
            match key {
                CONSENT_KEY => prefs.consent = value.parse::<bool>().ok(),
                CONSENT_DATE_KEY => {
                    prefs.consent_date = DateTime::parse_from_rfc3339(value)
                        .map(|d| d.with_timezone(&Utc))
                        .ok()
                }
                LANGUAGE_KEY => prefs.language = value.parse().ok(),
                _ => continue,
            }
            debug!(key, "Read client preference");
        }
        prefs
    }

    pub fn has_consented(&self) -> bool {
        self.consent == Some(true)
    }

    /// The date is only stamped when consent is granted.
    pub fn record_consent(&mut self, granted: bool, now: DateTime<Utc>) {
        self.consent = Some(granted);
        if granted {
            self.consent_date = Some(now);
        }
    }

    pub fn select_language(&mut self, locale: Locale) {
        self.language = Some(locale);
    }

    pub fn locale_or(&self, fallback: Locale) -> Locale {
        self.language.unwrap_or(fallback)
    }

    /// The pairs to write back, only for values that are set.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(consent) = self.consent {
            pairs.push((CONSENT_KEY, consent.to_string()));
        }
        if let Some(date) = self.consent_date {
            pairs.push((CONSENT_DATE_KEY, date.to_rfc3339()));
        }
        if let Some(language) = self.language {
            pairs.push((LANGUAGE_KEY, language.code().to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn reads_known_keys_and_skips_garbage() {
        let prefs = ClientPreferences::from_pairs([
            (CONSENT_KEY, "true"),
            (CONSENT_DATE_KEY, "2026-01-02T03:04:05Z"),
            (LANGUAGE_KEY, "en"),
            ("session", "abc"),
        ]);
        assert!(prefs.has_consented());
        assert_eq!(
            prefs.consent_date,
            Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap())
        );
        assert_eq!(prefs.language, Some(Locale::En));

        let broken = ClientPreferences::from_pairs([(CONSENT_KEY, "yes"), (LANGUAGE_KEY, "fr")]);
        assert_eq!(broken, ClientPreferences::default());
    }

    #[test]
    fn declining_keeps_no_new_date() {
        let now = Utc::now();
        let mut prefs = ClientPreferences::default();
        prefs.record_consent(false, now);
        assert_eq!(prefs.consent, Some(false));
        assert_eq!(prefs.consent_date, None);

        prefs.record_consent(true, now);
        assert!(prefs.has_consented());
        assert_eq!(prefs.consent_date, Some(now));
    }

    #[test]
    fn pairs_survive_a_round_trip() {
        let mut prefs = ClientPreferences::default();
        prefs.record_consent(true, Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap());
        prefs.select_language(Locale::Th);

        let pairs = prefs.to_pairs();
        let read = ClientPreferences::from_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        assert_eq!(read, prefs);
        assert_eq!(read.locale_or(Locale::En), Locale::Th);
    }
}
