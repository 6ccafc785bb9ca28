//! Effective UI locale and timezone.
//!
//! Signals are merged in priority order: explicit user preference, then the
//! session store (`SCOREBOOK_LOCALE` / `SCOREBOOK_TIMEZONE`), then the
//! language list (an `Accept-Language` header if one was handed to us,
//! otherwise the POSIX locale variables), then a static fallback.

use crate::state::app_settings::UserSettings;
use chrono_tz::Tz;
use std::path::Path;

pub const FALLBACK_LOCALE: &str = "en-GB";
pub const FALLBACK_TIMEZONE: &str = "UTC";
pub const AUSTRALIAN_LOCALE: &str = "en-AU";

/// Locales offered by the settings screen, in cycle order.
pub const SUPPORTED_LOCALES: &[&str] = &["en-GB", "en-AU", "en-US", "es-ES", "fr-FR"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleSource {
    Preference,
    Stored,
    Languages,
    TimezoneHint,
    System,
    Fallback,
}

impl LocaleSource {
    pub fn label(&self) -> &'static str {
        match self {
            LocaleSource::Preference => "settings",
            LocaleSource::Stored => "session",
            LocaleSource::Languages => "languages",
            LocaleSource::TimezoneHint => "timezone",
            LocaleSource::System => "system",
            LocaleSource::Fallback => "default",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleSignals {
    pub preference: Option<String>,
    pub stored: Option<String>,
    pub languages: Vec<String>,
    pub timezone_preference: Option<String>,
    pub timezone_stored: Option<String>,
    pub system_timezone: Option<String>,
}

impl LocaleSignals {
    /// Gather signals from settings plus an environment lookup.
    pub fn collect<F>(settings: &UserSettings, env: F, system_timezone: Option<String>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            preference: settings.locale.clone(),
            stored: env("SCOREBOOK_LOCALE"),
            languages: languages_from_env(&env),
            timezone_preference: settings.timezone.clone(),
            timezone_stored: env("SCOREBOOK_TIMEZONE"),
            system_timezone,
        }
    }

    pub fn from_environment(settings: &UserSettings) -> Self {
        Self::collect(
            settings,
            |key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()),
            system_timezone(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocale {
    pub locale: String,
    pub locale_source: LocaleSource,
    pub timezone: String,
    pub timezone_source: LocaleSource,
}

impl Default for ResolvedLocale {
    fn default() -> Self {
        Self {
            locale: FALLBACK_LOCALE.to_string(),
            locale_source: LocaleSource::Fallback,
            timezone: FALLBACK_TIMEZONE.to_string(),
            timezone_source: LocaleSource::Fallback,
        }
    }
}

impl ResolvedLocale {
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(Tz::UTC)
    }

    pub fn language(&self) -> &str {
        primary_language(&self.locale)
    }

    /// Header value advertising the locale to the backend, e.g. `en-AU,en;q=0.9`.
    pub fn accept_language(&self) -> String {
        let language = self.language();
        if language == self.locale {
            self.locale.clone()
        } else {
            format!("{},{language};q=0.9", self.locale)
        }
    }
}

pub fn resolve(signals: &LocaleSignals) -> ResolvedLocale {
    let (timezone, timezone_source) = resolve_timezone(signals);

    let explicit = |value: &Option<String>| value.as_deref().and_then(normalize_locale);
    let languages: Vec<String> = signals
        .languages
        .iter()
        .filter_map(|l| normalize_locale(l))
        .collect();

    let (locale, locale_source) = if let Some(locale) = explicit(&signals.preference) {
        (locale, LocaleSource::Preference)
    } else if let Some(locale) = explicit(&signals.stored) {
        (locale, LocaleSource::Stored)
    } else if is_australian_timezone(&timezone)
        && languages.first().is_none_or(|l| primary_language(l) == "en")
    {
        (AUSTRALIAN_LOCALE.to_string(), LocaleSource::TimezoneHint)
    } else if let Some(first) = languages.into_iter().next() {
        (first, LocaleSource::Languages)
    } else {
        (FALLBACK_LOCALE.to_string(), LocaleSource::Fallback)
    };

    ResolvedLocale {
        locale,
        locale_source,
        timezone,
        timezone_source,
    }
}

fn resolve_timezone(signals: &LocaleSignals) -> (String, LocaleSource) {
    let candidates = [
        (&signals.timezone_preference, LocaleSource::Preference),
        (&signals.timezone_stored, LocaleSource::Stored),
        (&signals.system_timezone, LocaleSource::System),
    ];
    candidates
        .into_iter()
        .find_map(|(value, source)| {
            value
                .as_deref()
                .and_then(normalize_timezone)
                .map(|tz| (tz, source))
        })
        .unwrap_or_else(|| (FALLBACK_TIMEZONE.to_string(), LocaleSource::Fallback))
}

pub fn is_australian_timezone(tz: &str) -> bool {
    tz.starts_with("Australia/") || tz == "Antarctica/Macquarie"
}

pub fn primary_language(locale: &str) -> &str {
    locale.split('-').next().unwrap_or(locale)
}

/// Canonicalise a BCP 47-ish tag or a POSIX locale name.
///
/// `en_au.UTF-8` → `en-AU`, `zh-hant-tw` → `zh-Hant-TW`. `C`, `POSIX`, `*`
/// and anything that does not look like a language tag yield `None`.
pub fn normalize_locale(raw: &str) -> Option<String> {
    let tag = raw.trim();
    let tag = tag.split(['.', '@']).next().unwrap_or(tag);
    if tag.is_empty() || matches!(tag, "C" | "POSIX" | "*") {
        return None;
    }

    let mut parts = tag.split(['-', '_']);
    let language = parts.next()?;
    if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut out = vec![language.to_ascii_lowercase()];
    for part in parts {
        let subtag = match part.len() {
            4 if part.chars().all(|c| c.is_ascii_alphabetic()) => {
                let mut chars = part.chars();
                let head = chars.next()?.to_ascii_uppercase();
                format!("{head}{}", chars.as_str().to_ascii_lowercase())
            }
            2 if part.chars().all(|c| c.is_ascii_alphabetic()) => part.to_ascii_uppercase(),
            3 if part.chars().all(|c| c.is_ascii_digit()) => part.to_string(),
            5..=8 if part.chars().all(|c| c.is_ascii_alphanumeric()) => part.to_ascii_lowercase(),
            _ => return None,
        };
        out.push(subtag);
    }
    Some(out.join("-"))
}

pub fn normalize_timezone(raw: &str) -> Option<String> {
    let name = raw.trim().trim_start_matches(':');
    if name.is_empty() {
        return None;
    }
    name.parse::<Tz>().ok().map(|tz| tz.name().to_string())
}

/// Parse an `Accept-Language` header into tags ordered by q-value.
/// Ties keep header order; `q=0` and malformed entries are dropped.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut weighted: Vec<(String, f32)> = Vec::new();
    for item in header.split(',') {
        let mut pieces = item.split(';');
        let Some(tag) = pieces.next().and_then(normalize_locale) else {
            continue;
        };
        let mut quality = 1.0f32;
        let mut valid = true;
        for param in pieces {
            if let Some(q) = param.trim().strip_prefix("q=") {
                match q.trim().parse::<f32>() {
                    Ok(v) if (0.0..=1.0).contains(&v) => quality = v,
                    _ => valid = false,
                }
            }
        }
        if valid && quality > 0.0 && !weighted.iter().any(|(t, _)| *t == tag) {
            weighted.push((tag, quality));
        }
    }
    weighted.sort_by(|a, b| b.1.total_cmp(&a.1));
    weighted.into_iter().map(|(tag, _)| tag).collect()
}

/// Language list from the environment: `HTTP_ACCEPT_LANGUAGE` when a caller
/// forwarded one, otherwise `LANGUAGE` then `LC_ALL`, `LC_MESSAGES`, `LANG`.
pub fn languages_from_env<F>(env: &F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(header) = env("HTTP_ACCEPT_LANGUAGE") {
        let parsed = parse_accept_language(&header);
        if !parsed.is_empty() {
            return parsed;
        }
    }

    let mut out: Vec<String> = Vec::new();
    let mut push = |tag: Option<String>| {
        if let Some(tag) = tag
            && !out.contains(&tag)
        {
            out.push(tag);
        }
    };
    if let Some(list) = env("LANGUAGE") {
        for entry in list.split(':') {
            push(normalize_locale(entry));
        }
    }
    for key in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        push(env(key).as_deref().and_then(normalize_locale));
    }
    out
}

pub fn system_timezone() -> Option<String> {
    if let Some(tz) = std::env::var("TZ").ok().as_deref().and_then(normalize_timezone) {
        return Some(tz);
    }
    if let Some(tz) = std::fs::read_to_string("/etc/timezone")
        .ok()
        .as_deref()
        .and_then(normalize_timezone)
    {
        return Some(tz);
    }
    timezone_from_localtime_link(Path::new("/etc/localtime"))
}

/// `/etc/localtime` usually links into the zoneinfo tree; the zone name is
/// whatever follows `zoneinfo/`.
pub fn timezone_from_localtime_link(path: &Path) -> Option<String> {
    let target = std::fs::read_link(path).ok()?;
    let target = target.to_string_lossy();
    let (_, name) = target.split_once("zoneinfo/")?;
    normalize_timezone(name)
}

/// Next entry in the settings cycle: none → each supported locale → none.
pub fn next_locale_preference(current: Option<&str>) -> Option<String> {
    let Some(current) = current else {
        return SUPPORTED_LOCALES.first().map(|l| l.to_string());
    };
    SUPPORTED_LOCALES
        .iter()
        .position(|l| *l == current)
        .and_then(|idx| SUPPORTED_LOCALES.get(idx + 1))
        .map(|l| l.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn normalizes_posix_and_bcp47_tags() {
        assert_eq!(normalize_locale("en_au.UTF-8").as_deref(), Some("en-AU"));
        assert_eq!(normalize_locale("zh-hant-tw").as_deref(), Some("zh-Hant-TW"));
        assert_eq!(normalize_locale("de_DE@euro").as_deref(), Some("de-DE"));
        assert_eq!(normalize_locale("es-419").as_deref(), Some("es-419"));
        assert_eq!(normalize_locale(" fr ").as_deref(), Some("fr"));
        assert_eq!(normalize_locale("C.UTF-8"), None);
        assert_eq!(normalize_locale("POSIX"), None);
        assert_eq!(normalize_locale("*"), None);
        assert_eq!(normalize_locale("english"), None);
        assert_eq!(normalize_locale("en-"), None);
    }

    #[test]
    fn accept_language_orders_by_quality() {
        assert_eq!(
            parse_accept_language("fr-CH, fr;q=0.9, en;q=0.8, de;q=0.7, *;q=0.5"),
            vec!["fr-CH", "fr", "en", "de"]
        );
        assert_eq!(
            parse_accept_language("en;q=0.5, es-ES;q=0.9, pt;q=0"),
            vec!["es-ES", "en"]
        );
        assert_eq!(parse_accept_language("da, en-gb;q=0.8, en;q=0.8"), vec!["da", "en-GB", "en"]);
        assert_eq!(parse_accept_language("en;q=abc, it"), vec!["it"]);
        assert!(parse_accept_language("").is_empty());
    }

    #[test]
    fn preference_beats_everything() {
        let resolved = resolve(&LocaleSignals {
            preference: Some("fr_FR".into()),
            stored: Some("es-ES".into()),
            languages: vec!["de-DE".into()],
            system_timezone: Some("Australia/Sydney".into()),
            ..Default::default()
        });
        assert_eq!(resolved.locale, "fr-FR");
        assert_eq!(resolved.locale_source, LocaleSource::Preference);
        assert_eq!(resolved.timezone, "Australia/Sydney");
        assert_eq!(resolved.timezone_source, LocaleSource::System);
    }

    #[test]
    fn stored_beats_languages() {
        let resolved = resolve(&LocaleSignals {
            preference: Some("not a tag".into()),
            stored: Some("es-ES".into()),
            languages: vec!["de-DE".into()],
            ..Default::default()
        });
        assert_eq!(resolved.locale, "es-ES");
        assert_eq!(resolved.locale_source, LocaleSource::Stored);
    }

    #[test]
    fn first_valid_language_wins() {
        let resolved = resolve(&LocaleSignals {
            languages: vec!["C".into(), "pt-BR".into(), "en-US".into()],
            ..Default::default()
        });
        assert_eq!(resolved.locale, "pt-BR");
        assert_eq!(resolved.locale_source, LocaleSource::Languages);
    }

    #[test]
    fn falls_back_to_en_gb_and_utc() {
        let resolved = resolve(&LocaleSignals::default());
        assert_eq!(resolved, ResolvedLocale::default());
    }

    #[test]
    fn australian_timezone_biases_english_to_en_au() {
        let resolved = resolve(&LocaleSignals {
            languages: vec!["en-US".into()],
            system_timezone: Some("Australia/Melbourne".into()),
            ..Default::default()
        });
        assert_eq!(resolved.locale, "en-AU");
        assert_eq!(resolved.locale_source, LocaleSource::TimezoneHint);

        let resolved = resolve(&LocaleSignals {
            timezone_preference: Some("Antarctica/Macquarie".into()),
            ..Default::default()
        });
        assert_eq!(resolved.locale, "en-AU");
    }

    #[test]
    fn australian_bias_yields_to_non_english_and_explicit_signals() {
        let resolved = resolve(&LocaleSignals {
            languages: vec!["it-IT".into()],
            system_timezone: Some("Australia/Perth".into()),
            ..Default::default()
        });
        assert_eq!(resolved.locale, "it-IT");

        let resolved = resolve(&LocaleSignals {
            stored: Some("en-GB".into()),
            system_timezone: Some("Australia/Perth".into()),
            ..Default::default()
        });
        assert_eq!(resolved.locale, "en-GB");
        assert_eq!(resolved.locale_source, LocaleSource::Stored);
    }

    #[test]
    fn invalid_timezones_fall_through() {
        let resolved = resolve(&LocaleSignals {
            timezone_preference: Some("Mars/Olympus".into()),
            timezone_stored: Some("Europe/Madrid".into()),
            system_timezone: Some("America/New_York".into()),
            ..Default::default()
        });
        assert_eq!(resolved.timezone, "Europe/Madrid");
        assert_eq!(resolved.timezone_source, LocaleSource::Stored);
        assert_eq!(resolved.tz(), chrono_tz::Europe::Madrid);
    }

    #[test]
    fn env_languages_prefer_forwarded_header() {
        let env = env_of(&[
            ("HTTP_ACCEPT_LANGUAGE", "es-MX,es;q=0.8"),
            ("LANG", "en_US.UTF-8"),
        ]);
        assert_eq!(languages_from_env(&env), vec!["es-MX", "es"]);
    }

    #[test]
    fn env_languages_merge_posix_variables() {
        let env = env_of(&[
            ("LANGUAGE", "fr_CA:fr:en"),
            ("LC_ALL", ""),
            ("LANG", "fr_CA.UTF-8"),
        ]);
        assert_eq!(languages_from_env(&env), vec!["fr-CA", "fr", "en"]);
    }

    #[test]
    fn collect_reads_session_store() {
        let settings = UserSettings {
            timezone: Some("Europe/Paris".into()),
            ..Default::default()
        };
        let env = env_of(&[("SCOREBOOK_LOCALE", "en_US"), ("LANG", "de_DE.UTF-8")]);
        let signals = LocaleSignals::collect(&settings, env, Some("UTC".into()));
        assert_eq!(signals.stored.as_deref(), Some("en_US"));
        assert_eq!(signals.languages, vec!["de-DE"]);
        let resolved = resolve(&signals);
        assert_eq!(resolved.locale, "en-US");
        assert_eq!(resolved.timezone, "Europe/Paris");
        assert_eq!(resolved.timezone_source, LocaleSource::Preference);
    }

    #[test]
    fn accept_language_header_for_backend() {
        let mut resolved = ResolvedLocale::default();
        assert_eq!(resolved.accept_language(), "en-GB,en;q=0.9");
        resolved.locale = "fr".into();
        assert_eq!(resolved.accept_language(), "fr");
    }

    #[test]
    fn locale_cycle_wraps_through_none() {
        assert_eq!(next_locale_preference(None).as_deref(), Some("en-GB"));
        assert_eq!(next_locale_preference(Some("en-GB")).as_deref(), Some("en-AU"));
        assert_eq!(next_locale_preference(Some("fr-FR")), None);
        assert_eq!(next_locale_preference(Some("xx-XX")), None);
    }

    #[test]
    fn timezone_names_are_validated() {
        assert_eq!(normalize_timezone(":Europe/London").as_deref(), Some("Europe/London"));
        assert_eq!(normalize_timezone("Not/AZone"), None);
        assert!(is_australian_timezone("Australia/Darwin"));
        assert!(!is_australian_timezone("Pacific/Auckland"));
    }
}
