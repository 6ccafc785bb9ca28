use crate::state::locale::primary_language;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// UI strings with translations. Anything without a translation renders in English.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    TabMatches,
    TabMatch,
    TabLeaderboard,
    TabPlayers,
    TabTournaments,
    TabSettings,
    TabHelp,
    Loading,
    FailedToLoad,
    PressRetry,
    NoMatches,
    NoPlayers,
    NoTournaments,
    NoSelection,
    AllSports,
    Friendly,
    Live,
    Polling,
    Chat,
    Comments,
    Sets,
    Rating,
    Won,
    Lost,
    Played,
    Round,
    Court,
    Locale,
    Timezone,
    NewTournament,
}

pub fn tr(locale: &str, text: Text) -> &'static str {
    match primary_language(locale) {
        "es" => spanish(text).unwrap_or_else(|| english(text)),
        "fr" => french(text).unwrap_or_else(|| english(text)),
        _ => english(text),
    }
}

fn english(text: Text) -> &'static str {
    match text {
        Text::TabMatches => "Matches",
        Text::TabMatch => "Match",
        Text::TabLeaderboard => "Leaderboard",
        Text::TabPlayers => "Players",
        Text::TabTournaments => "Tournaments",
        Text::TabSettings => "Settings",
        Text::TabHelp => "Help",
        Text::Loading => "Loading...",
        Text::FailedToLoad => "Failed to load",
        Text::PressRetry => "Press R to retry",
        Text::NoMatches => "No matches recorded yet",
        Text::NoPlayers => "No players found",
        Text::NoTournaments => "No tournaments yet",
        Text::NoSelection => "Select a match from the Matches tab",
        Text::AllSports => "All sports",
        Text::Friendly => "friendly",
        Text::Live => "live",
        Text::Polling => "polling",
        Text::Chat => "Chat",
        Text::Comments => "Comments",
        Text::Sets => "Sets",
        Text::Rating => "Rating",
        Text::Won => "Won",
        Text::Lost => "Lost",
        Text::Played => "Played",
        Text::Round => "Round",
        Text::Court => "Court",
        Text::Locale => "Locale",
        Text::Timezone => "Timezone",
        Text::NewTournament => "New Americano",
    }
}

fn spanish(text: Text) -> Option<&'static str> {
    Some(match text {
        Text::TabMatches => "Partidos",
        Text::TabMatch => "Partido",
        Text::TabLeaderboard => "Clasificación",
        Text::TabPlayers => "Jugadores",
        Text::TabTournaments => "Torneos",
        Text::TabSettings => "Ajustes",
        Text::TabHelp => "Ayuda",
        Text::Loading => "Cargando...",
        Text::FailedToLoad => "No se pudo cargar",
        Text::PressRetry => "Pulsa R para reintentar",
        Text::NoMatches => "Aún no hay partidos",
        Text::NoPlayers => "No se encontraron jugadores",
        Text::NoTournaments => "Aún no hay torneos",
        Text::AllSports => "Todos los deportes",
        Text::Friendly => "amistoso",
        Text::Live => "en directo",
        Text::Chat => "Chat",
        Text::Comments => "Comentarios",
        Text::Sets => "Sets",
        Text::Rating => "Puntuación",
        Text::Won => "Ganados",
        Text::Lost => "Perdidos",
        Text::Played => "Jugados",
        Text::Round => "Ronda",
        Text::Court => "Pista",
        Text::Locale => "Idioma",
        Text::Timezone => "Zona horaria",
        Text::NewTournament => "Nuevo Americano",
        _ => return None,
    })
}

fn french(text: Text) -> Option<&'static str> {
    Some(match text {
        Text::TabMatches => "Matchs",
        Text::TabMatch => "Match",
        Text::TabLeaderboard => "Classement",
        Text::TabPlayers => "Joueurs",
        Text::TabTournaments => "Tournois",
        Text::TabSettings => "Réglages",
        Text::TabHelp => "Aide",
        Text::Loading => "Chargement...",
        Text::FailedToLoad => "Échec du chargement",
        Text::PressRetry => "Appuyez sur R pour réessayer",
        Text::NoMatches => "Aucun match enregistré",
        Text::NoPlayers => "Aucun joueur trouvé",
        Text::NoTournaments => "Aucun tournoi",
        Text::AllSports => "Tous les sports",
        Text::Friendly => "amical",
        Text::Live => "en direct",
        Text::Comments => "Commentaires",
        Text::Rating => "Classement Elo",
        Text::Won => "Gagnés",
        Text::Lost => "Perdus",
        Text::Played => "Joués",
        Text::Round => "Tour",
        Text::Court => "Terrain",
        Text::Locale => "Langue",
        Text::Timezone => "Fuseau horaire",
        Text::NewTournament => "Nouvel Americano",
        _ => return None,
    })
}

/// Languages that write decimals with a comma.
const COMMA_DECIMAL: &[&str] = &["es", "fr", "de", "it", "pt", "nl"];

pub fn format_decimal(value: f64, decimals: usize, locale: &str) -> String {
    let formatted = format!("{value:.decimals$}");
    if COMMA_DECIMAL.contains(&primary_language(locale)) {
        formatted.replace('.', ",")
    } else {
        formatted
    }
}

fn uses_12_hour_clock(locale: &str) -> bool {
    matches!(locale, "en-US" | "en-AU")
}

fn date_pattern(locale: &str) -> &'static str {
    match (locale, primary_language(locale)) {
        ("en-US", _) => "%m/%d/%Y",
        (_, "de") => "%d.%m.%Y",
        _ => "%d/%m/%Y",
    }
}

/// Date and time in the viewer's timezone, e.g. `01/05/2024 19:30`.
pub fn format_datetime(dt: DateTime<Utc>, locale: &str, tz: Tz) -> String {
    let local = dt.with_timezone(&tz);
    format!(
        "{} {}",
        local.format(date_pattern(locale)),
        local.format(time_pattern(locale))
    )
}

/// Time of day only, used for chat lines.
pub fn format_time(dt: DateTime<Utc>, locale: &str, tz: Tz) -> String {
    dt.with_timezone(&tz).format(time_pattern(locale)).to_string()
}

fn time_pattern(locale: &str) -> &'static str {
    if uses_12_hour_clock(locale) {
        "%-I:%M %p"
    } else {
        "%H:%M"
    }
}
