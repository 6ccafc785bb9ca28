pub mod app_settings;
pub mod app_state;
pub mod error_copy;
pub mod i18n;
pub mod locale;
pub mod match_stream;
pub mod messages;
pub mod network;
pub mod refresher;
pub mod settings_watcher;
pub mod tournament_form;
