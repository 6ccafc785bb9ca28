use scorebook_api::client::ApiError;

/// Keys are backend error codes or HTTP statuses rendered as strings.
type CopyTable = &'static [(&'static str, &'static str)];

pub const NETWORK_ERROR_COPY: &str = "Unable to reach the server. Check your connection and try again.";

pub const LOGIN_ERROR_COPY: CopyTable = &[
    ("invalid_credentials", "Invalid username or password."),
    ("account_locked", "This account is locked. Contact a club admin."),
    ("401", "Invalid username or password."),
    ("403", "This account is not allowed to sign in."),
    ("429", "Too many login attempts. Please wait a minute and try again."),
    ("500", "The server hit an error while signing you in. Please try again."),
];
const LOGIN_DEFAULT: &str = "Login failed. Please try again.";

pub const SIGNUP_ERROR_COPY: CopyTable = &[
    ("username_taken", "That username is already taken."),
    ("password_too_short", "Password must be at least 12 characters long."),
    ("password_too_weak", "Password is too weak. Mix letters, numbers and symbols."),
    ("signup_disabled", "New signups are currently disabled."),
    ("409", "That username is already taken."),
    ("403", "New signups are currently disabled."),
    ("422", "Please check the username and password and try again."),
    ("429", "Too many signup attempts. Please wait a minute and try again."),
];
const SIGNUP_DEFAULT: &str = "Signup failed. Please try again.";

pub const TOURNAMENT_ERROR_COPY: CopyTable = &[
    ("401", "Log in to create tournaments."),
    ("403", "You do not have permission to create tournaments."),
    ("404", "The selected sport or club no longer exists."),
    ("409", "A tournament with that name already exists."),
];

fn lookup(table: CopyTable, err: &ApiError) -> Option<&'static str> {
    if err.is_network() {
        return Some(NETWORK_ERROR_COPY);
    }
    let by_code = err
        .code()
        .and_then(|code| table.iter().find(|(key, _)| *key == code));
    let by_status = || {
        let status = err.status()?.to_string();
        table.iter().find(|(key, _)| *key == status)
    };
    by_code.or_else(by_status).map(|(_, copy)| *copy)
}

pub fn login_error_message(err: &ApiError) -> String {
    lookup(LOGIN_ERROR_COPY, err).unwrap_or(LOGIN_DEFAULT).to_string()
}

pub fn signup_error_message(err: &ApiError) -> String {
    lookup(SIGNUP_ERROR_COPY, err).unwrap_or(SIGNUP_DEFAULT).to_string()
}

/// Validation failures carry the backend detail; anything unmapped names the
/// step of the Americano setup that failed.
pub fn tournament_error_message(err: &ApiError) -> String {
    if let Some(copy) = lookup(TOURNAMENT_ERROR_COPY, err) {
        return copy.to_string();
    }
    if err.status() == Some(422) {
        return match err.detail() {
            Some(detail) => format!("The tournament was rejected: {detail}"),
            None => "The tournament was rejected. Check the players and courts.".to_string(),
        };
    }
    match err {
        ApiError::Americano { step, .. } => {
            format!("Could not {} right now. Please try again.", step.label())
        }
        _ => "Could not create the tournament right now. Please try again.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorebook_api::client::AmericanoStep;

    fn status(status: u16, code: Option<&str>, detail: Option<&str>) -> ApiError {
        ApiError::Status {
            status,
            code: code.map(String::from),
            detail: detail.map(String::from),
            url: "http://localhost/v0/x".into(),
        }
    }

    #[test]
    fn login_prefers_code_over_status() {
        let err = status(403, Some("account_locked"), None);
        assert_eq!(login_error_message(&err), "This account is locked. Contact a club admin.");
        let err = status(429, None, None);
        assert!(login_error_message(&err).starts_with("Too many login attempts"));
        let err = status(418, Some("teapot"), None);
        assert_eq!(login_error_message(&err), LOGIN_DEFAULT);
    }

    #[test]
    fn signup_maps_conflicts() {
        assert_eq!(
            signup_error_message(&status(409, None, None)),
            "That username is already taken."
        );
        assert_eq!(
            signup_error_message(&status(400, Some("password_too_short"), None)),
            "Password must be at least 12 characters long."
        );
    }

    #[test]
    fn tournament_copy_sees_through_americano_wrapping() {
        let err = ApiError::Americano {
            step: AmericanoStep::CreateStage,
            source: Box::new(status(403, None, Some("forbidden"))),
        };
        assert_eq!(
            tournament_error_message(&err),
            "You do not have permission to create tournaments."
        );

        let err = ApiError::Americano {
            step: AmericanoStep::Schedule,
            source: Box::new(status(422, None, Some("need 4 players"))),
        };
        assert_eq!(tournament_error_message(&err), "The tournament was rejected: need 4 players");

        let err = ApiError::Americano {
            step: AmericanoStep::Schedule,
            source: Box::new(status(502, None, None)),
        };
        assert_eq!(
            tournament_error_message(&err),
            "Could not schedule stage right now. Please try again."
        );
    }
}
