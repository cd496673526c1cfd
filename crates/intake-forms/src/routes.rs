//! Routes, navigation and the admin passkey prompt.

use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use intake_core::AppConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Unknown route: {0}")]
    Unknown(String),

    #[error("Route {route} is missing query parameter {param}")]
    MissingParam { route: String, param: &'static str },
}

/// Application routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Intake form
    Home,
    /// Intake form with the admin passkey prompt open
    AdminPrompt,
    Admin,
    Register { user_id: String },
    NewAppointment { user_id: String },
    AppointmentSuccess { user_id: String, appointment_id: String },
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::AdminPrompt => write!(f, "/?admin=true"),
            Route::Admin => write!(f, "/admin"),
            Route::Register { user_id } => write!(f, "/patients/{}/register", user_id),
            Route::NewAppointment { user_id } => write!(f, "/patients/{}/new-appointment", user_id),
            Route::AppointmentSuccess { user_id, appointment_id } => write!(
                f,
                "/patients/{}/new-appointment/success?appointmentId={}",
                user_id, appointment_id
            ),
        }
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, query) = s.split_once('?').unwrap_or((s, ""));
        let param = |name: &str| {
            query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .filter(|value| !value.is_empty())
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] if param("admin").as_deref() == Some("true") => Ok(Route::AdminPrompt),
            [] => Ok(Route::Home),
            ["admin"] => Ok(Route::Admin),
            ["patients", user_id, "register"] => Ok(Route::Register { user_id: user_id.to_string() }),
            ["patients", user_id, "new-appointment"] => {
                Ok(Route::NewAppointment { user_id: user_id.to_string() })
            }
            ["patients", user_id, "new-appointment", "success"] => {
                let appointment_id = param("appointmentId").ok_or_else(|| RouteError::MissingParam {
                    route: s.to_string(),
                    param: "appointmentId",
                })?;
                Ok(Route::AppointmentSuccess { user_id: user_id.to_string(), appointment_id })
            }
            _ => Err(RouteError::Unknown(s.to_string())),
        }
    }
}

impl Route {
    pub fn parse(s: &str) -> Result<Self, RouteError> {
        s.parse()
    }
}

/// Moves the shell to another route.
pub trait Navigator {
    fn push(&self, route: Route);
}

/// In-memory navigator that records every push.
#[derive(Debug, Default)]
pub struct History {
    entries: RefCell<Vec<Route>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Route> {
        self.entries.borrow().last().cloned()
    }

    pub fn entries(&self) -> Vec<Route> {
        self.entries.borrow().clone()
    }
}

impl Navigator for History {
    fn push(&self, route: Route) {
        log::debug!("Navigating to {}", route);
        self.entries.borrow_mut().push(route);
    }
}

pub const PASSKEY_LENGTH: usize = 6;

/// Passkey prompt guarding the admin dashboard.
#[derive(Debug, Clone)]
pub struct AdminAccess {
    passkey: String,
    error: Option<String>,
}

impl AdminAccess {
    pub fn new(config: &AppConfig) -> Self {
        Self { passkey: config.admin_passkey.clone(), error: None }
    }

    /// Whether a route asks for the prompt.
    pub fn is_requested(route: &Route) -> bool {
        matches!(route, Route::AdminPrompt)
    }

    /// Check an entered passkey, moving to the dashboard when it matches.
    pub fn submit(&mut self, entered: &str, navigator: &dyn Navigator) -> bool {
        let entered = entered.trim();
        if entered.len() != PASSKEY_LENGTH || !entered.chars().all(|c| c.is_ascii_digit()) {
            self.error = Some(format!("Passkey must be {} digits.", PASSKEY_LENGTH));
            return false;
        }
        if entered != self.passkey {
            log::warn!("Rejected admin passkey attempt");
            self.error = Some("Invalid passkey. Please try again.".into());
            return false;
        }

        self.error = None;
        navigator.push(Route::Admin);
        true
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Close the prompt and go back to the intake form.
    pub fn close(&mut self, navigator: &dyn Navigator) {
        self.error = None;
        navigator.push(Route::Home);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse_agree() {
        let routes = [
            Route::Home,
            Route::AdminPrompt,
            Route::Admin,
            Route::Register { user_id: "u-1".into() },
            Route::NewAppointment { user_id: "u-1".into() },
            Route::AppointmentSuccess { user_id: "u-1".into(), appointment_id: "a-9".into() },
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.to_string()).unwrap(), route);
        }
    }

    #[test]
    fn test_route_strings() {
        assert_eq!(Route::Register { user_id: "abc".into() }.to_string(), "/patients/abc/register");
        assert_eq!(
            Route::AppointmentSuccess { user_id: "abc".into(), appointment_id: "xyz".into() }.to_string(),
            "/patients/abc/new-appointment/success?appointmentId=xyz"
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Route::parse("/nowhere"), Err(RouteError::Unknown(_))));
        assert!(matches!(
            Route::parse("/patients/abc/new-appointment/success"),
            Err(RouteError::MissingParam { param: "appointmentId", .. })
        ));
        assert_eq!(Route::parse("/?admin=false").unwrap(), Route::Home);
    }

    #[test]
    fn test_history_records_pushes() {
        let history = History::new();
        assert_eq!(history.current(), None);
        history.push(Route::Admin);
        history.push(Route::Home);
        assert_eq!(history.entries(), vec![Route::Admin, Route::Home]);
        assert_eq!(history.current(), Some(Route::Home));
    }

    #[test]
    fn test_admin_access() {
        let history = History::new();
        let mut access = AdminAccess::new(&AppConfig::default());
        assert!(AdminAccess::is_requested(&Route::AdminPrompt));

        assert!(!access.submit("12", &history));
        assert_eq!(access.error(), Some("Passkey must be 6 digits."));

        assert!(!access.submit("999999", &history));
        assert_eq!(access.error(), Some("Invalid passkey. Please try again."));
        assert!(history.entries().is_empty());

        assert!(access.submit(&AppConfig::default().admin_passkey, &history));
        assert_eq!(access.error(), None);
        assert_eq!(history.current(), Some(Route::Admin));
    }
}
