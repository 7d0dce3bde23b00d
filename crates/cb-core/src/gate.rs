//! # Session / Access Gate
//!
//! Role checks for privileged operations and the routing decision for
//! dashboard views. A `Session` is either anonymous or carries the
//! `Identity` returned by a successful login.

use log::warn;

use crate::directory::UserDirectory;
use crate::error::{AppError, Result};
use crate::models::{Identity, Role};

/// Where a caller should end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    TeacherDashboard,
    StudentDashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::TeacherDashboard => "/teacher",
            Route::StudentDashboard => "/student",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl Session {
    /// Anonymous -> Authenticated. Fails without changing anything on bad credentials.
    pub async fn login(directory: &UserDirectory, username: &str, password: &str) -> Result<Session> {
        let user = directory.authenticate(username, password).await?;
        Ok(Session::Authenticated(user.identity()))
    }

    /// Authenticated -> Anonymous.
    pub fn logout(&mut self) {
        *self = Session::Anonymous;
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(identity) => Some(identity),
        }
    }

    /// The identity, or Forbidden for anonymous callers.
    pub fn require_identity(&self) -> Result<&Identity> {
        self.identity()
            .ok_or_else(|| AppError::Forbidden("login required".into()))
    }
}

pub struct AccessGate;

impl AccessGate {
    pub fn require_role(identity: &Identity, role: Role) -> Result<()> {
        if identity.role == role {
            Ok(())
        } else {
            warn!("'{}' ({}) denied: {} only", identity.id, identity.role, role);
            Err(AppError::Forbidden(format!("only a {role} may do this")))
        }
    }

    /// The neutral landing route for a session.
    pub fn landing(session: &Session) -> Route {
        match session.identity().map(|i| i.role) {
            None => Route::Login,
            Some(Role::Teacher) => Route::TeacherDashboard,
            Some(Role::Student) => Route::StudentDashboard,
        }
    }

    /// `requested` if the session may see it, otherwise the landing route.
    pub fn view(session: &Session, requested: Route) -> Route {
        let allowed = match (requested, session.identity()) {
            (Route::Login, _) => true,
            (Route::TeacherDashboard, Some(i)) => i.role == Role::Teacher,
            (Route::StudentDashboard, Some(i)) => i.role == Role::Student,
            (_, None) => false,
        };
        if allowed {
            requested
        } else {
            Self::landing(session)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in(role: Role) -> Session {
        Session::Authenticated(Identity { id: "u".into(), role })
    }

    #[test]
    fn require_role_matches_exactly() {
        let teacher = Identity { id: "t".into(), role: Role::Teacher };
        let student = Identity { id: "s".into(), role: Role::Student };
        assert!(AccessGate::require_role(&teacher, Role::Teacher).is_ok());
        assert!(matches!(
            AccessGate::require_role(&student, Role::Teacher),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn dashboards_redirect_on_role_mismatch() {
        let student = signed_in(Role::Student);
        assert_eq!(AccessGate::view(&student, Route::TeacherDashboard), Route::StudentDashboard);
        assert_eq!(AccessGate::view(&student, Route::StudentDashboard), Route::StudentDashboard);

        let teacher = signed_in(Role::Teacher);
        assert_eq!(AccessGate::view(&teacher, Route::StudentDashboard), Route::TeacherDashboard);

        let anon = Session::Anonymous;
        assert_eq!(AccessGate::view(&anon, Route::TeacherDashboard), Route::Login);
        assert_eq!(AccessGate::landing(&anon).path(), "/login");
    }

    #[test]
    fn logout_returns_to_anonymous() {
        let mut session = signed_in(Role::Teacher);
        assert!(session.require_identity().is_ok());
        session.logout();
        assert_eq!(session, Session::Anonymous);
        assert!(matches!(session.require_identity(), Err(AppError::Forbidden(_))));
    }
}
