use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};

/// Identity of the caller, decoded from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only for station managers
    pub location: Option<String>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        let role = match Role::from_id(claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
            location: claims.location,
        }))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin only"))
        }
    }

    pub fn require_hr_or_admin(&self) -> actix_web::Result<()> {
        if self.role.can_decide() {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("HR/Admin only"))
        }
    }

    /// Station managers may only touch employees of their own station.
    pub fn can_access_location(&self, location: &str) -> bool {
        if !self.role.is_location_scoped() {
            return true;
        }
        self.location
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(location))
    }

    pub fn require_location(&self, location: &str) -> actix_web::Result<()> {
        if self.can_access_location(location) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden(
                "You can only manage employees of your own station",
            ))
        }
    }

    /// Location filter to apply to list queries, if any.
    pub fn location_scope(&self) -> Option<&str> {
        if self.role.is_location_scoped() {
            // a station manager without a station sees nothing
            Some(self.location.as_deref().unwrap_or(""))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, location: Option<&str>) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "tester".to_string(),
            role,
            location: location.map(str::to_string),
        }
    }

    #[test]
    fn hr_sees_every_location() {
        let hr = user(Role::HrManager, None);
        assert!(hr.can_access_location("kiambu"));
        assert_eq!(hr.location_scope(), None);
        assert!(hr.require_hr_or_admin().is_ok());
        assert!(hr.require_admin().is_err());
    }

    #[test]
    fn station_manager_is_scoped() {
        let manager = user(Role::StationManager, Some("dandora"));
        assert!(manager.can_access_location("Dandora"));
        assert!(!manager.can_access_location("tassia"));
        assert_eq!(manager.location_scope(), Some("dandora"));
        assert!(manager.require_hr_or_admin().is_err());
    }

    #[test]
    fn station_manager_without_station_sees_nothing() {
        let manager = user(Role::StationManager, None);
        assert!(!manager.can_access_location("dandora"));
        assert_eq!(manager.location_scope(), Some(""));
    }
}
