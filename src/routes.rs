use crate::{
    api::{compliance, leave_request},
    auth::handlers,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg = match GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
    {
        Some(cfg) => cfg,
        None => {
            tracing::warn!(requests_per_min, "Invalid rate limit, using governor defaults");
            GovernorConfig::default()
        }
    };
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(login_limiter)
                .route(web::post().to(handlers::login)),
        ),
    );

    // Protected routes, every handler extracts AuthUser
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/users").route(web::post().to(handlers::create_user)))
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // fixed paths must come before /leave/{id}
                    .service(
                        web::resource("/policies").route(web::get().to(compliance::list_policies)),
                    )
                    .service(
                        web::resource("/validate")
                            .route(web::post().to(compliance::validate_leave)),
                    )
                    .service(
                        web::resource("/compliance")
                            .route(web::get().to(compliance::compliance_summary)),
                    )
                    .service(
                        web::resource("/balance/{employee_id}")
                            .route(web::get().to(compliance::employee_balance)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    )
                    // /leave/{id}/cancel
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::put().to(leave_request::cancel_leave)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::policy::PolicyTable;
    use actix_web::{App, http::StatusCode};

    fn config() -> Config {
        Config::from_lookup(|key| match key {
            "SERVER_ADDR" => Some("127.0.0.1:0".to_string()),
            "DATABASE_URL" => Some("mysql://localhost/leave".to_string()),
            "JWT_SECRET" => Some("route-secret".to_string()),
            _ => None,
        })
        .expect("test config")
    }

    #[actix_web::test]
    async fn protected_routes_reject_anonymous_callers() {
        let config = config();
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(config.clone()))
                .app_data(web::Data::new(PolicyTable::statutory().clone()))
                .configure(|cfg| configure(cfg, &config)),
        )
        .await;

        let req = actix_web::test::TestRequest::get()
            .uri("/api/leave/policies")
            .peer_addr("127.0.0.1:4000".parse().expect("socket addr"))
            .to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn unknown_routes_are_not_found() {
        let config = config();
        let app = actix_web::test::init_service(
            App::new()
                .app_data(web::Data::new(config.clone()))
                .configure(|cfg| configure(cfg, &config)),
        )
        .await;

        let req = actix_web::test::TestRequest::get()
            .uri("/api/timesheets")
            .peer_addr("127.0.0.1:4000".parse().expect("socket addr"))
            .to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn zero_rate_still_builds_a_limiter() {
        let _ = build_limiter(0);
    }
}
