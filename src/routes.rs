use crate::{
    api::{attendance, fines, tasks},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(handlers::protected)
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/check-in")
                            .route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-in/auto")
                            .route(web::post().to(attendance::auto_check_in)),
                    )
                    .service(
                        web::resource("/location")
                            .route(web::post().to(attendance::location_status)),
                    )
                    .service(web::resource("/today").route(web::get().to(attendance::today)))
                    .service(web::resource("/summary").route(web::get().to(attendance::summary))),
            )
            .service(
                web::scope("/fines")
                    // /fines
                    .service(web::resource("").route(web::get().to(fines::list_fines)))
                    // /fines/mine must come before /fines/{id}
                    .service(web::resource("/mine").route(web::get().to(fines::my_fines)))
                    .service(web::resource("/{id}").route(web::get().to(fines::get_fine)))
                    .service(
                        web::resource("/{id}/approve").route(web::put().to(fines::approve_fine)),
                    )
                    .service(
                        web::resource("/{id}/reject").route(web::put().to(fines::reject_fine)),
                    ),
            )
            .service(
                web::scope("/tasks")
                    // /tasks
                    .service(web::resource("").route(web::post().to(tasks::create_task)))
                    .service(web::resource("/mine").route(web::get().to(tasks::my_tasks)))
                    .service(
                        web::resource("/{id}/respond")
                            .route(web::put().to(tasks::respond_to_task)),
                    )
                    .service(
                        web::resource("/{id}/complete")
                            .route(web::put().to(tasks::complete_task)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
