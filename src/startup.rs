use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AuthService, TokenIssuer, TokenVerifier};
use crate::configuration::{HashingSettings, JwtSettings};
use crate::error::AppError;
use crate::middleware::{BearerAuth, ProcessTime};
use crate::routes::{
    create_task, get_current_user, get_task, health_check, home, list_tasks, login, signup, token,
};
use crate::store::{CredentialStore, TaskStore};

/// Builds the auth core from settings.
///
/// Fails on an empty secret, an unsupported algorithm, a non-positive token
/// lifetime or a bcrypt cost outside 4..=31; the process must not start with
/// any of those.
pub fn build_auth(
    jwt: &JwtSettings,
    hashing: &HashingSettings,
    store: Arc<dyn CredentialStore>,
) -> Result<(AuthService, TokenVerifier), AppError> {
    let key = jwt.signing_key()?;
    let ttl = jwt.token_ttl()?;
    let hasher = hashing.hasher()?;

    let issuer = TokenIssuer::new(&key);
    let verifier = TokenVerifier::new(&key, jwt.leeway_seconds);
    let service = AuthService::new(store, hasher, issuer, ttl)?;

    Ok((service, verifier))
}

pub fn run(
    listener: TcpListener,
    auth: AuthService,
    verifier: TokenVerifier,
    tasks: Arc<dyn TaskStore>,
) -> Result<Server, std::io::Error> {
    let auth = web::Data::new(auth);
    let tasks: web::Data<dyn TaskStore> = web::Data::from(tasks);
    let verifier = Arc::new(verifier);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(ProcessTime)

            // Shared state
            .app_data(auth.clone())
            .app_data(tasks.clone())

            // Public routes
            .route("/", web::get().to(home))
            .route("/health_check", web::get().to(health_check))
            .route("/auth/signup", web::post().to(signup))
            .route("/auth/login", web::post().to(login))
            .route("/auth/token", web::post().to(token))

            // Protected routes
            .service(
                web::resource("/auth/me")
                    .wrap(BearerAuth::new(verifier.clone()))
                    .route(web::get().to(get_current_user)),
            )
            .service(
                web::scope("/tasks")
                    .wrap(BearerAuth::new(verifier.clone()))
                    .route("", web::post().to(create_task))
                    .route("", web::get().to(list_tasks))
                    .route("/{task_id}", web::get().to(get_task)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
