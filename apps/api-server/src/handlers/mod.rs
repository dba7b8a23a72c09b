//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod categories;
mod feed;
mod health;
mod posts;


use actix_web::web;

use crate::middleware::error::{json_config, query_config};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/rss.xml", web::get().to(feed::rss_feed))
        .route("/sitemap.xml", web::get().to(feed::sitemap))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health_check))
                .service(
                    web::scope("/posts")
                        .route("", web::get().to(posts::list_posts))
                        .route("", web::post().to(posts::create_post))
                        .route("/{slug}", web::get().to(posts::get_post))
                        .route("/{id}", web::put().to(posts::update_post))
                        .route("/{id}", web::delete().to(posts::delete_post)),
                )
                .service(
                    web::scope("/categories")
                        .route("", web::get().to(categories::list_categories))
                        .route("", web::post().to(categories::create_category))
                        // Registered before `/{id}` so "order" is not parsed as an id.
                        .route("/order", web::put().to(categories::reorder_categories))
                        .route("/{id}", web::get().to(categories::get_category))
                        .route("/{id}", web::put().to(categories::update_category))
                        .route("/{id}", web::delete().to(categories::delete_category)),
                )
                .service(
                    web::scope("/auth")
                        .route("/google", web::post().to(auth::google_sign_in))
                        .route("/me", web::get().to(auth::me)),
                )
                .service(
                    web::scope("/admin/allowed-emails")
                        .route("", web::get().to(admin::list_allowed_emails))
                        .route("", web::post().to(admin::invite))
                        .route("/{email}", web::delete().to(admin::remove)),
                ),
        );
}
