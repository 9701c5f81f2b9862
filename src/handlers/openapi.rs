//! OpenAPI specification generation and app factory.

use crate::{
    config::MetricsConfig,
    handlers::{
        connection_event, failed_login_attempts, get_metrics, get_variables, health, set_variable,
        status,
    },
    middleware::RequestMetrics,
    services::{ConnectionControl, ControlMetrics},
};
use actix_web::App;
use paperclip::actix::{OpenApiExt, web};
use paperclip::v2::models::{DefaultApiRaw, Info};

/// Creates the OpenAPI specification served at `/api/spec/v2`
pub fn create_openapi_spec() -> DefaultApiRaw {
    DefaultApiRaw {
        info: Info {
            title: "Connection Control Admin API".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: Some(
                "Administrative interface of the connection control component.\n\n\
                ## Delay policy\n\
                Once an account reaches `component_connection_control.failed_connections_threshold` \
                consecutive failed logins, every further connection attempt for it is held back for \
                `(failures + 1 - threshold)` seconds, clamped to \
                `component_connection_control.min_connection_delay` and \
                `component_connection_control.max_connection_delay` (milliseconds). \
                A successful login clears the account's counter. A threshold of 0 disables the policy.\n\
                \n\
                ## Endpoints\n\
                - `GET /api/variables`, `PUT /api/variables/{name}`: read and change the system variables\n\
                - `GET /api/status`: `Component_connection_control_delay_generated`\n\
                - `GET /api/failed-login-attempts`: rows of `connection_control_failed_login_attempts`\n\
                - `POST /api/connection-events`: report an authentication outcome\n\
                \n\
                Changing the threshold resets the delay counter and forgets every recorded failure."
                    .into(),
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Creates the admin app around a loaded component
///
/// Used by the binary and by the HTTP tests.
pub fn create_base_app(
    control: web::Data<ConnectionControl>,
    metrics: web::Data<ControlMetrics>,
    metrics_config: MetricsConfig,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(RequestMetrics)
        .wrap_api_with_spec(create_openapi_spec())
        .app_data(control)
        .app_data(metrics)
        .app_data(web::Data::new(metrics_config))
        .service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/metrics").route(web::get().to(get_metrics)))
        .service(web::resource("/api/status").route(web::get().to(status)))
        .service(web::resource("/api/variables").route(web::get().to(get_variables)))
        .service(web::resource("/api/variables/{name}").route(web::put().to(set_variable)))
        .service(
            web::resource("/api/failed-login-attempts")
                .route(web::get().to(failed_login_attempts)),
        )
        .service(
            web::resource("/api/connection-events").route(web::post().to(connection_event)),
        )
        .with_json_spec_at("/api/spec/v2")
        .build()
}
