//! Connection event feed handler.

use std::time::Instant;

use crate::{
    models::{
        AuthOutcome, Connection, ConnectionEvent, ConnectionEventRequest, ConnectionEventResponse,
        EventSubclass,
    },
    services::{ConnectionControl, KillOnDrop, make_key},
    utils::client_ip,
};
use actix_web::{Error, HttpRequest, Result, web};
use paperclip::actix::api_v2_operation;

/// Feed one connection event through the component
///
/// Runs on the blocking thread pool, since the component holds the calling
/// thread for the imposed delay. The response reports how long the event was
/// held back and the account's failure count afterwards. If the client goes
/// away first, the dropped request kills the connection and ends the wait.
#[api_v2_operation(
    summary = "Report Connection Event",
    description = "Submits an authentication outcome for an account. Accounts past the failed connections threshold are held back before the response is sent.",
    tags("Events"),
    responses(
        (status = 200, description = "Event processed", body = ConnectionEventResponse),
        (status = 400, description = "Unknown event subclass")
    )
)]
pub async fn connection_event(
    req: HttpRequest,
    control: web::Data<ConnectionControl>,
    body: web::Json<ConnectionEventRequest>,
) -> Result<web::Json<ConnectionEventResponse>, Error> {
    let subclass: EventSubclass = body
        .subclass
        .parse()
        .map_err(actix_web::error::ErrorBadRequest)?;
    let outcome = if body.success {
        AuthOutcome::Success
    } else {
        AuthOutcome::Failure
    };
    let context = body.security_context(client_ip(&req));
    let key = make_key(&context);
    let connection = Connection::new(context);
    let _kill_on_drop = KillOnDrop::new(connection.kill_handle());

    let response = tokio::task::spawn_blocking(move || {
        let started = Instant::now();
        control.on_connection_event(&ConnectionEvent::new(subclass, outcome, &connection));
        let delayed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        ConnectionEventResponse {
            failed_attempts: control.failed_attempts_for(&key),
            account: key.into_string(),
            delayed_ms,
        }
    })
    .await
    .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(web::Json(response))
}
