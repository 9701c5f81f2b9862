//! Status variable and observability table handlers.

use crate::{
    models::{FailedLoginAttempt, StatusResponse},
    services::ConnectionControl,
};
use actix_web::{Error, Result, web};
use paperclip::actix::api_v2_operation;

#[api_v2_operation(
    summary = "Status Variables",
    description = "Returns Component_connection_control_delay_generated, the number of connections delayed since the threshold was last changed.",
    tags("Status"),
    responses(
        (status = 200, description = "Successful response", body = StatusResponse)
    )
)]
pub async fn status(control: web::Data<ConnectionControl>) -> Result<web::Json<StatusResponse>, Error> {
    Ok(web::Json(StatusResponse {
        delay_generated: control.delay_generated(),
    }))
}

/// Rows of `connection_control_failed_login_attempts`
///
/// Read from a snapshot taken for this request; an empty list is returned
/// when the snapshot cannot be taken.
#[api_v2_operation(
    summary = "Failed Login Attempts",
    description = "Returns the rows of connection_control_failed_login_attempts: one entry per account with its consecutive failed logins.",
    tags("Status"),
    responses(
        (status = 200, description = "One row per account with failed logins")
    )
)]
pub async fn failed_login_attempts(
    control: web::Data<ConnectionControl>,
) -> Result<web::Json<Vec<FailedLoginAttempt>>, Error> {
    Ok(web::Json(control.failed_login_attempts()))
}
