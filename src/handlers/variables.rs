//! System variable handlers.

use crate::{
    error::ConnectionControlError,
    models::{SetVariableRequest, SetVariableResponse, VariablesResponse},
    services::ConnectionControl,
};
use actix_web::{Error, Result, web};
use paperclip::actix::api_v2_operation;
use tracing::{error, warn};

/// Map a component error onto an HTTP error
///
/// Rejected values become 400 responses; anything else is a 500.
pub fn http_error(e: ConnectionControlError) -> Error {
    if e.is_rejected_value() {
        warn!(error = %e, "Variable change rejected");
        actix_web::error::ErrorBadRequest(e.user_message())
    } else {
        error!(error = %e, "Variable change failed");
        actix_web::error::ErrorInternalServerError(e.user_message())
    }
}

#[api_v2_operation(
    summary = "System Variables",
    description = "Returns the committed values of the connection control system variables.",
    tags("Variables"),
    responses(
        (status = 200, description = "Successful response", body = VariablesResponse)
    )
)]
pub async fn get_variables(
    control: web::Data<ConnectionControl>,
) -> Result<web::Json<VariablesResponse>, Error> {
    Ok(web::Json(control.variables().into()))
}

/// Change one system variable
///
/// The value is checked against its range and, for the delay bounds, against
/// the committed counterpart before it is applied.
#[api_v2_operation(
    summary = "Set System Variable",
    description = "Checks and commits a new value for a connection control system variable. Accepts the qualified or short variable name.",
    tags("Variables"),
    responses(
        (status = 200, description = "Value committed", body = SetVariableResponse),
        (status = 400, description = "Unknown variable or value rejected")
    )
)]
pub async fn set_variable(
    control: web::Data<ConnectionControl>,
    name: web::Path<String>,
    body: web::Json<SetVariableRequest>,
) -> Result<web::Json<SetVariableResponse>, Error> {
    let option = control
        .set_variable(&name, body.value)
        .map_err(http_error)?;

    Ok(web::Json(SetVariableResponse {
        name: option.name().to_string(),
        value: control.variables().get(option),
    }))
}
