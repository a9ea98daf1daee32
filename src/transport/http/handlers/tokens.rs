use crate::domain::ids::{address_hex, parse_address};
use crate::transport::http::handlers::common::{error_response, ok};
use crate::transport::http::types::{ApiResponse, AppState, Balance};
use axum::extract::{Path, State};
use axum::response::Response;

#[utoipa::path(
    get,
    path = "/api/usdfc/balance/{address}",
    params(("address" = String, Path, description = "Account address")),
    responses(
        (status = 200, description = "USDFC balance", body = Balance),
        (status = 400, description = "Invalid address", body = ApiResponse),
        (status = 502, description = "Token call failed", body = ApiResponse)
    )
)]
pub async fn balance_handler(State(state): State<AppState>, Path(address): Path<String>) -> Response {
    let account = match parse_address(&address) {
        Ok(a) => a,
        Err(e) => return error_response(e),
    };
    match state.manager.usdfc().get_balance(account).await {
        Ok(balance) => ok(Balance {
            address: address_hex(&account),
            balance,
        }),
        Err(e) => error_response(e),
    }
}
