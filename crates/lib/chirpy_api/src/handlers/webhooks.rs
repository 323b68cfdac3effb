//! Third-party webhook handlers.

use axum::extract::State;
use axum::http::StatusCode;
use tracing::debug;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::models::PolkaWebhookRequest;
use crate::services::auth;

/// The only Polka event that changes anything.
const USER_UPGRADED: &str = "user.upgraded";

/// `POST /api/polka/webhooks`: payment notifications. The API key is
/// checked by middleware before the body is read.
pub async fn polka_webhook_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<PolkaWebhookRequest>,
) -> AppResult<StatusCode> {
    if body.event != USER_UPGRADED {
        debug!(event = %body.event, "ignoring polka event");
        return Ok(StatusCode::NO_CONTENT);
    }
    auth::upgrade_to_red(state.store.as_ref(), body.data.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
