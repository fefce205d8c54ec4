// handlers/email.rs - Contact form
//
// POST /portfolio/email/create is public: the message is mailed to the site
// owner first and only stored once the relay accepted it.

use axum::extract::State;

use crate::auth::validate_email_format;
use crate::database::models::MessageFields;
use crate::database::{PatchError, Update};
use crate::error::ApiError;
use crate::mail::{render_contact_html, CONTACT_SUBJECT};
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

use super::resource::{self, NoPatch, Resource};

pub struct Messages;

impl Resource for Messages {
    const COLLECTION: &'static str = "Emails";
    const LABEL: &'static str = "message";
    const TITLE: &'static str = "Message";
    const PLURAL: &'static str = "messages";
    const LIST_KEY: &'static str = "messages";
    const ITEM_KEY: &'static str = "message";

    type Fields = MessageFields;
    type Patch = NoPatch;

    fn apply(_patch: &NoPatch, update: Update) -> Result<Update, PatchError> {
        Ok(update)
    }
}

pub async fn create(State(state): State<AppState>, JsonBody(message): JsonBody<MessageFields>) -> ApiResult {
    match message.email.as_deref() {
        Some(email) => validate_email_format(email).map_err(ApiError::bad_request)?,
        None => return Err(ApiError::bad_request("Email is required")),
    }

    let html = render_contact_html(&message);
    state.mailer.send(CONTACT_SUBJECT, &html).await?;

    resource::insert::<Messages>(&state, message).await?;
    Ok(ApiResponse::created().message("Message sent successfully"))
}
