use reqwest::Method;

use super::client::ApiClient;
use super::error::ApiError;
use crate::models::{Message, NewMessage};
use crate::token::Credential;

impl ApiClient {
    /// The caller's feed, newest first as sorted by the backend.
    pub async fn list_messages(&self, credential: &Credential) -> Result<Vec<Message>, ApiError> {
        let request = self.request(Method::GET, "messages", Some(credential));
        self.execute_json(request, "messages").await
    }

    pub async fn send_message(
        &self,
        credential: &Credential,
        message: &NewMessage,
    ) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "messages", Some(credential))
            .json(message);
        self.execute(request, "messages.send").await?;
        Ok(())
    }
}
