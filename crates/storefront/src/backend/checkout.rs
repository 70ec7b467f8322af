//! Payment handoff.

use tracing::{info, instrument};
use zaheen_core::CheckoutRequest;

use super::types::CheckoutResponse;
use super::{BackendClient, BackendError};

impl BackendClient {
    /// Create a hosted checkout session for the given cart lines and return
    /// the payment page URL.
    ///
    /// Guests may check out, so the token is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the request or answers without
    /// a URL.
    #[instrument(skip(self, token, request), fields(lines = request.cart_items.len()))]
    pub async fn create_checkout(
        &self,
        token: Option<&str>,
        request: &CheckoutRequest,
    ) -> Result<String, BackendError> {
        let mut builder = self
            .http()
            .post(self.url("/payment/create-checkout"))
            .json(request);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let response: CheckoutResponse = self.fetch(builder).await?;
        let url = response
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| BackendError::UnexpectedResponse("checkout response has no url".to_string()))?;

        info!("Checkout session created");
        Ok(url)
    }
}
