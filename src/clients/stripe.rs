use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::models::billing::{
    CheckoutParams, CheckoutSession, Customer, PRICE_CURRENCY, PRICE_INTERVAL, PRICE_UNIT_AMOUNT,
    PRODUCT_DESCRIPTION, PRODUCT_NAME, TRIAL_PERIOD_DAYS,
};

#[async_trait::async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>>;
    async fn create_customer(&self, email: &str, user_id: &str) -> Result<Customer>;
    async fn create_checkout_session(&self, params: &CheckoutParams) -> Result<CheckoutSession>;
}

/// Minimal Stripe REST client: form-encoded requests, bearer secret key.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
}

#[derive(Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let key = settings
            .stripe_secret_key
            .clone()
            .ok_or_else(|| AppError::Configuration("Missing STRIPE_SECRET_KEY".into()))?;
        Ok(Self::new(key, settings.stripe_api_base.clone()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.base_url)
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| "no error message".into());
            return Err(AppError::External(format!("Stripe returned {status}: {message}")));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::External(format!("unexpected Stripe response: {e}")))
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: &[(String, String)]) -> Result<T> {
        debug!(path, fields = form.len(), "stripe request");
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::External(format!("Stripe request failed: {e}")))?;
        Self::read(response).await
    }
}

/// Stripe's bracketed form encoding of a subscription checkout.
pub fn checkout_form(params: &CheckoutParams) -> Vec<(String, String)> {
    let mut form: Vec<(&str, String)> = vec![
        ("mode", "subscription".into()),
        ("payment_method_types[0]", "card".into()),
        ("line_items[0][price_data][currency]", PRICE_CURRENCY.into()),
        ("line_items[0][price_data][product_data][name]", PRODUCT_NAME.into()),
        ("line_items[0][price_data][product_data][description]", PRODUCT_DESCRIPTION.into()),
        ("line_items[0][price_data][unit_amount]", PRICE_UNIT_AMOUNT.to_string()),
        ("line_items[0][price_data][recurring][interval]", PRICE_INTERVAL.into()),
        ("line_items[0][quantity]", "1".into()),
        ("success_url", params.success_url.clone()),
        ("cancel_url", params.cancel_url.clone()),
        ("metadata[userId]", params.user_id.clone()),
        ("allow_promotion_codes", "true".into()),
        ("billing_address_collection", "auto".into()),
        ("subscription_data[metadata][userId]", params.user_id.clone()),
        ("subscription_data[trial_period_days]", TRIAL_PERIOD_DAYS.to_string()),
    ];
    match (&params.customer_id, &params.customer_email) {
        (Some(id), _) => form.push(("customer", id.clone())),
        (None, Some(email)) => form.push(("customer_email", email.clone())),
        (None, None) => {}
    }
    form.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[async_trait::async_trait]
impl PaymentProcessor for StripeClient {
    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let response = self
            .http
            .get(self.url("customers"))
            .bearer_auth(&self.secret_key)
            .query(&[("email", email), ("limit", "1")])
            .send()
            .await
            .map_err(|e| AppError::External(format!("Stripe request failed: {e}")))?;
        let list: ListResponse<Customer> = Self::read(response).await?;
        Ok(list.data.into_iter().next())
    }

    async fn create_customer(&self, email: &str, user_id: &str) -> Result<Customer> {
        let form = vec![
            ("email".to_string(), email.to_string()),
            ("metadata[userId]".to_string(), user_id.to_string()),
        ];
        self.post_form("customers", &form).await
    }

    async fn create_checkout_session(&self, params: &CheckoutParams) -> Result<CheckoutSession> {
        self.post_form("checkout/sessions", &checkout_form(params)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn params() -> CheckoutParams {
        CheckoutParams {
            user_id: "user_42".into(),
            customer_id: Some("cus_1".into()),
            customer_email: Some("a@b.co".into()),
            success_url: "https://app.example?success=true&session_id={CHECKOUT_SESSION_ID}".into(),
            cancel_url: "https://app.example?canceled=true".into(),
        }
    }

    fn value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn form_describes_one_dollar_monthly_subscription() {
        let form = checkout_form(&params());
        assert_eq!(value(&form, "mode"), Some("subscription"));
        assert_eq!(value(&form, "line_items[0][price_data][unit_amount]"), Some("100"));
        assert_eq!(value(&form, "line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(value(&form, "line_items[0][price_data][recurring][interval]"), Some("month"));
        assert_eq!(value(&form, "subscription_data[trial_period_days]"), Some("7"));
        assert_eq!(value(&form, "metadata[userId]"), Some("user_42"));
        assert_eq!(value(&form, "subscription_data[metadata][userId]"), Some("user_42"));
    }

    #[test]
    fn known_customer_wins_over_email() {
        let form = checkout_form(&params());
        assert_eq!(value(&form, "customer"), Some("cus_1"));
        assert_eq!(value(&form, "customer_email"), None);

        let anonymous = CheckoutParams { customer_id: None, customer_email: None, ..params() };
        let form = checkout_form(&anonymous);
        assert_eq!(value(&form, "customer"), None);
        assert_eq!(value(&form, "customer_email"), None);
    }

    #[tokio::test]
    async fn finds_existing_customer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/customers")
            .match_header("authorization", "Bearer sk_test_1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("email".into(), "a@b.co".into()),
                Matcher::UrlEncoded("limit".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(json!({"object": "list", "data": [{"id": "cus_9", "email": "a@b.co"}]}).to_string())
            .create_async()
            .await;

        let client = StripeClient::new("sk_test_1", server.url());
        let found = client.find_customer_by_email("a@b.co").await.unwrap();
        assert_eq!(found, Some(Customer { id: "cus_9".into() }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn creates_session_with_form_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/checkout/sessions")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("mode".into(), "subscription".into()),
                Matcher::UrlEncoded("customer".into(), "cus_1".into()),
            ]))
            .with_status(200)
            .with_body(json!({"id": "cs_test_1", "url": "https://checkout.stripe.com/c/cs_test_1"}).to_string())
            .create_async()
            .await;

        let client = StripeClient::new("sk_test_1", server.url());
        let session = client.create_checkout_session(&params()).await.unwrap();
        assert_eq!(session.id, "cs_test_1");
        assert_eq!(session.url.as_deref(), Some("https://checkout.stripe.com/c/cs_test_1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_errors_carry_stripe_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/customers")
            .with_status(402)
            .with_body(json!({"error": {"message": "Your card was declined."}}).to_string())
            .create_async()
            .await;

        let client = StripeClient::new("sk_test_1", server.url());
        let err = client.create_customer("a@b.co", "user_1").await.unwrap_err();
        match err {
            AppError::External(msg) => assert!(msg.contains("Your card was declined.")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_secret_is_a_configuration_error() {
        assert!(matches!(
            StripeClient::from_settings(&Settings::default()),
            Err(AppError::Configuration(_))
        ));
    }
}
