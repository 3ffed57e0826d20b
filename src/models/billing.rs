use serde::{Deserialize, Serialize};
use serde_json::Value;

/// $1.00 in cents.
pub const PRICE_UNIT_AMOUNT: u32 = 100;
pub const PRICE_CURRENCY: &str = "usd";
pub const PRICE_INTERVAL: &str = "month";
pub const PRODUCT_NAME: &str = "Hook & Headlines Generator Pro";
pub const PRODUCT_DESCRIPTION: &str = "Unlimited hook generations + premium features";
pub const TRIAL_PERIOD_DAYS: u32 = 7;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl CheckoutRequest {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        if self.user_id.trim().is_empty() {
            issues.push("userId is empty".into());
        }
        if let Some(email) = self.email() {
            if !email.contains('@') || email.contains(char::is_whitespace) {
                issues.push("email is not a valid address".into());
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }

    /// The email, when one was given and is not blank.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Everything the payment processor needs to open a subscription checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutParams {
    pub user_id: String,
    pub customer_id: Option<String>,
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// Raw event envelope as posted by the payment processor.
#[derive(Deserialize, Debug, Clone)]
pub struct StripeEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: StripeEventData,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StripeEventData {
    pub object: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn checkout_request_needs_user_id() {
        let req: CheckoutRequest = serde_json::from_value(json!({"email": "a@b.co"})).unwrap();
        assert_eq!(req.validate().unwrap_err(), vec!["userId is empty".to_string()]);
    }

    #[test]
    fn blank_email_is_treated_as_absent() {
        let req: CheckoutRequest =
            serde_json::from_value(json!({"userId": "user_1", "email": "  "})).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.email(), None);
    }

    #[test]
    fn malformed_email_is_rejected() {
        let req: CheckoutRequest =
            serde_json::from_value(json!({"userId": "user_1", "email": "not an email"})).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn checkout_response_uses_camel_case() {
        let v = serde_json::to_value(CheckoutResponse {
            session_id: "cs_1".into(),
            url: "https://checkout".into(),
        })
        .unwrap();
        assert_eq!(v, json!({"sessionId": "cs_1", "url": "https://checkout"}));
    }
}
