// Typed wrappers over ApiClient for the workflow endpoints. Each mutating
// method runs the same rule table the server enforces, so an invalid
// payload never leaves the process.
use serde_json::{json, Map, Value};

use super::{ApiClient, ClientError};
use crate::validation::rules;

pub struct RequestsClient {
    api: ApiClient,
}

impl RequestsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&mut self) -> &mut ApiClient {
        &mut self.api
    }

    pub async fn submit_renewal(
        &mut self,
        payload: &Map<String, Value>,
    ) -> Result<Value, ClientError> {
        let report = rules::validate_membership_renewal(payload);
        if !report.is_valid {
            return Err(report.into());
        }
        self.api.post("/api/membership/renew", &Value::Object(payload.clone())).await
    }

    pub async fn submit_foundation_class_registration(
        &mut self,
        payload: &Map<String, Value>,
    ) -> Result<Value, ClientError> {
        let report = rules::validate_foundation_class_registration(payload);
        if !report.is_valid {
            return Err(report.into());
        }
        self.api.post("/api/foundation-classes/register", &Value::Object(payload.clone())).await
    }

    pub async fn submit_event_signup(
        &mut self,
        event_id: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, ClientError> {
        let report = rules::validate_event_signup(payload);
        if !report.is_valid {
            return Err(report.into());
        }
        self.api
            .post(&format!("/api/events/{}/signup", event_id), &Value::Object(payload.clone()))
            .await
    }

    pub async fn list_renewals(&mut self) -> Result<Value, ClientError> {
        self.api.authed_get("/api/membership/renewals").await
    }

    pub async fn set_renewal_status(
        &mut self,
        id: &str,
        status: &str,
    ) -> Result<Value, ClientError> {
        let report = rules::validate_membership_status(status);
        if !report.is_valid {
            return Err(report.into());
        }
        self.api
            .put(&format!("/api/membership/renewals/{}", id), &json!({ "status": status }))
            .await
    }

    pub async fn delete_renewal(&mut self, id: &str) -> Result<Value, ClientError> {
        self.api.delete(&format!("/api/membership/renewals/{}", id)).await
    }

    pub async fn list_registrations(&mut self) -> Result<Value, ClientError> {
        self.api.authed_get("/api/foundation-classes/registrations").await
    }

    pub async fn set_registration_status(
        &mut self,
        id: &str,
        status: &str,
    ) -> Result<Value, ClientError> {
        let report = rules::validate_foundation_class_status(status);
        if !report.is_valid {
            return Err(report.into());
        }
        self.api
            .put(
                &format!("/api/foundation-classes/registrations/{}", id),
                &json!({ "status": status }),
            )
            .await
    }

    pub async fn delete_registration(&mut self, id: &str) -> Result<Value, ClientError> {
        self.api.delete(&format!("/api/foundation-classes/registrations/{}", id)).await
    }

    pub async fn list_signups(&mut self) -> Result<Value, ClientError> {
        self.api.authed_get("/api/event-signups").await
    }

    pub async fn set_signup_status(
        &mut self,
        id: &str,
        status: &str,
    ) -> Result<Value, ClientError> {
        let report = rules::validate_event_signup_status(status);
        if !report.is_valid {
            return Err(report.into());
        }
        self.api.put(&format!("/api/event-signups/{}", id), &json!({ "status": status })).await
    }

    pub async fn delete_signup(&mut self, id: &str) -> Result<Value, ClientError> {
        self.api.delete(&format!("/api/event-signups/{}", id)).await
    }

    pub async fn send_notification(
        &mut self,
        recipient: &str,
        subject: &str,
        message: &str,
    ) -> Result<Value, ClientError> {
        let payload = json!({
            "recipient": recipient,
            "subject": subject,
            "message": message,
        });
        let candidate = payload.as_object().cloned().unwrap_or_default();
        let report = crate::validation::validate_record(rules::notification_rules(), &candidate);
        if !report.is_valid {
            return Err(report.into());
        }
        self.api.post("/api/notifications", &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // All of these fail validation locally: no server, no network.

    #[tokio::test]
    async fn invalid_renewal_never_reaches_the_network() {
        let mut client = RequestsClient::new(ApiClient::with_dev_login("http://127.0.0.1:9"));
        let payload = serde_json::json!({"full_name": "J"}).as_object().cloned().unwrap();

        let err = client.submit_renewal(&payload).await.unwrap_err();
        match err {
            ClientError::Validation(errors) => {
                assert!(errors.contains_key("email"));
                assert!(errors.contains_key("phone"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn invalid_status_never_reaches_the_network() {
        let mut client = RequestsClient::new(ApiClient::with_dev_login("http://127.0.0.1:9"));
        let err = client.set_registration_status("abc", "graduated").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn invalid_notification_never_reaches_the_network() {
        let mut client = RequestsClient::new(ApiClient::with_dev_login("http://127.0.0.1:9"));
        let err = client.send_notification("not-an-email", "Hi", "There").await.unwrap_err();
        match err {
            ClientError::Validation(errors) => assert!(errors.contains_key("recipient")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
