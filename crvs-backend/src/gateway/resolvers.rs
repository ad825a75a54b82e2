use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

use super::config_service::{ConfigService, NotificationContent};
use super::protocol::Operation;
use super::GatewayError;
use crate::models::{
    InformantSmsNotification, NotificationName, Session, UpdateInformantSmsNotificationItem,
    SCOPE_NATLSYSADMIN,
};

/// Language whose messages are attached to notifications
const MESSAGE_LANGUAGE: &str = "en";

/// Notification toggle enriched with the SMS text it sends
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmsNotification {
    #[serde(flatten)]
    pub notification: InformantSmsNotification,
    pub message: String,
}

/// Caller context passed to every resolver
pub struct ResolverContext<'a> {
    pub session: &'a Session,
    /// Raw `Authorization` header, forwarded to downstream services
    pub authorization: &'a str,
}

pub struct Resolvers {
    config_service: Arc<dyn ConfigService>,
}

impl Resolvers {
    pub fn new(config_service: Arc<dyn ConfigService>) -> Self {
        Self { config_service }
    }

    /// Run an operation by name with its variables
    pub async fn execute(
        &self,
        ctx: &ResolverContext<'_>,
        operation_name: &str,
        variables: &Value,
    ) -> Result<(Operation, Value), GatewayError> {
        let operation = Operation::from_name(operation_name)
            .ok_or_else(|| GatewayError::UnknownOperation(operation_name.to_string()))?;

        let result = match operation {
            Operation::InformantSmsNotifications => {
                self.informant_sms_notifications(ctx).await?
            }
            Operation::ToggleInformantSmsNotification => {
                let sms_notifications: Vec<UpdateInformantSmsNotificationItem> = variables
                    .get("smsNotifications")
                    .cloned()
                    .map(serde_json::from_value)
                    .transpose()
                    .map_err(|e| GatewayError::InvalidVariables(e.to_string()))?
                    .ok_or_else(|| {
                        GatewayError::InvalidVariables("smsNotifications is required".to_string())
                    })?;
                self.toggle_informant_sms_notification(ctx, &sms_notifications).await?
            }
        };

        let value = serde_json::to_value(result)
            .map_err(|e| GatewayError::InvalidVariables(e.to_string()))?;
        Ok((operation, value))
    }

    pub async fn informant_sms_notifications(
        &self,
        ctx: &ResolverContext<'_>,
    ) -> Result<Vec<SmsNotification>, GatewayError> {
        ensure_natlsysadmin(ctx.session)?;

        let notifications = self
            .config_service
            .get_informant_sms_notifications(ctx.authorization)
            .await
            .map_err(|e| {
                log::error!("[gateway] Fetching informant SMS notifications failed: {}", e);
                GatewayError::ConfigService(
                    "Something went wrong on config service. Couldn't get informantSMSNotification"
                        .to_string(),
                )
            })?;

        let content = self.config_service.get_notification_content(ctx.authorization).await?;
        Ok(attach_messages(notifications, &content))
    }

    pub async fn toggle_informant_sms_notification(
        &self,
        ctx: &ResolverContext<'_>,
        sms_notifications: &[UpdateInformantSmsNotificationItem],
    ) -> Result<Vec<SmsNotification>, GatewayError> {
        ensure_natlsysadmin(ctx.session)?;

        let notifications = self
            .config_service
            .update_informant_sms_notifications(ctx.authorization, sms_notifications)
            .await
            .map_err(|e| {
                log::error!("[gateway] Updating informant SMS notifications failed: {}", e);
                GatewayError::ConfigService(
                    "Something went wrong on config service. Couldn't update informantSMSNotification"
                        .to_string(),
                )
            })?;

        let content = self.config_service.get_notification_content(ctx.authorization).await?;
        Ok(attach_messages(notifications, &content))
    }
}

fn ensure_natlsysadmin(session: &Session) -> Result<(), GatewayError> {
    if session.has_scope(SCOPE_NATLSYSADMIN) {
        Ok(())
    } else {
        Err(GatewayError::Forbidden(
            "Toggle informantSMSNotification is only allowed for natlsysadmin".to_string(),
        ))
    }
}

/// Attach the English message for each notification; unknown names get an empty message
fn attach_messages(
    notifications: Vec<InformantSmsNotification>,
    content: &NotificationContent,
) -> Vec<SmsNotification> {
    let messages = content.messages_for(MESSAGE_LANGUAGE);

    notifications
        .into_iter()
        .map(|notification| {
            let message = NotificationName::from_str(&notification.name)
                .ok()
                .and_then(|name| messages.and_then(|m| m.get(name.resource_key())))
                .cloned()
                .unwrap_or_default();
            SmsNotification { notification, message }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeConfigService {
        notifications: Mutex<Vec<InformantSmsNotification>>,
        fail_status: Option<u16>,
        last_authorization: Mutex<Option<String>>,
    }

    impl FakeConfigService {
        fn new(fail_status: Option<u16>) -> Self {
            let now = Utc::now();
            let notifications = NotificationName::defaults()
                .into_iter()
                .enumerate()
                .map(|(i, name)| InformantSmsNotification {
                    id: (i + 1).to_string(),
                    name,
                    enabled: true,
                    created_at: now,
                    updated_at: now,
                })
                .collect();
            Self {
                notifications: Mutex::new(notifications),
                fail_status,
                last_authorization: Mutex::new(None),
            }
        }

        fn check(&self, authorization: &str) -> Result<(), GatewayError> {
            *self.last_authorization.lock().unwrap() = Some(authorization.to_string());
            match self.fail_status {
                Some(status) => Err(GatewayError::UnexpectedStatus {
                    url: "http://config/informantSMSNotification".to_string(),
                    status,
                }),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl ConfigService for FakeConfigService {
        async fn get_informant_sms_notifications(
            &self,
            authorization: &str,
        ) -> Result<Vec<InformantSmsNotification>, GatewayError> {
            self.check(authorization)?;
            Ok(self.notifications.lock().unwrap().clone())
        }

        async fn update_informant_sms_notifications(
            &self,
            authorization: &str,
            items: &[UpdateInformantSmsNotificationItem],
        ) -> Result<Vec<InformantSmsNotification>, GatewayError> {
            self.check(authorization)?;
            let mut stored = self.notifications.lock().unwrap();
            for item in items {
                if let Some(n) = stored.iter_mut().find(|n| n.id == item.id) {
                    n.name = item.name.clone();
                    if let Some(enabled) = item.enabled {
                        n.enabled = enabled;
                    }
                }
            }
            Ok(stored.clone())
        }

        async fn get_notification_content(
            &self,
            _authorization: &str,
        ) -> Result<NotificationContent, GatewayError> {
            Ok(serde_json::from_value(json!({
                "languages": [
                    { "lang": "fr", "messages": { "birthInProgressNotification": "Bonjour" } },
                    { "lang": "en", "messages": {
                        "birthInProgressNotification": "Your birth declaration is in progress",
                        "deathRejectionNotification": "Your death declaration was rejected"
                    } }
                ]
            }))
            .unwrap())
        }
    }

    fn session(scopes: &[&str]) -> Session {
        Session {
            id: 1,
            token: "token".to_string(),
            user_id: Some("user-1".to_string()),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
            expires_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_query_attaches_english_messages() {
        let service = Arc::new(FakeConfigService::new(None));
        let resolvers = Resolvers::new(service.clone());
        let session = session(&["natlsysadmin"]);
        let ctx = ResolverContext { session: &session, authorization: "Bearer token" };

        let result = resolvers.informant_sms_notifications(&ctx).await.unwrap();
        assert_eq!(result.len(), 8);
        assert_eq!(result[0].message, "Your birth declaration is in progress");
        assert_eq!(result[1].message, "");
        assert_eq!(result[7].message, "Your death declaration was rejected");
        assert_eq!(
            service.last_authorization.lock().unwrap().as_deref(),
            Some("Bearer token")
        );
    }

    #[tokio::test]
    async fn test_requires_natlsysadmin() {
        let resolvers = Resolvers::new(Arc::new(FakeConfigService::new(None)));
        let session = session(&["sysadmin"]);
        let ctx = ResolverContext { session: &session, authorization: "Bearer token" };

        let err = resolvers.informant_sms_notifications(&ctx).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Toggle informantSMSNotification is only allowed for natlsysadmin"
        );
        let err = resolvers.toggle_informant_sms_notification(&ctx, &[]).await.unwrap_err();
        assert!(matches!(err, GatewayError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_config_service_failure_messages() {
        let resolvers = Resolvers::new(Arc::new(FakeConfigService::new(Some(500))));
        let session = session(&["natlsysadmin"]);
        let ctx = ResolverContext { session: &session, authorization: "Bearer token" };

        let err = resolvers.informant_sms_notifications(&ctx).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Something went wrong on config service. Couldn't get informantSMSNotification"
        );
        let err = resolvers.toggle_informant_sms_notification(&ctx, &[]).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Something went wrong on config service. Couldn't update informantSMSNotification"
        );
    }

    #[tokio::test]
    async fn test_execute_toggle_mutation() {
        let resolvers = Resolvers::new(Arc::new(FakeConfigService::new(None)));
        let session = session(&["natlsysadmin"]);
        let ctx = ResolverContext { session: &session, authorization: "Bearer token" };
        let variables = json!({
            "smsNotifications": [{ "id": "1", "name": "birthInProgressSMS", "enabled": false }]
        });

        let (operation, value) = resolvers
            .execute(&ctx, "toggleInformantSMSNotification", &variables)
            .await
            .unwrap();
        assert_eq!(operation, Operation::ToggleInformantSmsNotification);
        assert_eq!(value[0]["enabled"], false);
        assert_eq!(value[0]["message"], "Your birth declaration is in progress");
        assert_eq!(value[1]["enabled"], true);
    }

    #[tokio::test]
    async fn test_execute_rejects_bad_input() {
        let resolvers = Resolvers::new(Arc::new(FakeConfigService::new(None)));
        let session = session(&["natlsysadmin"]);
        let ctx = ResolverContext { session: &session, authorization: "Bearer token" };

        let err = resolvers.execute(&ctx, "searchEvents", &Value::Null).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown operation: searchEvents");

        let err = resolvers
            .execute(&ctx, "toggleInformantSMSNotification", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidVariables(_)));
    }
}
