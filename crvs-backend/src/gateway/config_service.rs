//! HTTP client for the config and country config services
//!
//! The gateway never touches the store directly; every resolver goes through
//! a `ConfigService`, forwarding the caller's `Authorization` header.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use super::GatewayError;
use crate::models::{InformantSmsNotification, UpdateInformantSmsNotificationItem};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Notification content published by the country config service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationContent {
    #[serde(default)]
    pub languages: Vec<LanguageMessages>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageMessages {
    pub lang: String,
    #[serde(default)]
    pub messages: HashMap<String, String>,
}

impl NotificationContent {
    pub fn messages_for(&self, lang: &str) -> Option<&HashMap<String, String>> {
        self.languages
            .iter()
            .find(|item| item.lang == lang)
            .map(|item| &item.messages)
    }
}

#[async_trait]
pub trait ConfigService: Send + Sync {
    async fn get_informant_sms_notifications(
        &self,
        authorization: &str,
    ) -> Result<Vec<InformantSmsNotification>, GatewayError>;

    async fn update_informant_sms_notifications(
        &self,
        authorization: &str,
        notifications: &[UpdateInformantSmsNotificationItem],
    ) -> Result<Vec<InformantSmsNotification>, GatewayError>;

    async fn get_notification_content(
        &self,
        authorization: &str,
    ) -> Result<NotificationContent, GatewayError>;
}

/// `ConfigService` over HTTP with reqwest
pub struct HttpConfigService {
    client: Client,
    application_config_url: Url,
    country_config_url: Url,
}

impl HttpConfigService {
    pub fn new(application_config_url: &str, country_config_url: &str) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GatewayError::Http {
                url: application_config_url.to_string(),
                source: e,
            })?;

        Ok(Self {
            client,
            application_config_url: Url::parse(application_config_url)?,
            country_config_url: Url::parse(country_config_url)?,
        })
    }

    fn notifications_url(&self) -> Result<Url, GatewayError> {
        Ok(self.application_config_url.join("/informantSMSNotification")?)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        url: &Url,
        response: reqwest::Response,
        expected: StatusCode,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if status != expected {
            return Err(GatewayError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.json::<T>().await.map_err(|e| GatewayError::Http {
            url: url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl ConfigService for HttpConfigService {
    async fn get_informant_sms_notifications(
        &self,
        authorization: &str,
    ) -> Result<Vec<InformantSmsNotification>, GatewayError> {
        let url = self.notifications_url()?;
        let response = self
            .client
            .get(url.clone())
            .header("Content-type", "application/json")
            .header("Authorization", authorization)
            .send()
            .await
            .map_err(|e| GatewayError::Http { url: url.to_string(), source: e })?;

        Self::read_json(&url, response, StatusCode::OK).await
    }

    async fn update_informant_sms_notifications(
        &self,
        authorization: &str,
        notifications: &[UpdateInformantSmsNotificationItem],
    ) -> Result<Vec<InformantSmsNotification>, GatewayError> {
        let url = self.notifications_url()?;
        let response = self
            .client
            .put(url.clone())
            .header("Authorization", authorization)
            .json(notifications)
            .send()
            .await
            .map_err(|e| GatewayError::Http { url: url.to_string(), source: e })?;

        Self::read_json(&url, response, StatusCode::CREATED).await
    }

    async fn get_notification_content(
        &self,
        authorization: &str,
    ) -> Result<NotificationContent, GatewayError> {
        let url = self.country_config_url.join("/content/notification")?;
        let response = self
            .client
            .get(url.clone())
            .header("Content-type", "application/json")
            .header("Authorization", authorization)
            .send()
            .await
            .map_err(|e| GatewayError::Http { url: url.to_string(), source: e })?;

        Self::read_json(&url, response, StatusCode::OK).await
    }
}
