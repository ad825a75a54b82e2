use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operations the gateway resolves, dispatched by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    InformantSmsNotifications,
    ToggleInformantSmsNotification,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InformantSmsNotifications => "informantSMSNotifications",
            Self::ToggleInformantSmsNotification => "toggleInformantSMSNotification",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "informantSMSNotifications" => Some(Self::InformantSmsNotifications),
            "toggleInformantSMSNotification" => Some(Self::ToggleInformantSmsNotification),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    pub operation_name: String,
    #[serde(default)]
    pub variables: Value,
}

/// Response envelope: `data` is always present, `errors` only on failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlResponse {
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQlError>>,
}

impl GraphQlResponse {
    pub fn success(operation: Operation, result: Value) -> Self {
        let mut data = serde_json::Map::new();
        data.insert(operation.as_str().to_string(), result);
        Self {
            data: Some(Value::Object(data)),
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: Some(vec![GraphQlError {
                message: message.into(),
            }]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}
