use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scope held by national system administrators
pub const SCOPE_NATLSYSADMIN: &str = "natlsysadmin";
/// Scope held by office-level system administrators
pub const SCOPE_SYSADMIN: &str = "sysadmin";
pub const SCOPE_REGISTER: &str = "register";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub token: String,
    pub user_id: Option<String>,
    pub scopes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    pub fn has_any_scope(&self, scopes: &[&str]) -> bool {
        scopes.iter().any(|scope| self.has_scope(scope))
    }
}

/// Scopes are stored as a comma separated column
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scopes_skips_blanks() {
        assert_eq!(
            parse_scopes("natlsysadmin, register,,"),
            vec!["natlsysadmin".to_string(), "register".to_string()]
        );
        assert!(parse_scopes("").is_empty());
    }

    #[test]
    fn test_has_any_scope() {
        let session = Session {
            id: 1,
            token: "t".to_string(),
            user_id: None,
            scopes: vec![SCOPE_SYSADMIN.to_string()],
            created_at: Utc::now(),
            expires_at: Utc::now(),
        };
        assert!(session.has_any_scope(&[SCOPE_NATLSYSADMIN, SCOPE_SYSADMIN]));
        assert!(!session.has_scope(SCOPE_NATLSYSADMIN));
    }
}
