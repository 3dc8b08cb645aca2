//! Usage: Current-user projection returned by `GET /auth/me`.

use serde::Serialize;
use serde_json::Value;

const FALLBACK_DISPLAY_NAME: &str = "User";

/// A role as the backend sends it: either a bare string or a record with `role`/`name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RoleDescriptor {
    Label(String),
    Record {
        role: Option<String>,
        name: Option<String>,
    },
}

impl RoleDescriptor {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Label(s.clone())),
            Value::Object(map) => Some(Self::Record {
                role: map.get("role").and_then(non_empty_str),
                name: map.get("name").and_then(non_empty_str),
            }),
            _ => None,
        }
    }

    /// Display label: `role`, else `name`, else the bare string.
    pub fn label(&self) -> &str {
        match self {
            Self::Label(label) => label.as_str(),
            Self::Record { role, name } => role
                .as_deref()
                .or(name.as_deref())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<RoleDescriptor>,
}

impl User {
    /// Build a user from a JSON record. Requires a non-empty `email`; every other field
    /// is lenient (`id` may be a string or a number, missing fields become empty).
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let email = map.get("email").and_then(non_empty_str)?;

        let id = match map.get("id") {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let name = map
            .get("name")
            .and_then(non_empty_str)
            .unwrap_or_default();
        let roles = map
            .get("roles")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(RoleDescriptor::from_value).collect())
            .unwrap_or_default();

        Some(Self {
            id,
            name,
            email,
            roles,
        })
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            FALLBACK_DISPLAY_NAME
        } else {
            self.name.as_str()
        }
    }

    /// Uppercase first letter of the name, for avatar placeholders.
    pub fn initial(&self) -> Option<char> {
        self.name
            .trim()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
    }

    pub fn role_labels(&self) -> Vec<&str> {
        self.roles
            .iter()
            .map(RoleDescriptor::label)
            .filter(|label| !label.is_empty())
            .collect()
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
