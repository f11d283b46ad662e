//! `WWW-Authenticate` header construction for 401 responses (spec.md
//! §4.13), pointing the client at the protected-resource metadata document
//! per RFC 9728 §5.1.

/// Parameters for a `Bearer` challenge. `resource_metadata` is mandatory;
/// the rest are included only when present.
#[derive(Debug, Default, Clone)]
pub struct BearerChallenge {
    pub resource_metadata: String,
    pub realm: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub scope: Option<String>,
}

impl BearerChallenge {
    #[must_use]
    pub fn new(resource_metadata: impl Into<String>) -> Self {
        Self { resource_metadata: resource_metadata.into(), ..Default::default() }
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>, description: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self.error_description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Render as the value of a `WWW-Authenticate` header.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        let mut parts = vec![format!(r#"resource_metadata="{}""#, self.resource_metadata)];
        if let Some(realm) = &self.realm {
            parts.push(format!(r#"realm="{realm}""#));
        }
        if let Some(error) = &self.error {
            parts.push(format!(r#"error="{error}""#));
        }
        if let Some(description) = &self.error_description {
            parts.push(format!(r#"error_description="{description}""#));
        }
        if let Some(scope) = &self.scope {
            parts.push(format!(r#"scope="{scope}""#));
        }
        format!("Bearer {}", parts.join(", "))
    }
}
