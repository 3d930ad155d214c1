//! The status record announced through a presence provider

/// One presence announcement. Built once through [`StatusRecordBuilder`] and read-only
/// afterwards; providers receive it by reference and never keep it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    state: String,
    details: String,
    large_image_key: Option<String>,
    large_image_text: String,
    party_id: String,
    join_secret: String,
}

impl StatusRecord {
    pub fn builder() -> StatusRecordBuilder {
        StatusRecordBuilder::default()
    }

    /// Primary activity line
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Secondary detail line
    pub fn details(&self) -> &str {
        &self.details
    }

    /// Asset the caption is attached to, when one is configured
    pub fn large_image_key(&self) -> Option<&str> {
        self.large_image_key.as_deref()
    }

    pub fn large_image_text(&self) -> &str {
        &self.large_image_text
    }

    pub fn party_id(&self) -> &str {
        &self.party_id
    }

    pub fn join_secret(&self) -> &str {
        &self.join_secret
    }

    /// Whether every announced field carries a value. The image key is not counted.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Names of the announced fields that were left empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("state", &self.state),
            ("details", &self.details),
            ("large_image_text", &self.large_image_text),
            ("party_id", &self.party_id),
            ("join_secret", &self.join_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Collects field values for a [`StatusRecord`]. Values are stored exactly as given.
#[derive(Debug, Default)]
pub struct StatusRecordBuilder {
    state: String,
    details: String,
    large_image_key: Option<String>,
    large_image_text: String,
    party_id: String,
    join_secret: String,
}

impl StatusRecordBuilder {
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn large_image_key(mut self, key: impl Into<String>) -> Self {
        self.large_image_key = Some(key.into());
        self
    }

    pub fn large_image_text(mut self, text: impl Into<String>) -> Self {
        self.large_image_text = text.into();
        self
    }

    pub fn party_id(mut self, party_id: impl Into<String>) -> Self {
        self.party_id = party_id.into();
        self
    }

    pub fn join_secret(mut self, secret: impl Into<String>) -> Self {
        self.join_secret = secret.into();
        self
    }

    pub fn build(self) -> StatusRecord {
        StatusRecord {
            state: self.state,
            details: self.details,
            large_image_key: self.large_image_key,
            large_image_text: self.large_image_text,
            party_id: self.party_id,
            join_secret: self.join_secret,
        }
    }
}
