//! Inbound notification payload.
//!
//! Captures the merged query and form fields of a notification request, the
//! optional `DATA` JSON blob, and the address the request came from. The
//! payload is immutable once built.

use std::collections::BTreeMap;

/// Name of the field carrying the Notify channel's JSON document.
pub const DATA_FIELD: &str = "DATA";

/// Raw key/value data received from the processor or the paying browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundPayload {
    fields: BTreeMap<String, String>,
    client_ip: String,
}

impl InboundPayload {
    /// Builds a payload from query and form fields.
    ///
    /// Form values win over query values with the same name.
    pub fn new<Q, F>(query: Q, form: F, client_ip: impl Into<String>) -> Self
    where
        Q: IntoIterator<Item = (String, String)>,
        F: IntoIterator<Item = (String, String)>,
    {
        let mut fields: BTreeMap<String, String> = query.into_iter().collect();
        fields.extend(form);

        Self {
            fields,
            client_ip: client_ip.into(),
        }
    }

    /// Builds a payload from a single field set.
    pub fn from_fields<I>(fields: I, client_ip: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::new(fields, std::iter::empty(), client_ip)
    }

    /// Looks up a named field across the merged query and form data.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Looks up a named field, treating absence as the empty string.
    pub fn get_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    /// The `DATA` blob, if present and non-empty.
    pub fn notify_data(&self) -> Option<&str> {
        self.get(DATA_FIELD).filter(|data| !data.is_empty())
    }

    /// Network address of the caller.
    pub fn client_ip(&self) -> &str {
        &self.client_ip
    }

    /// All merged fields.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}
