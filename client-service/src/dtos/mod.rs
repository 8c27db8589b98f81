use serde::Deserialize;

pub use service_core::clients::ClientResponse;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequest {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    /// ISO date, `YYYY-MM-DD`.
    pub birth_date: Option<String>,
}
