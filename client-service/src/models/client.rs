use chrono::NaiveDate;
use service_core::clients::{ClientResponse, DocumentType};
use service_core::pagination::SortKeys;
use sqlx::FromRow;

pub const CLIENT_SORT_KEYS: SortKeys = &[
    ("id", "id"),
    ("givenName", "given_name"),
    ("familyName", "family_name"),
    ("documentNumber", "document_number"),
    ("birthDate", "birth_date"),
];

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Client {
    pub id: i64,
    pub given_name: String,
    pub family_name: String,
    pub document_type: String,
    pub document_number: String,
    pub birth_date: NaiveDate,
}

impl Client {
    /// Rows are constrained to known types; anything else reads as DNI.
    pub fn document_type(&self) -> DocumentType {
        self.document_type.parse().unwrap_or(DocumentType::Dni)
    }
}

impl From<Client> for ClientResponse {
    fn from(c: Client) -> Self {
        let document_type = c.document_type();
        Self {
            id: c.id,
            given_name: c.given_name,
            family_name: c.family_name,
            document_type,
            document_number: c.document_number,
            birth_date: c.birth_date,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewClient {
    pub given_name: String,
    pub family_name: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub birth_date: NaiveDate,
}
