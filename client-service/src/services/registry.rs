use chrono::{NaiveDate, Utc};
use service_core::clients::DocumentType;
use service_core::pagination::{Page, Paging};
use service_core::utils::{is_blank, is_valid_national_id};
use std::sync::Arc;
use tracing::{info, instrument};

use super::error::ClientError;
use super::metrics::{record_client_registered, record_lookup};
use super::repository::ClientRepository;
use crate::dtos::ClientRequest;
use crate::models::{CLIENT_SORT_KEYS, Client, NewClient};

#[derive(Clone)]
pub struct ClientService {
    repo: Arc<dyn ClientRepository>,
}

fn parse_document_type(raw: Option<&str>) -> Result<DocumentType, ClientError> {
    raw.filter(|s| !s.trim().is_empty())
        .and_then(|s| s.parse().ok())
        .ok_or(ClientError::InvalidDocumentType)
}

/// Every document number, passport included, follows the eight-character national format.
fn validate_document_number(raw: Option<&str>) -> Result<String, ClientError> {
    raw.map(str::trim)
        .filter(|s| is_valid_national_id(s))
        .map(str::to_string)
        .ok_or(ClientError::InvalidDocumentNumber)
}

fn parse_birth_date(raw: Option<&str>) -> Result<NaiveDate, ClientError> {
    let date = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .ok_or(ClientError::InvalidBirthDate)?;

    if date > Utc::now().date_naive() {
        return Err(ClientError::InvalidBirthDate);
    }
    Ok(date)
}

impl ClientService {
    pub fn new(repo: Arc<dyn ClientRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, request))]
    pub async fn add_client(&self, request: &ClientRequest) -> Result<Client, ClientError> {
        if is_blank(request.given_name.as_deref()) {
            return Err(ClientError::InvalidName);
        }
        if is_blank(request.family_name.as_deref()) {
            return Err(ClientError::InvalidLastName);
        }
        let document_type = parse_document_type(request.document_type.as_deref())?;
        let document_number = validate_document_number(request.document_number.as_deref())?;
        let birth_date = parse_birth_date(request.birth_date.as_deref())?;

        if self.repo.document_exists(&document_number).await? {
            return Err(ClientError::DocumentNumberExists);
        }

        let client = self
            .repo
            .insert(NewClient {
                given_name: request.given_name.as_deref().unwrap_or_default().trim().to_string(),
                family_name: request.family_name.as_deref().unwrap_or_default().trim().to_string(),
                document_type,
                document_number,
                birth_date,
            })
            .await?;

        record_client_registered();
        info!(client_id = client.id, "Client registered");
        Ok(client)
    }

    #[instrument(skip(self))]
    pub async fn get_client(&self, id: i64) -> Result<Client, ClientError> {
        if id <= 0 {
            return Err(ClientError::InvalidId);
        }
        match self.repo.find_by_id(id).await? {
            Some(client) => {
                record_lookup("found");
                Ok(client)
            }
            None => {
                record_lookup("missing");
                Err(ClientError::NotFound)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get_by_document(
        &self,
        document_number: &str,
        document_type: &str,
    ) -> Result<Client, ClientError> {
        let document_number = validate_document_number(Some(document_number))?;
        parse_document_type(Some(document_type))?;

        self.repo
            .find_by_document(&document_number)
            .await?
            .ok_or(ClientError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn list_clients(&self, paging: &Paging) -> Result<Page<Client>, ClientError> {
        let request = paging.validate(CLIENT_SORT_KEYS)?;
        let (items, total) = self.repo.list(&request).await?;
        Ok(Page::new(items, &request, total))
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        self.repo.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryClientRepository;

    fn request(document_number: &str) -> ClientRequest {
        ClientRequest {
            given_name: Some("Ana".into()),
            family_name: Some("Torres".into()),
            document_type: Some("DNI".into()),
            document_number: Some(document_number.into()),
            birth_date: Some("1990-04-02".into()),
        }
    }

    fn service() -> ClientService {
        ClientService::new(Arc::new(InMemoryClientRepository::new()))
    }

    #[tokio::test]
    async fn short_document_number_is_rejected() {
        let err = service().add_client(&request("1234")).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidDocumentNumber));
    }

    #[tokio::test]
    async fn eight_digit_document_number_is_accepted() {
        let client = service().add_client(&request("12345678")).await.unwrap();
        assert_eq!(client.document_number, "12345678");
        assert_eq!(client.document_type(), DocumentType::Dni);
    }

    #[tokio::test]
    async fn separators_count_toward_the_eight_characters() {
        let client = service().add_client(&request("1234-567")).await.unwrap();
        assert_eq!(client.document_number, "1234-567");

        let err = service().add_client(&request("1234567X")).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidDocumentNumber));
    }

    #[tokio::test]
    async fn duplicate_document_number_is_rejected() {
        let service = service();
        service.add_client(&request("12345678")).await.unwrap();
        let err = service.add_client(&request("12345678")).await.unwrap_err();
        assert!(matches!(err, ClientError::DocumentNumberExists));
    }

    #[tokio::test]
    async fn fields_are_checked_in_order() {
        let service = service();

        let mut blank_name = request("12345678");
        blank_name.given_name = Some("  ".into());
        blank_name.document_type = None;
        assert!(matches!(
            service.add_client(&blank_name).await.unwrap_err(),
            ClientError::InvalidName
        ));

        let mut no_family = request("12345678");
        no_family.family_name = None;
        assert!(matches!(
            service.add_client(&no_family).await.unwrap_err(),
            ClientError::InvalidLastName
        ));

        let mut bad_type = request("12345678");
        bad_type.document_type = Some("LICENSE".into());
        assert!(matches!(
            service.add_client(&bad_type).await.unwrap_err(),
            ClientError::InvalidDocumentType
        ));
    }

    #[tokio::test]
    async fn future_or_malformed_birth_date_is_rejected() {
        let service = service();

        let mut future = request("12345678");
        future.birth_date = Some("2999-01-01".into());
        assert!(matches!(
            service.add_client(&future).await.unwrap_err(),
            ClientError::InvalidBirthDate
        ));

        let mut malformed = request("12345678");
        malformed.birth_date = Some("02/04/1990".into());
        assert!(matches!(
            service.add_client(&malformed).await.unwrap_err(),
            ClientError::InvalidBirthDate
        ));
    }

    #[tokio::test]
    async fn lookup_by_id_and_document() {
        let service = service();
        let created = service.add_client(&request("87654321")).await.unwrap();

        assert_eq!(service.get_client(created.id).await.unwrap(), created);
        assert!(matches!(
            service.get_client(0).await.unwrap_err(),
            ClientError::InvalidId
        ));
        assert!(matches!(
            service.get_client(99).await.unwrap_err(),
            ClientError::NotFound
        ));

        let by_document = service.get_by_document("87654321", "DNI").await.unwrap();
        assert_eq!(by_document.id, created.id);
    }
}
