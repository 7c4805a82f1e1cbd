use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_attribute_value};

use crate::models::user::UserProfile;
use crate::repositories::errors::profile_repository_errors::ProfileRepositoryError;

#[cfg(test)]
use mockall::automock;

/// Read-only lookup against the user-profile store, used once per ticket
/// creation to build the denormalized snapshot.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, ProfileRepositoryError>;
}

pub struct DynamoDbProfileRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbProfileRepository {
    pub fn new(client: Client) -> Self {
        let table_name = std::env::var("PROFILES_TABLE")
            .expect("PROFILES_TABLE environment variable must be set");
        Self { client, table_name }
    }
}

#[async_trait]
impl ProfileRepository for DynamoDbProfileRepository {
    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, ProfileRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(
                "id",
                to_attribute_value(user_id)
                    .map_err(|e| ProfileRepositoryError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| ProfileRepositoryError::DynamoDb(e.to_string()))?;

        if let Some(item) = output.item {
            let profile: UserProfile = from_item(item)
                .map_err(|e| ProfileRepositoryError::Serialization(e.to_string()))?;
            Ok(profile)
        } else {
            Err(ProfileRepositoryError::NotFound)
        }
    }
}
