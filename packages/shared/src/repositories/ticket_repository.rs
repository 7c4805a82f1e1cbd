use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use serde_dynamo::{from_item, to_attribute_value, to_item};

use crate::models::ticket::{Ticket, TicketStatus};
use crate::repositories::errors::ticket_repository_errors::TicketRepositoryError;

/// Keyed ticket store. Status writes are compare-and-swap against `active`,
/// which is the only serialization mechanism the engine relies on: a `false`
/// return means the ticket reached a terminal state first and nothing was
/// written.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn put_ticket(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError>;

    async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket, TicketRepositoryError>;

    async fn find_active_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<Ticket>, TicketRepositoryError>;

    /// Oldest-first batch of active, not-yet-due tickets, capped at `limit`.
    async fn list_active(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Ticket>, TicketRepositoryError>;

    /// Active, not-yet-due tickets sharing one bucket key, oldest first.
    async fn list_active_in_bucket(
        &self,
        bucket: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, TicketRepositoryError>;

    /// Active tickets whose deadline has passed, oldest first, capped at
    /// `limit`.
    async fn list_expired(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Ticket>, TicketRepositoryError>;

    /// Compare-and-swap active -> cancelled.
    async fn cancel_ticket(
        &self,
        ticket_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, TicketRepositoryError>;

    /// Compare-and-swap active -> expired.
    async fn expire_ticket(
        &self,
        ticket_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, TicketRepositoryError>;
}

pub struct DynamoDbTicketRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbTicketRepository {
    pub fn new(client: Client) -> Self {
        let table_name = std::env::var("TICKETS_TABLE")
            .expect("TICKETS_TABLE environment variable must be set");
        Self { client, table_name }
    }

    async fn swap_active_status(
        &self,
        ticket_id: &str,
        new_status: TicketStatus,
        timestamp_attribute: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, TicketRepositoryError> {
        let update_result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(
                "id",
                to_attribute_value(ticket_id)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?,
            )
            .update_expression(format!(
                "SET #status = :new_status, {} = :now",
                timestamp_attribute
            ))
            .condition_expression("#status = :active")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(
                ":new_status",
                to_attribute_value(new_status)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?,
            )
            .expression_attribute_values(
                ":active",
                to_attribute_value(TicketStatus::Active)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?,
            )
            .expression_attribute_values(
                ":now",
                to_attribute_value(now)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?,
            )
            .send()
            .await;

        match update_result {
            Ok(_) => Ok(true),
            Err(e) => {
                if let SdkError::ServiceError(service_err) = &e {
                    if service_err.err().is_conditional_check_failed_exception() {
                        return Ok(false);
                    }
                }
                Err(TicketRepositoryError::DynamoDb(e.to_string()))
            }
        }
    }

    fn parse_items(
        items: Option<Vec<std::collections::HashMap<String, aws_sdk_dynamodb::types::AttributeValue>>>,
    ) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let mut tickets = Vec::new();
        if let Some(items) = items {
            for item in items {
                let ticket: Ticket = from_item(item)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?;
                tickets.push(ticket);
            }
        }
        Ok(tickets)
    }
}

#[async_trait]
impl TicketRepository for DynamoDbTicketRepository {
    async fn put_ticket(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError> {
        let item =
            to_item(ticket).map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| TicketRepositoryError::DynamoDb(e.to_string()))?;
        Ok(())
    }

    async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket, TicketRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(
                "id",
                to_attribute_value(ticket_id)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| TicketRepositoryError::DynamoDb(e.to_string()))?;

        if let Some(item) = output.item {
            let ticket: Ticket = from_item(item)
                .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?;
            Ok(ticket)
        } else {
            Err(TicketRepositoryError::NotFound)
        }
    }

    async fn find_active_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<Ticket>, TicketRepositoryError> {
        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name("GSI_TicketsByUser")
            .key_condition_expression("user_id = :user_id")
            .filter_expression("#status = :active")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(
                ":user_id",
                to_attribute_value(user_id)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?,
            )
            .expression_attribute_values(
                ":active",
                to_attribute_value(TicketStatus::Active)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| TicketRepositoryError::DynamoDb(e.to_string()))?;

        Ok(Self::parse_items(output.items)?.into_iter().next())
    }

    async fn list_active(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name("GSI_TicketsByStatus")
            .key_condition_expression("#status = :active")
            .filter_expression("expires_at > :now")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(
                ":active",
                to_attribute_value(TicketStatus::Active)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?,
            )
            .expression_attribute_values(
                ":now",
                to_attribute_value(now)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?,
            )
            .limit(limit as i32)
            .send()
            .await
            .map_err(|e| TicketRepositoryError::DynamoDb(e.to_string()))?;

        Self::parse_items(output.items)
    }

    async fn list_active_in_bucket(
        &self,
        bucket: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name("GSI_TicketsByBucket")
            .key_condition_expression("bucket = :bucket")
            .filter_expression("#status = :active AND expires_at > :now")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(
                ":bucket",
                to_attribute_value(bucket)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?,
            )
            .expression_attribute_values(
                ":active",
                to_attribute_value(TicketStatus::Active)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?,
            )
            .expression_attribute_values(
                ":now",
                to_attribute_value(now)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| TicketRepositoryError::DynamoDb(e.to_string()))?;

        Self::parse_items(output.items)
    }

    async fn list_expired(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name("GSI_TicketsByStatus")
            .key_condition_expression("#status = :active")
            .filter_expression("expires_at <= :now")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(
                ":active",
                to_attribute_value(TicketStatus::Active)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?,
            )
            .expression_attribute_values(
                ":now",
                to_attribute_value(now)
                    .map_err(|e| TicketRepositoryError::Serialization(e.to_string()))?,
            )
            .limit(limit as i32)
            .send()
            .await
            .map_err(|e| TicketRepositoryError::DynamoDb(e.to_string()))?;

        Self::parse_items(output.items)
    }

    async fn cancel_ticket(
        &self,
        ticket_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, TicketRepositoryError> {
        self.swap_active_status(ticket_id, TicketStatus::Cancelled, "cancelled_at", now)
            .await
    }

    async fn expire_ticket(
        &self,
        ticket_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, TicketRepositoryError> {
        self.swap_active_status(ticket_id, TicketStatus::Expired, "expired_at", now)
            .await
    }
}
