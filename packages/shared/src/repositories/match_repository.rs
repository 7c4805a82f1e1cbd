use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::{Put, TransactWriteItem, Update};
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_attribute_value, to_item};

use crate::models::game_match::Match;
use crate::models::ticket::TicketStatus;
use crate::repositories::errors::match_repository_errors::MatchRepositoryError;

/// Match store plus the transactional commit that converts a ticket pair
/// into a match.
#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn get_match(&self, match_id: &str) -> Result<Match, MatchRepositoryError>;

    /// Atomically persists the match and flips both referenced tickets from
    /// active to matched. Returns `Ok(false)` without writing anything when
    /// either ticket was no longer active, which is how a racing caller
    /// loses gracefully.
    async fn commit_match(&self, game_match: &Match) -> Result<bool, MatchRepositoryError>;
}

pub struct DynamoDbMatchRepository {
    pub client: Client,
    pub matches_table: String,
    pub tickets_table: String,
}

impl DynamoDbMatchRepository {
    pub fn new(client: Client) -> Self {
        let matches_table = std::env::var("MATCHES_TABLE")
            .expect("MATCHES_TABLE environment variable must be set");
        let tickets_table = std::env::var("TICKETS_TABLE")
            .expect("TICKETS_TABLE environment variable must be set");
        Self {
            client,
            matches_table,
            tickets_table,
        }
    }

    fn claim_ticket_update(
        &self,
        ticket_id: &str,
        match_id: &str,
    ) -> Result<TransactWriteItem, MatchRepositoryError> {
        let update = Update::builder()
            .table_name(&self.tickets_table)
            .key(
                "id",
                to_attribute_value(ticket_id)
                    .map_err(|e| MatchRepositoryError::Serialization(e.to_string()))?,
            )
            .update_expression("SET #status = :matched, match_id = :match_id")
            .condition_expression("#status = :active")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(
                ":matched",
                to_attribute_value(TicketStatus::Matched)
                    .map_err(|e| MatchRepositoryError::Serialization(e.to_string()))?,
            )
            .expression_attribute_values(
                ":active",
                to_attribute_value(TicketStatus::Active)
                    .map_err(|e| MatchRepositoryError::Serialization(e.to_string()))?,
            )
            .expression_attribute_values(
                ":match_id",
                to_attribute_value(match_id)
                    .map_err(|e| MatchRepositoryError::Serialization(e.to_string()))?,
            )
            .build()
            .map_err(|e| MatchRepositoryError::TransactionError(e.to_string()))?;

        Ok(TransactWriteItem::builder().update(update).build())
    }
}

#[async_trait]
impl MatchRepository for DynamoDbMatchRepository {
    async fn get_match(&self, match_id: &str) -> Result<Match, MatchRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.matches_table)
            .key(
                "id",
                to_attribute_value(match_id)
                    .map_err(|e| MatchRepositoryError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| MatchRepositoryError::DynamoDb(e.to_string()))?;

        if let Some(item) = output.item {
            let game_match: Match = from_item(item)
                .map_err(|e| MatchRepositoryError::Serialization(e.to_string()))?;
            Ok(game_match)
        } else {
            Err(MatchRepositoryError::NotFound)
        }
    }

    async fn commit_match(&self, game_match: &Match) -> Result<bool, MatchRepositoryError> {
        let match_item =
            to_item(game_match).map_err(|e| MatchRepositoryError::Serialization(e.to_string()))?;

        let put_match = TransactWriteItem::builder()
            .put(
                Put::builder()
                    .table_name(&self.matches_table)
                    .set_item(Some(match_item))
                    .build()
                    .map_err(|e| MatchRepositoryError::TransactionError(e.to_string()))?,
            )
            .build();

        let transaction_items = vec![
            put_match,
            self.claim_ticket_update(&game_match.ticket1_id, &game_match.id)?,
            self.claim_ticket_update(&game_match.ticket2_id, &game_match.id)?,
        ];

        let result = self
            .client
            .transact_write_items()
            .set_transact_items(Some(transaction_items))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => {
                // A cancelled transaction means a condition check failed:
                // one of the tickets left the active state first.
                if let SdkError::ServiceError(service_err) = &e {
                    if service_err.err().is_transaction_canceled_exception() {
                        return Ok(false);
                    }
                }
                Err(MatchRepositoryError::TransactionError(e.to_string()))
            }
        }
    }
}
