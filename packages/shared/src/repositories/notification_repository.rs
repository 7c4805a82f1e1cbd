use async_trait::async_trait;
use aws_sdk_apigatewaymanagement::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use tracing::info;

use crate::models::notice::MatchFoundNotice;
use crate::repositories::errors::notification_errors::NotificationError;

/// Fire-and-forget delivery of match notices. Invoked after a match
/// commits, outside the transaction; a failure never unwinds the match.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn enqueue(
        &self,
        recipient_id: &str,
        notice: &MatchFoundNotice,
    ) -> Result<(), NotificationError>;
}

/// Pushes notices over the WebSocket connection registered for a player.
/// A player with no live connection is skipped, not an error.
pub struct WebSocketNotificationSink {
    dynamodb_client: DynamoDbClient,
    connections_table: String,
    endpoint: String,
}

impl WebSocketNotificationSink {
    pub fn new(dynamodb_client: DynamoDbClient) -> Self {
        let connections_table = std::env::var("PLAYER_CONNECTIONS_TABLE")
            .expect("PLAYER_CONNECTIONS_TABLE environment variable must be set");
        let endpoint = std::env::var("WEBSOCKET_API_ENDPOINT")
            .expect("WEBSOCKET_API_ENDPOINT environment variable must be set");
        Self {
            dynamodb_client,
            connections_table,
            endpoint,
        }
    }

    async fn get_connection_id(
        &self,
        player_id: &str,
    ) -> Result<Option<String>, NotificationError> {
        let result = self
            .dynamodb_client
            .get_item()
            .table_name(&self.connections_table)
            .key("player_id", AttributeValue::S(player_id.to_string()))
            .send()
            .await
            .map_err(|e| NotificationError::DynamoDb(e.to_string()))?;

        if let Some(item) = result.item {
            if let Some(AttributeValue::S(connection_id)) = item.get("connection_id") {
                return Ok(Some(connection_id.clone()));
            }
        }

        Ok(None)
    }

    async fn post_to_connection(
        &self,
        connection_id: &str,
        data: String,
    ) -> Result<(), NotificationError> {
        // The management API needs the WebSocket stage endpoint, so the
        // client is built per send against the configured URL.
        let config = aws_config::load_from_env().await;
        let api_gateway_config = aws_sdk_apigatewaymanagement::config::Builder::from(&config)
            .endpoint_url(&self.endpoint)
            .build();
        let api_gateway_client =
            aws_sdk_apigatewaymanagement::Client::from_conf(api_gateway_config);

        api_gateway_client
            .post_to_connection()
            .connection_id(connection_id)
            .data(Blob::new(data))
            .send()
            .await
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl NotificationSink for WebSocketNotificationSink {
    async fn enqueue(
        &self,
        recipient_id: &str,
        notice: &MatchFoundNotice,
    ) -> Result<(), NotificationError> {
        let connection_id = match self.get_connection_id(recipient_id).await? {
            Some(connection_id) => connection_id,
            None => {
                info!(
                    "Player {} is not connected, skipping notification",
                    recipient_id
                );
                return Ok(());
            }
        };

        let data = serde_json::to_string(notice)
            .map_err(|e| NotificationError::Serialization(e.to_string()))?;

        self.post_to_connection(&connection_id, data).await?;

        info!(
            "Sent match notice for match {} to player {}",
            notice.match_id, recipient_id
        );
        Ok(())
    }
}
