//! # Pub/Sub Flow
//!
//! Topic lifecycle through the client façade: one shared event
//! subscription, per-topic handlers, and teardown with the last topic.

#[cfg(test)]
mod tests {
    use crate::helpers::{healthy_mock, mock_client};
    use bc_02_pubsub::{DispatchOutcome, PUBSUB_EVENT};
    use blade_client::{handler, PubSubMessage};
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_topics_share_one_event_subscription() -> anyhow::Result<()> {
        let mock = healthy_mock();
        let client = mock_client(&mock)?;
        let (tx, mut rx) = mpsc::unbounded_channel();

        let forward = handler(move |msg: PubSubMessage| {
            let _ = tx.send(msg);
        });
        client.pubsub().subscribe("scores", Some(forward)).await?;
        client.pubsub().subscribe("scores", None).await?;
        client.pubsub().subscribe("chat", None).await?;

        assert_eq!(mock.calls_to("rpc.on"), vec![json!([PUBSUB_EVENT])]);
        assert_eq!(
            mock.calls_to("ipfs_pubsub_subscribe"),
            vec![json!(["scores"]), json!(["chat"])]
        );

        mock.emit(PUBSUB_EVENT, json!({"topic": "chat", "payload": "hi"}));
        mock.emit(PUBSUB_EVENT, json!({"topic": "scores", "payload": {"p1": 3}}));
        let msg = timeout(Duration::from_secs(1), rx.recv()).await?;
        assert_eq!(msg, Some(PubSubMessage::new("scores", json!({"p1": 3}))));

        assert_eq!(
            client.pubsub().dispatch(PubSubMessage::new("chat", json!(1))),
            DispatchOutcome::Unhandled
        );

        client.pubsub().unsubscribe("scores").await?;
        assert!(mock.calls_to("rpc.off").is_empty());
        client.pubsub().unsubscribe("chat").await?;
        assert_eq!(mock.calls_to("rpc.off"), vec![json!([PUBSUB_EVENT])]);
        assert_eq!(
            client.pubsub().dispatch(PubSubMessage::new("scores", json!(1))),
            DispatchOutcome::Dropped
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_publish_without_subscription() -> anyhow::Result<()> {
        let mock = healthy_mock();
        let client = mock_client(&mock)?;

        client.pubsub().publish("scores", json!({"p1": 4})).await?;
        assert_eq!(
            mock.calls_to("ipfs_pubsub_publish"),
            vec![json!(["scores", {"p1": 4}])]
        );
        assert!(mock.calls_to("rpc.on").is_empty());
        Ok(())
    }
}
