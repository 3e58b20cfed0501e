//! # WebSocket Node Flow
//!
//! The full client over a real WebSocket connection: config on disk,
//! connect, startup sequence, a queued call, storage reads and pushed
//! events.

#[cfg(test)]
mod tests {
    use crate::helpers::{ScriptedNode, ACCOUNT, APP};
    use bc_02_pubsub::PUBSUB_EVENT;
    use blade_client::{
        handler, BladeClient, BladeError, ClientConfig, ContractCall, Receipt, SYNC_TOKENS_EVENT,
    };
    use serde_json::{json, Value};
    use shared_rpc::RpcError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn answers() -> HashMap<String, Value> {
        [
            ("full_checks", json!({"geth": true, "ipfs": true})),
            ("newApp", json!(true)),
            ("accounts", json!([ACCOUNT])),
            ("canUseAccount", json!({ACCOUNT: true})),
            ("getTkObj", json!({"job": "roll"})),
            ("processJobs", json!("Q-9")),
            ("getReceipts", json!([{"status": "0x1"}])),
            ("ipfs_read", json!({"type": "Buffer", "data": [104, 105]})),
            ("rpc.on", json!(true)),
            ("ipfs_pubsub_subscribe", json!(true)),
        ]
        .into_iter()
        .map(|(method, result)| (method.to_string(), result))
        .collect()
    }

    async fn connect(node: &ScriptedNode) -> anyhow::Result<BladeClient> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("blade.json");
        std::fs::write(
            &path,
            json!({
                "appName": APP,
                "version": "1.0",
                "contracts": [{"ctrName": "Dice", "conditions": ["Sanity"]}]
            })
            .to_string(),
        )?;

        let port = node.port()?.to_string();
        let config = ClientConfig::load(&path, |key| match key {
            "BLADE_RPC_PORT" => Some(port.clone()),
            _ => None,
        })?;
        Ok(BladeClient::connect(config).await?)
    }

    #[tokio::test]
    async fn test_startup_and_queued_call() -> anyhow::Result<()> {
        let mut node = ScriptedNode::spawn(answers()).await?;
        let client = connect(&node).await?;

        let registered = client.init().await?;
        assert_eq!(registered, vec![json!(true)]);
        assert_eq!(client.accounts().await?[0].to_hex(), ACCOUNT);
        assert!(client.link_account(ACCOUNT).await?);

        let queue = client.send(ContractCall::new("Dice", "roll").arg(6)).await?;
        assert_eq!(queue.as_value(), &json!("Q-9"));
        assert!(matches!(client.poll_receipt(&queue).await?, Receipt::Ready(_)));
        assert_eq!(client.ipfs_read_text("QmHash").await?, "hi");

        let methods: Vec<String> = node
            .drain_requests()
            .iter()
            .filter_map(|r| r["method"].as_str().map(str::to_string))
            .collect();
        assert_eq!(
            methods,
            vec![
                "full_checks",
                "newApp",
                "accounts",
                "canUseAccount",
                "getTkObj",
                "processJobs",
                "getReceipts",
                "ipfs_read"
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_pushed_events_reach_handlers() -> anyhow::Result<()> {
        let node = ScriptedNode::spawn(answers()).await?;
        let client = connect(&node).await?;

        let (topic_tx, mut topic_rx) = mpsc::unbounded_channel();
        client
            .pubsub()
            .subscribe(
                "scores",
                Some(handler(move |msg| {
                    let _ = topic_tx.send(msg.payload);
                })),
            )
            .await?;

        let (sync_tx, mut sync_rx) = mpsc::unbounded_channel();
        client.on_token_sync(Arc::new(move |payload| {
            let _ = sync_tx.send(payload);
        }));
        client.start_token_sync().await?;

        node.push(PUBSUB_EVENT, json!({"topic": "scores", "payload": [1, 2]}))?;
        node.push(SYNC_TOKENS_EVENT, json!({"tokens": 3}))?;

        let payload = timeout(Duration::from_secs(2), topic_rx.recv()).await?;
        assert_eq!(payload, Some(json!([1, 2])));
        let payload = timeout(Duration::from_secs(2), sync_rx.recv()).await?;
        assert_eq!(payload, Some(json!({"tokens": 3})));
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_node() -> anyhow::Result<()> {
        let config = ClientConfig {
            app_name: APP.to_string(),
            rpc_port: 1,
            ..ClientConfig::default()
        };
        let result = BladeClient::connect(config).await;
        assert!(matches!(
            result,
            Err(BladeError::Rpc(RpcError::Connection(_)))
        ));
        Ok(())
    }
}
