//! # Job Queue Flow
//!
//! Startup, account linking and the compile / submit / poll cycle through
//! the client façade, against a scripted mock node.

#[cfg(test)]
mod tests {
    use crate::helpers::{healthy_mock, mock_client, ACCOUNT};
    use bc_01_job_queue::{JobQueueApi, JobQueueError, JobState};
    use blade_client::{BladeError, ContractCall, Receipt, U256};
    use serde_json::json;

    #[tokio::test]
    async fn test_init_link_send_poll() -> anyhow::Result<()> {
        let mock = healthy_mock();
        let client = mock_client(&mock)?;

        client.init().await?;
        assert!(client.is_ready());

        mock.respond("canUseAccount", json!({ACCOUNT: true}));
        assert!(client.link_account("0xAA").await?);
        assert_eq!(client.jobs().caller().map(|a| a.to_hex()), Some(ACCOUNT.to_string()));

        mock.respond("getTkObj", json!({"tx": "compiled"}));
        mock.respond("processJobs", json!("Q-1"));
        let call = ContractCall::new("Dice", "roll")
            .args((0..11).map(|i| json!(i)))
            .amount(U256::from(5u64));
        let queue = client.send(call).await?;

        let compile = &mock.calls_to("getTkObj")[0];
        assert_eq!(compile[0], json!("Dice"));
        assert_eq!(
            compile[3],
            json!(["arg0", "arg1", "arg10", "arg2", "arg3", "arg4", "arg5", "arg6", "arg7", "arg8", "arg9"])
        );
        assert_eq!(compile[4], json!(ACCOUNT));
        assert_eq!(compile[5], json!("5"));
        assert_eq!(compile[6]["arg10"], json!(10));
        assert_eq!(compile.as_array().map(Vec::len), Some(7));
        assert_eq!(mock.calls_to("processJobs"), vec![json!([{"tx": "compiled"}])]);

        mock.respond_once("getReceipts", Ok(json!([])));
        assert_eq!(client.poll_receipt(&queue).await?, Receipt::Pending);
        assert_eq!(client.jobs().queue_state(&queue), Some(JobState::Submitted));

        mock.respond("getReceipts", json!([{"status": 1}]));
        assert_eq!(
            client.poll_receipt(&queue).await?,
            Receipt::Ready(json!([{"status": 1}]))
        );
        assert_eq!(client.jobs().queue_state(&queue), Some(JobState::Receipted));
        Ok(())
    }

    #[tokio::test]
    async fn test_unlinked_session_sends_placeholder_caller() -> anyhow::Result<()> {
        let mock = healthy_mock();
        let client = mock_client(&mock)?;
        client.init().await?;

        mock.respond("canUseAccount", json!({ACCOUNT: "yes"}));
        assert!(!client.link_account(ACCOUNT).await?);

        mock.respond("getTkObj", json!({"tx": 1}));
        client.jobs().compile_call(ContractCall::new("Dice", "roll")).await?;
        let compile = &mock.calls_to("getTkObj")[0];
        assert_eq!(compile[4], json!("0x"));
        assert_eq!(compile[5], json!(null));
        Ok(())
    }

    #[tokio::test]
    async fn test_gas_override_applies_to_one_call() -> anyhow::Result<()> {
        let mock = healthy_mock();
        let client = mock_client(&mock)?;
        client.init().await?;
        mock.respond("getTkObj", json!({"tx": 1}));

        client
            .jobs()
            .compile_call(ContractCall::new("Dice", "roll").gas_limit(90_000))
            .await?;
        client.jobs().compile_call(ContractCall::new("Dice", "roll")).await?;

        let calls = mock.calls_to("getTkObj");
        assert_eq!(calls[0].as_array().map(Vec::len), Some(8));
        assert_eq!(calls[0][7], json!(90_000));
        assert_eq!(calls[1].as_array().map(Vec::len), Some(7));
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_submit_and_compile_before_init() -> anyhow::Result<()> {
        let mock = healthy_mock();
        let client = mock_client(&mock)?;

        let refused = client.send(ContractCall::new("Dice", "roll")).await;
        assert!(matches!(
            refused,
            Err(BladeError::JobQueue(JobQueueError::ServerNotReady { .. }))
        ));
        assert!(mock.calls_to("getTkObj").is_empty());

        client.init().await?;
        mock.respond("getTkObj", json!({"tx": "a"}));
        let first = client.jobs().compile_call(ContractCall::new("Dice", "roll")).await?;
        mock.respond("getTkObj", json!({"tx": "b"}));
        let second = client.jobs().compile_call(ContractCall::new("Token", "mint")).await?;

        mock.respond("processJobs", json!(7));
        let queue = client.jobs().submit(&[first.clone(), second.clone()]).await?;
        assert_eq!(
            mock.calls_to("processJobs"),
            vec![json!([{"tx": "a"}, {"tx": "b"}])]
        );
        assert_eq!(client.jobs().job_state(first.id), Some(JobState::Submitted));
        assert_eq!(client.jobs().job_state(second.id), Some(JobState::Submitted));

        // Unknown queue id: pending, not an error.
        mock.respond("getReceipts", json!(null));
        assert_eq!(client.poll_receipt(&queue).await?, Receipt::Pending);

        // Resubmitting the same jobs is refused locally.
        let again = client.jobs().submit(&[first]).await;
        assert!(matches!(again, Err(JobQueueError::IllegalTransition { .. })));
        Ok(())
    }
}
