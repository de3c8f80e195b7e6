//! # JSON-RPC Wire
//!
//! The HTTP transport and both wallet kinds against `MockNode`, a real
//! JSON-RPC server on localhost.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use alloy_primitives::U256;
    use alloy_sol_types::SolCall;

    use crowdfund_client::abi::CrowdFunding;
    use crowdfund_client::adapters::DEV_CHAIN_ID;
    use crowdfund_client::{
        CallOptions, ContractClientAdapter, CrowdfundingApi, ErrorKind, HttpLedgerRpc,
        InMemoryLedger, LedgerRpc, LocalKeyWallet, NodeWallet,
    };

    use crate::fixtures::{campaign_form, days_ahead, http_client, memory_client, MockNode};

    const DONOR_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn position(calls: &[String], method: &str) -> usize {
        calls
            .iter()
            .position(|c| c == method)
            .unwrap_or_else(|| panic!("{} never called: {:?}", method, calls))
    }

    #[tokio::test]
    async fn test_node_wallet_flow_over_http() {
        let node = MockNode::spawn(Arc::new(InMemoryLedger::new())).await;
        let client = http_client(&node, Arc::new(NodeWallet::new()));

        let owner = client.connect().await.unwrap();
        assert_eq!(owner, node.ledger().dev_accounts()[0]);

        client
            .submit_campaign(
                &campaign_form("Wire", "2.5", &days_ahead(node.ledger(), 10)),
                CallOptions::default(),
            )
            .await
            .unwrap();
        client.donate(0, "0.5", CallOptions::default()).await.unwrap();

        let campaigns = client.get_campaigns().await.unwrap();
        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].owner, owner);
        assert_eq!(campaigns[0].target, "2.5");
        assert_eq!(campaigns[0].amount_collected, "0.5");

        let donations = client.get_donations(0).await.unwrap();
        assert_eq!(donations.len(), 1);
        assert_eq!(donations[0].donator, owner);

        let calls = node.calls();
        assert_eq!(calls[0], "eth_requestAccounts");
        assert!(position(&calls, "eth_estimateGas") < position(&calls, "eth_sendTransaction"));
        assert!(
            position(&calls, "eth_sendTransaction") < position(&calls, "eth_getTransactionReceipt")
        );
        assert!(calls.contains(&"eth_call".to_string()));
        assert!(node.raw_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_request_accounts_falls_back_to_accounts() {
        let node = MockNode::spawn_with(Arc::new(InMemoryLedger::new()), false).await;
        let client = http_client(&node, Arc::new(NodeWallet::new()));

        let address = client.connect().await.unwrap();
        assert_eq!(address, node.ledger().dev_accounts()[0]);
        assert_eq!(node.calls(), vec!["eth_requestAccounts", "eth_accounts"]);
    }

    #[tokio::test]
    async fn test_revert_reason_survives_the_wire() {
        let node = MockNode::spawn(Arc::new(InMemoryLedger::new())).await;
        let client = http_client(&node, Arc::new(NodeWallet::new()));
        client.connect().await.unwrap();

        let err = client
            .submit_campaign(
                &campaign_form("Past", "1", "2020-06-01"),
                CallOptions::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExecutionReverted);
        assert!(err
            .to_string()
            .contains("The deadline should be a date in the future."));
        assert!(!node.calls().contains(&"eth_sendTransaction".to_string()));
    }

    #[tokio::test]
    async fn test_empty_account_list_over_http() {
        let node = MockNode::spawn(Arc::new(InMemoryLedger::with_accounts(Vec::new()))).await;
        let client = http_client(&node, Arc::new(NodeWallet::new()));

        let err = client.connect().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WalletUnavailable);
    }

    #[tokio::test]
    async fn test_local_key_wallet_signs_donation() {
        let ledger = Arc::new(InMemoryLedger::new());
        // Campaign created by a dev account, directly on the ledger
        let creator = memory_client(&ledger);
        creator.connect().await.unwrap();
        creator
            .submit_campaign(
                &campaign_form("Signed", "3", &days_ahead(&ledger, 5)),
                CallOptions::default(),
            )
            .await
            .unwrap();

        let node = MockNode::spawn(Arc::clone(&ledger)).await;
        let wallet = Arc::new(LocalKeyWallet::from_hex(DONOR_KEY).unwrap());
        let donor = wallet.address();
        let client: ContractClientAdapter = http_client(&node, wallet);

        assert_eq!(client.connect().await.unwrap(), donor);
        client
            .donate(0, "1.5", CallOptions::with_timeout(Duration::from_secs(5)))
            .await
            .unwrap();

        let raw = node.raw_transactions();
        assert_eq!(raw.len(), 1);
        assert!(!node.calls().contains(&"eth_sendTransaction".to_string()));

        let tx = rlp::Rlp::new(&raw[0]);
        assert_eq!(tx.item_count().unwrap(), 9);

        let nonce: u64 = tx.val_at(0).unwrap();
        assert_eq!(nonce, 0);

        let to = tx.at(3).unwrap();
        assert_eq!(to.data().unwrap(), ledger.contract_address().as_slice());

        let value = U256::from(1_500_000_000_000_000_000u64).to_be_bytes::<32>();
        let start = value.iter().position(|b| *b != 0).unwrap();
        assert_eq!(tx.at(4).unwrap().data().unwrap(), &value[start..]);

        let data: Vec<u8> = tx.val_at(5).unwrap();
        assert_eq!(data[..4], CrowdFunding::donateToCampaignCall::SELECTOR);
        let call = CrowdFunding::donateToCampaignCall::abi_decode(&data, true).unwrap();
        assert_eq!(call.id, U256::ZERO);

        let v: u64 = tx.val_at(6).unwrap();
        assert!(v == DEV_CHAIN_ID * 2 + 35 || v == DEV_CHAIN_ID * 2 + 36);
    }

    #[tokio::test]
    async fn test_reads_need_no_wallet_over_http() {
        let node = MockNode::spawn(Arc::new(InMemoryLedger::new())).await;
        let client = http_client(&node, Arc::new(NodeWallet::new()));

        assert!(client.get_campaigns().await.unwrap().is_empty());
        assert!(client.active_address().is_none());
        assert!(!node.calls().contains(&"eth_requestAccounts".to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let rpc = HttpLedgerRpc::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        assert_eq!(
            rpc.block_number().await.unwrap_err().kind(),
            ErrorKind::NetworkFailure
        );

        let mut config = crowdfund_client::ClientConfig::for_testing();
        config.rpc_url = "http://127.0.0.1:9".to_string();
        let client = ContractClientAdapter::new(
            config,
            Arc::new(rpc),
            Arc::new(NodeWallet::new()),
        );

        let err = client.get_campaigns().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
        assert!(err.is_retryable());
    }
}
