//! # Donation Flows
//!
//! `donate` followed by `getDonations`, including exact decimal handling
//! and donations from several accounts.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alloy_sol_types::SolCall;

    use crowdfund_client::abi::CrowdFunding;
    use crowdfund_client::{
        Address, CallOptions, ContractClientAdapter, CrowdfundingApi, ErrorKind, InMemoryLedger,
        NodeWallet, U256,
    };

    use crate::fixtures::{campaign_form, days_ahead, http_client, memory_client, MockNode};

    /// Ledger with one campaign (pId 0) created by the first dev account.
    async fn ledger_with_campaign() -> (Arc<InMemoryLedger>, ContractClientAdapter) {
        let ledger = Arc::new(InMemoryLedger::new());
        let client = memory_client(&ledger);
        client.connect().await.unwrap();
        client
            .submit_campaign(
                &campaign_form("Roof", "10", &days_ahead(&ledger, 30)),
                CallOptions::default(),
            )
            .await
            .unwrap();
        (ledger, client)
    }

    #[tokio::test]
    async fn test_donation_is_exact() {
        let (_ledger, client) = ledger_with_campaign().await;
        let donor = client.active_address().unwrap();

        client.donate(0, "1.5", CallOptions::default()).await.unwrap();

        let donations = client.get_donations(0).await.unwrap();
        assert_eq!(donations.len(), 1);
        assert_eq!(donations[0].donator, donor);
        assert_eq!(donations[0].donation, "1.5");

        // Base units on the ledger, not a float approximation
        let (_, amounts) = client.contract().get_donators(U256::ZERO).await.unwrap();
        assert_eq!(amounts, vec![U256::from(1_500_000_000_000_000_000u64)]);
    }

    #[tokio::test]
    async fn test_totals_do_not_drift() {
        let (_ledger, client) = ledger_with_campaign().await;

        client.donate(0, "0.1", CallOptions::default()).await.unwrap();
        client.donate(0, "0.2", CallOptions::default()).await.unwrap();

        let campaign = &client.get_campaigns().await.unwrap()[0];
        assert_eq!(campaign.amount_collected, "0.3");
    }

    #[tokio::test]
    async fn test_smallest_unit_donation() {
        let (_ledger, client) = ledger_with_campaign().await;

        client
            .donate(0, "0.000000000000000001", CallOptions::default())
            .await
            .unwrap();

        assert_eq!(
            client.get_donations(0).await.unwrap()[0].donation,
            "0.000000000000000001"
        );
    }

    #[tokio::test]
    async fn test_donations_from_several_accounts_keep_order() {
        let (ledger, client) = ledger_with_campaign().await;
        let accounts = ledger.dev_accounts();

        let mut expected = Vec::new();
        for (account, amount) in accounts.iter().zip(["1", "2.25", "0.75"]) {
            ledger.set_accounts(vec![*account]);
            client.connect().await.unwrap();
            client.donate(0, amount, CallOptions::default()).await.unwrap();
            expected.push((*account, amount));
        }

        let donations = client.get_donations(0).await.unwrap();
        assert_eq!(donations.len(), 3);
        assert_eq!(donations[0].donator, expected[0].0);
        assert_eq!(donations[0].donation, "1.0");
        assert_eq!(donations[1].donator, expected[1].0);
        assert_eq!(donations[1].donation, "2.25");
        assert_eq!(donations[2].donator, expected[2].0);
        assert_eq!(donations[2].donation, "0.75");

        assert_eq!(client.get_campaigns().await.unwrap()[0].amount_collected, "4.0");
    }

    #[tokio::test]
    async fn test_no_donations_yet() {
        let (_ledger, client) = ledger_with_campaign().await;
        assert!(client.get_donations(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_donations_of_unknown_campaign_are_empty() {
        let (_ledger, client) = ledger_with_campaign().await;
        assert!(client.get_donations(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_donate_to_unknown_campaign_reverts() {
        let (_ledger, client) = ledger_with_campaign().await;

        let err = client
            .donate(9, "1", CallOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExecutionReverted);
        assert!(err.to_string().contains("Campaign does not exist"));
    }

    #[tokio::test]
    async fn test_unencodable_amounts_are_invalid_input() {
        let (ledger, client) = ledger_with_campaign().await;
        let height = crowdfund_client::LedgerRpc::block_number(ledger.as_ref())
            .await
            .unwrap();

        for amount in ["", "abc", "-1", "1e18", "1.0000000000000000001", "1,5"] {
            let err = client
                .donate(0, amount, CallOptions::default())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "amount {:?}", amount);
        }

        // Nothing reached the ledger
        assert_eq!(
            crowdfund_client::LedgerRpc::block_number(ledger.as_ref())
                .await
                .unwrap(),
            height
        );
    }

    #[tokio::test]
    async fn test_mismatched_donator_lists_are_decode_failure() {
        let node = MockNode::spawn(Arc::new(InMemoryLedger::new())).await;
        let output = CrowdFunding::getDonatorsCall::abi_encode_returns(&(
            vec![Address::repeat_byte(0x11), Address::repeat_byte(0x22)],
            vec![U256::from(1u64)],
        ));
        node.answer_call(CrowdFunding::getDonatorsCall::SELECTOR, output);
        let client = http_client(&node, Arc::new(NodeWallet::new()));

        let err = client.get_donations(0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_donate_without_connect() {
        let (ledger, _) = ledger_with_campaign().await;
        let fresh = memory_client(&ledger);

        let err = fresh
            .donate(0, "1", CallOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WalletUnavailable);
    }
}
