//! # Failure Modes
//!
//! Every failure surfaces as a typed error: missing wallet, unreachable
//! ledger, reverted execution, confirmation timeout and cancellation.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::watch;

    use crowdfund_client::{
        CallOptions, ClientConfig, CrowdfundingApi, ErrorKind, InMemoryLedger, LedgerRpc,
    };

    use crate::fixtures::{campaign_form, days_ahead, memory_client, memory_client_with};

    /// Wait until the ledger holds `count` pending transactions.
    async fn until_pending(ledger: &InMemoryLedger, count: usize) {
        while ledger.pending_count() < count {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }

    // =========================================================================
    // WALLET
    // =========================================================================

    #[tokio::test]
    async fn test_connect_without_accounts() {
        let ledger = Arc::new(InMemoryLedger::with_accounts(Vec::new()));
        let client = memory_client(&ledger);

        let err = client.connect().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WalletUnavailable);
        assert_eq!(client.active_address(), None);
    }

    #[tokio::test]
    async fn test_submit_without_connect() {
        let ledger = Arc::new(InMemoryLedger::new());
        let client = memory_client(&ledger);

        let err = client
            .submit_campaign(
                &campaign_form("Nope", "1", &days_ahead(&ledger, 1)),
                CallOptions::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WalletUnavailable);
        assert_eq!(ledger.block_number().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reads_work_without_wallet() {
        let ledger = Arc::new(InMemoryLedger::with_accounts(Vec::new()));
        let client = memory_client(&ledger);
        assert!(client.get_campaigns().await.unwrap().is_empty());
        assert!(client.get_donations(0).await.unwrap().is_empty());
    }

    // =========================================================================
    // NETWORK
    // =========================================================================

    #[tokio::test]
    async fn test_offline_ledger_is_network_failure() {
        let ledger = Arc::new(InMemoryLedger::new());
        let client = memory_client(&ledger);
        client.connect().await.unwrap();
        ledger.set_offline(true);

        let err = client.get_campaigns().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
        assert!(err.is_retryable());

        let err = client.get_donations(0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkFailure);

        let err = client
            .donate(0, "1", CallOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkFailure);

        // Same call succeeds once the ledger is back
        ledger.set_offline(false);
        assert!(client.get_campaigns().await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_while_offline() {
        let ledger = Arc::new(InMemoryLedger::new());
        ledger.set_offline(true);
        let client = memory_client(&ledger);

        assert_eq!(
            client.connect().await.unwrap_err().kind(),
            ErrorKind::NetworkFailure
        );
    }

    // =========================================================================
    // CONFIRMATION WAIT
    // =========================================================================

    #[tokio::test]
    async fn test_unmined_transaction_times_out() {
        let ledger = Arc::new(InMemoryLedger::new());
        ledger.set_auto_mine(false);
        let client = memory_client(&ledger);
        client.connect().await.unwrap();

        let err = client
            .submit_campaign(
                &campaign_form("Slow", "1", &days_ahead(&ledger, 1)),
                CallOptions::with_timeout(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.is_retryable());

        // The broadcast transaction is not recalled
        assert_eq!(ledger.pending_count(), 1);
        ledger.mine_block();
        assert_eq!(client.get_campaigns().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_config_timeout_applies_without_call_timeout() {
        let ledger = Arc::new(InMemoryLedger::new());
        ledger.set_auto_mine(false);
        let mut config = ClientConfig::for_testing();
        config.confirmation_timeout_secs = Some(0);
        let client = memory_client_with(&ledger, config);
        client.connect().await.unwrap();

        let err = client
            .submit_campaign(
                &campaign_form("Zero", "1", &days_ahead(&ledger, 1)),
                CallOptions::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_cancelled_wait() {
        let ledger = Arc::new(InMemoryLedger::new());
        ledger.set_auto_mine(false);
        let client = memory_client(&ledger);
        client.connect().await.unwrap();
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let canceller = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move {
                until_pending(&ledger, 1).await;
                let _ = cancel_tx.send(true);
            })
        };

        let err = client
            .submit_campaign(
                &campaign_form("Cancel", "1", &days_ahead(&ledger, 1)),
                CallOptions::default().cancel_on(cancel_rx),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(!err.is_retryable());
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_waits_for_requested_depth() {
        let ledger = Arc::new(InMemoryLedger::new());
        let mut config = ClientConfig::for_testing();
        config.confirmations = 3;
        let client = memory_client_with(&ledger, config);
        client.connect().await.unwrap();

        let miner = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move {
                // Block 2 holds the transaction; two more bury it
                while ledger.block_number().await.unwrap() < 2 {
                    tokio::time::sleep(Duration::from_millis(2)).await;
                }
                for _ in 0..2 {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    ledger.mine_block();
                }
            })
        };

        let confirmed = client
            .submit_campaign(
                &campaign_form("Deep", "1", &days_ahead(&ledger, 1)),
                CallOptions::with_timeout(Duration::from_secs(5)),
            )
            .await
            .unwrap();
        assert_eq!(confirmed.block_number, 2);
        assert_eq!(ledger.block_number().await.unwrap(), 4);
        miner.await.unwrap();
    }

    // =========================================================================
    // REVERTS
    // =========================================================================

    #[tokio::test]
    async fn test_failed_receipt_is_execution_reverted() {
        let ledger = Arc::new(InMemoryLedger::new());
        ledger.set_auto_mine(false);
        let client = memory_client(&ledger);
        client.connect().await.unwrap();

        // Passes estimation, then the deadline lapses before the block is mined
        let deadline = (ledger.timestamp_ms() + 60_000).to_string();
        let miner = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move {
                until_pending(&ledger, 1).await;
                ledger.advance_time(120_000);
                ledger.mine_block();
            })
        };

        let err = client
            .submit_campaign(
                &campaign_form("Lapsed", "1", &deadline),
                CallOptions::with_timeout(Duration::from_secs(5)),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExecutionReverted);
        assert!(client.get_campaigns().await.unwrap().is_empty());
        miner.await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_reads_are_independent() {
        let ledger = Arc::new(InMemoryLedger::new());
        let client = memory_client(&ledger);
        client.connect().await.unwrap();
        client
            .submit_campaign(
                &campaign_form("Shared", "3", &days_ahead(&ledger, 1)),
                CallOptions::default(),
            )
            .await
            .unwrap();

        let (a, b, c) = tokio::join!(
            client.get_campaigns(),
            client.get_campaigns(),
            client.get_donations(0)
        );
        assert_eq!(a.unwrap(), b.unwrap());
        assert!(c.unwrap().is_empty());
    }
}
