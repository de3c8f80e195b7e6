//! Local-key wallet session.
//!
//! Holds a secp256k1 key in process, signs EIP-155 legacy transactions and
//! broadcasts them with `eth_sendRawTransaction`. Works against any public
//! endpoint, no unlocked node accounts needed.

use alloy_primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use parking_lot::RwLock;
use rlp::RlpStream;
use sha3::{Digest, Keccak256};
use tracing::{debug, info};

use crate::domain::{gas_with_headroom, ContractError};
use crate::ports::{LedgerRpc, TransactionRequest, WalletSession};

/// Unsigned EIP-155 legacy transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTransaction {
    /// Sender nonce
    pub nonce: u64,
    /// Gas price in wei
    pub gas_price: U256,
    /// Gas limit
    pub gas: u64,
    /// Recipient; `None` deploys a contract
    pub to: Option<Address>,
    /// Value in wei
    pub value: U256,
    /// Call data
    pub data: Bytes,
    /// Replay-protection chain id
    pub chain_id: u64,
}

impl LegacyTransaction {
    fn rlp_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&trimmed(self.gas_price));
        stream.append(&self.gas);
        match &self.to {
            Some(to) => stream.append(&to.to_vec()),
            None => stream.append(&""),
        };
        stream.append(&trimmed(self.value));
        stream.append(&self.data.to_vec());
    }

    /// keccak256(rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0]))
    pub fn signing_hash(&self) -> [u8; 32] {
        let mut stream = RlpStream::new_list(9);
        self.rlp_fields(&mut stream);
        stream.append(&self.chain_id);
        stream.append(&0u8);
        stream.append(&0u8);

        Keccak256::digest(stream.as_raw()).into()
    }

    /// Raw signed transaction bytes.
    ///
    /// Fails when `chain_id` is too large for an EIP-155 `v`.
    pub fn encode_signed(
        &self,
        signature: &Signature,
        recovery_id: RecoveryId,
    ) -> Result<Bytes, ContractError> {
        let v = self
            .chain_id
            .checked_mul(2)
            .and_then(|v| v.checked_add(35 + u64::from(recovery_id.to_byte())))
            .ok_or_else(|| {
                ContractError::InvalidInput(format!(
                    "chain id {} out of range for EIP-155",
                    self.chain_id
                ))
            })?;
        let (r, s) = signature.split_bytes();

        let mut stream = RlpStream::new_list(9);
        self.rlp_fields(&mut stream);
        stream.append(&v);
        stream.append(&strip_leading_zeros(&r));
        stream.append(&strip_leading_zeros(&s));

        Ok(Bytes::from(stream.out().to_vec()))
    }
}

/// Minimal big-endian encoding, as RLP integers require.
fn trimmed(value: U256) -> Vec<u8> {
    strip_leading_zeros(&value.to_be_bytes::<32>())
}

fn strip_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

/// Ethereum address of a signing key.
pub fn address_of(key: &SigningKey) -> Address {
    let point = key.verifying_key().to_encoded_point(false);
    // Skip the 0x04 prefix
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Wallet session backed by an in-process private key.
pub struct LocalKeyWallet {
    key: SigningKey,
    address: Address,
    connected: RwLock<bool>,
}

impl std::fmt::Debug for LocalKeyWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeyWallet")
            .field("address", &self.address)
            .field("connected", &*self.connected.read())
            .finish_non_exhaustive()
    }
}

impl LocalKeyWallet {
    /// Create from a hex private key (`0x` prefix optional).
    pub fn from_hex(private_key: &str) -> Result<Self, ContractError> {
        let bytes = hex::decode(private_key.trim().trim_start_matches("0x"))
            .map_err(|_| ContractError::InvalidInput("private key is not hex".to_string()))?;
        if bytes.len() != 32 {
            return Err(ContractError::InvalidInput(format!(
                "private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let key = SigningKey::from_slice(&bytes)
            .map_err(|_| ContractError::InvalidInput("invalid secp256k1 private key".to_string()))?;
        Ok(Self::from_key(key))
    }

    /// Create from an existing signing key.
    pub fn from_key(key: SigningKey) -> Self {
        let address = address_of(&key);
        Self {
            key,
            address,
            connected: RwLock::new(false),
        }
    }

    /// Address controlled by this key.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a legacy transaction.
    pub fn sign(&self, tx: &LegacyTransaction) -> Result<Bytes, ContractError> {
        let hash = tx.signing_hash();
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&hash)
            .map_err(|e| ContractError::InvalidInput(format!("signing failed: {}", e)))?;

        // EIP-2 low-s
        let (signature, recovery_id) = match signature.normalize_s() {
            Some(normalized) => (
                normalized,
                RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
            ),
            None => (signature, recovery_id),
        };

        tx.encode_signed(&signature, recovery_id)
    }

    async fn fill(
        &self,
        rpc: &dyn LedgerRpc,
        tx: &TransactionRequest,
    ) -> Result<LegacyTransaction, ContractError> {
        let nonce = match tx.nonce {
            Some(n) => u64::try_from(n)
                .map_err(|_| ContractError::InvalidInput("nonce exceeds u64".to_string()))?,
            None => rpc.transaction_count(self.address).await?,
        };
        let gas_price = match tx.gas_price {
            Some(p) => p,
            None => rpc.gas_price().await?,
        };
        let gas = match tx.gas {
            Some(g) => g,
            None => gas_with_headroom(rpc.estimate_gas(tx).await?),
        };
        let gas = u64::try_from(gas)
            .map_err(|_| ContractError::InvalidInput("gas limit exceeds u64".to_string()))?;

        Ok(LegacyTransaction {
            nonce,
            gas_price,
            gas,
            to: tx.to,
            value: tx.value.unwrap_or_default(),
            data: tx.data.clone().unwrap_or_default(),
            chain_id: rpc.chain_id().await?,
        })
    }
}

#[async_trait]
impl WalletSession for LocalKeyWallet {
    fn active_address(&self) -> Option<Address> {
        (*self.connected.read()).then_some(self.address)
    }

    async fn connect(&self, rpc: &dyn LedgerRpc) -> Result<Address, ContractError> {
        // Fails fast when the endpoint is unreachable.
        let chain_id = rpc.chain_id().await?;
        *self.connected.write() = true;
        info!("[crowdfund] Local key wallet connected: {} (chain {})", self.address, chain_id);
        Ok(self.address)
    }

    async fn current_address(&self, _rpc: &dyn LedgerRpc) -> Result<Address, ContractError> {
        self.active_address().ok_or_else(|| {
            ContractError::WalletUnavailable("connect a wallet before sending".to_string())
        })
    }

    async fn send_transaction(
        &self,
        rpc: &dyn LedgerRpc,
        mut tx: TransactionRequest,
    ) -> Result<TxHash, ContractError> {
        if self.active_address().is_none() {
            return Err(ContractError::WalletUnavailable(
                "wallet not connected".to_string(),
            ));
        }
        tx.from = Some(self.address);

        let unsigned = self.fill(rpc, &tx).await?;
        debug!(
            "[crowdfund] Signing tx nonce={} gas={} chain={}",
            unsigned.nonce, unsigned.gas, unsigned.chain_id
        );
        let raw = self.sign(&unsigned)?;
        rpc.send_raw_transaction(raw).await
    }

    fn kind(&self) -> &'static str {
        "local-key"
    }
}
