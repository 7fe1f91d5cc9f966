//! A hash-chained, proof-of-work-mined audit log.
//!
//! Each [`AuditBlock`] commits to its predecessor's hash the way a
//! blockchain ledger does; `sha2` is the hashing crate both
//! blockchain-shaped repos in this codebase's lineage (an Ethereum
//! execution client and a `NEAR` validator) depend on for exactly this
//! kind of block hashing.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// After this many proof-of-work attempts, [`AuditChain::add_block`]
/// yields to the scheduler once before continuing, so a high `difficulty`
/// cannot starve a cooperative runtime.
const YIELD_EVERY_N_NONCES: u64 = 4096;

/// A single block in the audit chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditBlock {
    /// This block's position in the chain; the genesis block is `0`.
    pub index: u64,
    /// Milliseconds since the Unix epoch when this block was mined.
    pub timestamp_ms: i64,
    /// The transactions committed by this block, in push order.
    pub transactions: Vec<String>,
    /// The hex-encoded hash of the previous block (`"0"` for genesis).
    pub previous_hash: String,
    /// The nonce that satisfies the chain's proof-of-work difficulty.
    pub nonce: u64,
    /// This block's own hex-encoded hash.
    pub hash: String,
}

fn compute_hash(index: u64, timestamp_ms: i64, previous_hash: &str, nonce: u64, transactions: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{index}_{timestamp_ms}_{previous_hash}_{nonce}").as_bytes());
    for tx in transactions {
        hasher.update(tx.as_bytes());
    }
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn satisfies_difficulty(hash: &str, difficulty: usize) -> bool {
    hash.bytes().take(difficulty).all(|b| b == b'0')
}

/// A hash-chained, append-only audit log with a fixed mining difficulty.
#[derive(Debug, Clone)]
pub struct AuditChain {
    blocks: Vec<AuditBlock>,
    difficulty: usize,
    pending: Vec<String>,
}

impl AuditChain {
    /// Creates a new chain with a mined genesis block at `difficulty`.
    ///
    /// `difficulty` is fixed for the lifetime of the chain: there is no
    /// setter, so changing it requires constructing (and re-verifying) a
    /// new chain rather than mutating one in place, by design.
    #[must_use]
    pub async fn new(difficulty: usize) -> Self {
        let mut chain = Self {
            blocks: Vec::new(),
            difficulty,
            pending: vec!["GENESIS BLOCK".to_string()],
        };
        let genesis_transactions = std::mem::take(&mut chain.pending);
        let genesis = Self::mine_block(0, "0".to_string(), genesis_transactions, chain.difficulty).await;
        chain.blocks.push(genesis);
        chain
    }

    /// The chain's fixed mining difficulty (number of required leading
    /// hex zero characters).
    #[must_use]
    pub const fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Returns the most recently mined block.
    #[must_use]
    pub fn last_block(&self) -> &AuditBlock {
        // A chain always has at least its genesis block.
        self.blocks.last().expect("chain always has a genesis block")
    }

    /// The number of blocks in the chain, including the genesis block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `false`; a chain always has at least a genesis block.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Borrows the block at `index`, if one has been mined that far.
    #[must_use]
    pub fn block(&self, index: u64) -> Option<&AuditBlock> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    /// Appends `transaction` to the pending buffer and mines it into a new
    /// block committed onto the chain.
    #[instrument(skip(self))]
    pub async fn add_block(&mut self, transaction: String) -> &AuditBlock {
        self.pending.push(transaction);
        let transactions = std::mem::take(&mut self.pending);
        let previous_hash = self.last_block().hash.clone();
        let index = self.last_block().index + 1;
        let block = Self::mine_block(index, previous_hash, transactions, self.difficulty).await;
        self.blocks.push(block);
        self.last_block()
    }

    async fn mine_block(index: u64, previous_hash: String, transactions: Vec<String>, difficulty: usize) -> AuditBlock {
        let timestamp_ms = current_timestamp_ms();
        let mut nonce: u64 = 0;
        loop {
            let hash = compute_hash(index, timestamp_ms, &previous_hash, nonce, &transactions);
            if satisfies_difficulty(&hash, difficulty) {
                return AuditBlock {
                    index,
                    timestamp_ms,
                    transactions,
                    previous_hash,
                    nonce,
                    hash,
                };
            }
            nonce += 1;
            if nonce % YIELD_EVERY_N_NONCES == 0 {
                tokio::task::yield_now().await;
            }
        }
    }

    /// Recomputes every non-genesis block's hash and checks it against the
    /// stored hash, the previous-block linkage, and the proof-of-work
    /// prefix. Fails closed at the first discrepancy rather than
    /// attempting any repair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Integrity`] describing the first block at which
    /// the chain is inconsistent.
    pub fn verify_chain(&self) -> Result<()> {
        for window in self.blocks.windows(2) {
            let [prev, block] = window else {
                unreachable!("windows(2) always yields two-element slices")
            };
            if block.previous_hash != prev.hash {
                return Err(Error::integrity(format!(
                    "block {} previous_hash does not match block {}'s hash",
                    block.index, prev.index
                )));
            }
            self.verify_block(block)?;
        }
        if let Some(genesis) = self.blocks.first() {
            self.verify_block(genesis)?;
        }
        Ok(())
    }

    fn verify_block(&self, block: &AuditBlock) -> Result<()> {
        let recomputed = compute_hash(block.index, block.timestamp_ms, &block.previous_hash, block.nonce, &block.transactions);
        if recomputed != block.hash {
            return Err(Error::integrity(format!("block {} hash does not match its recomputed content", block.index)));
        }
        if !satisfies_difficulty(&block.hash, self.difficulty) {
            return Err(Error::integrity(format!(
                "block {} does not satisfy the chain's proof-of-work difficulty of {}",
                block.index, self.difficulty
            )));
        }
        debug!(index = block.index, "block verified");
        Ok(())
    }
}

fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
