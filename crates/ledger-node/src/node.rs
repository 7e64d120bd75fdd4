use ledger_core::{Block, BlockEngine, BlockError, CancelFlag};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Current head plus one flag per search mining on top of it.
struct Head {
    block: Block,
    searches: Vec<CancelFlag>,
}

impl Head {
    fn new(block: Block) -> Self {
        Self {
            block,
            searches: Vec::new(),
        }
    }

    fn cancel_searches(&mut self) {
        for flag in self.searches.drain(..) {
            flag.cancel();
        }
    }
}

/// Raises its search's flag when the owning request goes away.
struct SearchGuard(CancelFlag);

impl Drop for SearchGuard {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum NodeError {
    #[error(transparent)]
    Block(#[from] BlockError),

    /// The head moved while a local search was running.
    #[error("head changed while mining: {0}")]
    Preempted(BlockError),

    #[error("mining task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Keeps the latest accepted block and mines or accepts successors of it.
///
/// Only the head is kept; storing and comparing whole chains is left to the caller.
pub(crate) struct Node {
    engine: Arc<BlockEngine>,
    head: RwLock<Head>,
}

impl Node {
    pub(crate) fn new(engine: BlockEngine) -> Self {
        Self::with_head(engine, Block::genesis())
    }

    pub(crate) fn with_head(engine: BlockEngine, head: Block) -> Self {
        Self {
            engine: Arc::new(engine),
            head: RwLock::new(Head::new(head)),
        }
    }

    pub(crate) async fn head(&self) -> Block {
        self.head.read().await.block.clone()
    }

    /// Number of searches still running on the current head.
    #[cfg(test)]
    pub(crate) async fn live_searches(&self) -> usize {
        let head = self.head.read().await;
        head.searches.iter().filter(|f| !f.is_cancelled()).count()
    }

    /// Register a new search on the current head.
    async fn register_search(&self) -> (Block, SearchGuard) {
        let mut head = self.head.write().await;
        head.searches.retain(|f| !f.is_cancelled());
        let flag = CancelFlag::new();
        head.searches.push(flag.clone());
        (head.block.clone(), SearchGuard(flag))
    }

    /// Mine `data` on top of the current head on a blocking worker.
    ///
    /// Dropping the returned future stops the search.
    pub(crate) async fn mine(&self, data: Value) -> Result<Block, NodeError> {
        let (predecessor, guard) = self.register_search().await;
        let cancel = guard.0.clone();
        let engine = Arc::clone(&self.engine);
        let mined = tokio::task::spawn_blocking(move || {
            engine.mine_cancellable(&predecessor, &data, &cancel)
        })
        .await?;
        drop(guard);

        let block = match mined {
            Ok(block) => block,
            Err(e @ BlockError::MiningCancelled { .. }) => return Err(NodeError::Preempted(e)),
            Err(e) => return Err(e.into()),
        };

        self.accept(block).await.map_err(|e| match e {
            NodeError::Block(e @ BlockError::BrokenChainLink { .. }) => NodeError::Preempted(e),
            other => other,
        })
    }

    /// Stop every search in flight, e.g. on shutdown.
    pub(crate) async fn cancel_mining(&self) {
        let mut head = self.head.write().await;
        let count = head.searches.len();
        head.cancel_searches();
        if count > 0 {
            info!(count, "cancelled mining searches");
        }
    }

    /// Validate `candidate` against the head and make it the new head.
    ///
    /// Any search still running on the old head is cancelled.
    pub(crate) async fn accept(&self, candidate: Block) -> Result<Block, NodeError> {
        let mut head = self.head.write().await;
        if let Err(e) = self.engine.validate_successor(&head.block, &candidate) {
            warn!(reason = e.reason(), "did not extend head: {e}");
            return Err(e.into());
        }
        head.cancel_searches();
        *head = Head::new(candidate.clone());
        info!(
            hash = candidate.hash(),
            difficulty = candidate.difficulty(),
            "head replaced"
        );
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::EngineConfig;
    use serde_json::json;
    use std::time::Duration;

    fn node() -> Node {
        Node::new(BlockEngine::new(EngineConfig::default()))
    }

    #[tokio::test]
    async fn starts_at_genesis() {
        assert_eq!(node().head().await, Block::genesis());
    }

    #[tokio::test]
    async fn mining_extends_the_head() {
        let node = node();
        let first = node.mine(json!(["a"])).await.unwrap();
        let second = node.mine(json!(["b"])).await.unwrap();
        assert_eq!(first.previous_hash(), Block::genesis().hash());
        assert_eq!(second.previous_hash(), first.hash());
        assert_eq!(node.head().await, second);
    }

    #[tokio::test]
    async fn accepting_a_peer_block_cancels_local_mining() {
        let node = node();
        let (_, guard) = node.register_search().await;
        assert_eq!(node.live_searches().await, 1);
        let peer = BlockEngine::new(EngineConfig::default());
        let block = peer.mine(&Block::genesis(), "from a peer").unwrap();

        node.accept(block.clone()).await.unwrap();
        assert!(guard.0.is_cancelled());
        assert_eq!(node.head().await, block);
        assert_eq!(node.live_searches().await, 0);
    }

    #[tokio::test]
    async fn rejected_block_leaves_head_alone() {
        let node = node();
        let (_, guard) = node.register_search().await;
        let peer = BlockEngine::new(EngineConfig::default());
        let block = peer.mine(&Block::genesis(), "x").unwrap();
        let orphan = peer.mine(&block, "y").unwrap();

        let err = node.accept(orphan).await.unwrap_err();
        assert!(matches!(
            err,
            NodeError::Block(BlockError::BrokenChainLink { .. })
        ));
        assert_eq!(node.head().await, Block::genesis());
        assert!(!guard.0.is_cancelled());
    }

    #[tokio::test]
    async fn finished_searches_are_not_counted() {
        let node = node();
        node.mine(json!(["a"])).await.unwrap();
        assert_eq!(node.live_searches().await, 0);

        let (_, guard) = node.register_search().await;
        assert_eq!(node.live_searches().await, 1);
        drop(guard);
        assert_eq!(node.live_searches().await, 0);
    }

    /// A head demanding ~200 leading zero bits: no search on it ever succeeds.
    fn hard_node() -> Arc<Node> {
        let hard = Block::from_serialized(&json!({
            "timestamp": u64::MAX,
            "previousHash": "p",
            "hash": "h",
            "data": null,
            "difficulty": 200,
            "nonce": 0
        }))
        .unwrap();
        Arc::new(Node::with_head(
            BlockEngine::new(EngineConfig::default()),
            hard,
        ))
    }

    #[tokio::test]
    async fn peer_block_preempts_a_running_search() {
        let node = hard_node();
        let search = {
            let node = Arc::clone(&node);
            tokio::spawn(async move { node.mine(json!("doomed")).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(node.live_searches().await, 1);
        node.cancel_mining().await;

        let err = search.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            NodeError::Preempted(BlockError::MiningCancelled { .. })
        ));
        assert_eq!(node.live_searches().await, 0);
    }

    #[tokio::test]
    async fn dropped_request_stops_its_search() {
        let node = hard_node();
        let watcher = {
            let node = Arc::clone(&node);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                let head = node.head.read().await;
                head.searches.clone()
            })
        };

        let res = tokio::time::timeout(Duration::from_millis(100), node.mine(json!("abandoned"))).await;
        assert!(res.is_err(), "search on a difficulty-200 head cannot finish");

        let seen = watcher.await.unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_cancelled());
        assert_eq!(node.live_searches().await, 0);
    }
}
