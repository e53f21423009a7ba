//! Engine registry: the top-level entry point. Owns a
//! concurrent symbol → engine map so unrelated symbols proceed in
//! parallel, while each symbol's own matching stays serialized behind
//! its `Mutex`.

use crate::config::EngineConfig;
use crate::error::{CancelError, SubmitError};
use crate::event::{EventMultiplexer, PublishBatch, Topic};
use crate::matching::{OrderRequest, SubmitResult, SymbolEngine, TradeIdGenerator};
use crate::types::{Bbo, IdGenerator, LevelView, MonotonicClock, Order, OrderId, SystemClock, Symbol, Trade};
use crossbeam::channel::Receiver;
use flurry::HashMap as FlurryMap;
use std::sync::{Arc, Mutex};

/// Process-wide matching entry point. Cheap to clone: every field is
/// reference-counted or itself `Sync`.
pub struct EngineRegistry {
    config: EngineConfig,
    symbols: Arc<FlurryMap<Symbol, Arc<Mutex<SymbolEngine>>>>,
    order_ids: Arc<IdGenerator>,
    trade_ids: Arc<TradeIdGenerator>,
    clock: Arc<dyn MonotonicClock>,
    multiplexer: Arc<EventMultiplexer>,
}

impl EngineRegistry {
    pub fn new(config: EngineConfig) -> Self {
        let multiplexer = Arc::new(EventMultiplexer::new(config.subscriber_queue_capacity));
        Self {
            config,
            symbols: Arc::new(FlurryMap::new()),
            order_ids: Arc::new(IdGenerator::default()),
            trade_ids: Arc::new(TradeIdGenerator::new()),
            clock: Arc::new(SystemClock),
            multiplexer,
        }
    }

    /// Build a registry with an injected clock, for deterministic tests.
    pub fn with_clock(config: EngineConfig, clock: Arc<dyn MonotonicClock>) -> Self {
        let multiplexer = Arc::new(EventMultiplexer::new(config.subscriber_queue_capacity));
        Self {
            config,
            symbols: Arc::new(FlurryMap::new()),
            order_ids: Arc::new(IdGenerator::default()),
            trade_ids: Arc::new(TradeIdGenerator::new()),
            clock,
            multiplexer,
        }
    }

    /// Lazily create a symbol's engine on first reference: a new symbol
    /// is born at first submission, with an empty book.
    fn engine_for(&self, symbol: &Symbol) -> Arc<Mutex<SymbolEngine>> {
        let guard = self.symbols.guard();
        if let Some(engine) = self.symbols.get(symbol, &guard) {
            return Arc::clone(engine);
        }
        let fresh = Arc::new(Mutex::new(SymbolEngine::new(
            Symbol::clone(symbol),
            self.config.recent_trades_capacity,
        )));
        // try_insert only succeeds for the first racer; every other
        // concurrent first-submission for this symbol gets back the
        // winner's engine instead of silently overwriting it.
        match self.symbols.try_insert(Symbol::clone(symbol), fresh, &guard) {
            Ok(inserted) => Arc::clone(inserted),
            Err(err) => Arc::clone(err.current),
        }
    }

    /// Submit an order. The per-symbol lock is held for the match loop and
    /// released before the resulting batch is published, so slow
    /// subscribers never hold up matching.
    pub fn submit(&self, request: OrderRequest) -> Result<SubmitResult, SubmitError> {
        let symbol = request.symbol.clone();
        let engine = self.engine_for(&symbol);
        let order_id = self.order_ids.next();

        let (result, batch) = {
            let mut guard = engine.lock().expect("symbol engine mutex poisoned");
            guard.submit(
                request,
                order_id,
                self.clock.as_ref(),
                &self.trade_ids,
                self.config.default_snapshot_depth,
            )?
        };

        if let Some(batch) = batch {
            self.publish(batch);
        }
        Ok(result)
    }

    /// Cancel a resting order. `symbol` narrows the lookup to one engine;
    /// the caller is expected to know which symbol an order belongs to
    /// (cancellation is keyed by symbol and order id together).
    pub fn cancel(&self, symbol: &Symbol, order_id: OrderId) -> Result<Order, CancelError> {
        let engine = self.engine_for(symbol);
        let mut guard = engine.lock().expect("symbol engine mutex poisoned");
        guard.cancel(order_id)
    }

    pub fn bbo(&self, symbol: &Symbol) -> Bbo {
        let engine = self.engine_for(symbol);
        let guard = engine.lock().expect("symbol engine mutex poisoned");
        guard.bbo()
    }

    pub fn snapshot(&self, symbol: &Symbol, depth: Option<usize>) -> (Vec<LevelView>, Vec<LevelView>) {
        let engine = self.engine_for(symbol);
        let guard = engine.lock().expect("symbol engine mutex poisoned");
        guard.snapshot(depth.unwrap_or(self.config.default_snapshot_depth))
    }

    pub fn recent_trades(&self, symbol: &Symbol, limit: Option<usize>) -> Vec<Trade> {
        let engine = self.engine_for(symbol);
        let guard = engine.lock().expect("symbol engine mutex poisoned");
        guard.recent_trades(limit.unwrap_or(self.config.recent_trades_capacity))
    }

    pub fn subscribe(&self, topic: Topic) -> Receiver<crate::event::Event> {
        self.multiplexer.subscribe(topic)
    }

    fn publish(&self, batch: PublishBatch) {
        self.multiplexer.publish_batch(batch);
    }
}
