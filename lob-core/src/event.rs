//! Event multiplexer: fans matched trades and book deltas out to bounded
//! per-subscriber queues across three topics. A single `publish_*`
//! surface accepts a tagged event; each subscriber picks its topic at
//! subscribe time rather than filtering client-side.

use crate::types::{Bbo, LevelView, SequenceNumber, Symbol, Trade};
use crossbeam::channel::{Receiver, Sender, TrySendError, bounded};
use std::sync::Mutex;

/// Streaming topics a caller can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    OrderBook,
    Trades,
    Bbo,
}

/// One message on a subscriber's stream. Every variant carries its
/// producing symbol so a subscriber receiving all symbols on a topic can
/// filter client-side.
#[derive(Debug, Clone)]
pub enum Event {
    Trade(Trade),
    OrderBookUpdate {
        symbol: Symbol,
        bids: Vec<LevelView>,
        asks: Vec<LevelView>,
        sequence_number: SequenceNumber,
    },
    BboUpdate {
        symbol: Symbol,
        bbo: Bbo,
        sequence_number: SequenceNumber,
    },
    /// A symbol has been quarantined after an invariant violation. Sent on
    /// all three topics so every subscriber, regardless of which stream it
    /// follows, learns the symbol is halted.
    Terminal { symbol: Symbol, reason: String },
}

/// A completed submission's outbound payload, handed to the multiplexer
/// once the engine has released its per-symbol critical section.
#[derive(Debug)]
pub struct PublishBatch {
    pub trades: Vec<Trade>,
    pub book_update: Option<(Symbol, Vec<LevelView>, Vec<LevelView>, SequenceNumber)>,
    pub bbo_update: Option<(Symbol, Bbo, SequenceNumber)>,
    pub terminal: Option<(Symbol, String)>,
}

struct TopicSubscribers {
    senders: Mutex<Vec<Sender<Event>>>,
}

impl TopicSubscribers {
    fn new() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }

    fn subscribe(&self, capacity: usize) -> Receiver<Event> {
        let (tx, rx) = bounded(capacity);
        self.senders.lock().unwrap().push(tx);
        rx
    }

    /// Drop-newest-on-overflow: a full queue keeps its subscriber but
    /// loses this one event (coalescible snapshots).
    fn publish_coalescible(&self, event: &Event) {
        let mut senders = self.senders.lock().unwrap();
        senders.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) | Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        });
    }

    /// Disconnect-on-overflow: trades are never dropped silently, so a
    /// full queue costs the subscriber its subscription instead of the
    /// event.
    fn publish_lossless(&self, event: &Event) {
        let mut senders = self.senders.lock().unwrap();
        senders.retain(|tx| !matches!(
            tx.try_send(event.clone()),
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_))
        ));
    }
}

/// Process-wide fan-out point. One instance is shared by every symbol's
/// engine inside the registry.
pub struct EventMultiplexer {
    capacity: usize,
    orderbook: TopicSubscribers,
    trades: TopicSubscribers,
    bbo: TopicSubscribers,
}

impl EventMultiplexer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            orderbook: TopicSubscribers::new(),
            trades: TopicSubscribers::new(),
            bbo: TopicSubscribers::new(),
        }
    }

    pub fn subscribe(&self, topic: Topic) -> Receiver<Event> {
        match topic {
            Topic::OrderBook => self.orderbook.subscribe(self.capacity),
            Topic::Trades => self.trades.subscribe(self.capacity),
            Topic::Bbo => self.bbo.subscribe(self.capacity),
        }
    }

    pub fn publish_trade(&self, trade: Trade) {
        self.trades.publish_lossless(&Event::Trade(trade));
    }

    pub fn publish_book_update(
        &self,
        symbol: Symbol,
        bids: Vec<LevelView>,
        asks: Vec<LevelView>,
        sequence_number: SequenceNumber,
    ) {
        self.orderbook.publish_coalescible(&Event::OrderBookUpdate {
            symbol,
            bids,
            asks,
            sequence_number,
        });
    }

    pub fn publish_bbo(&self, symbol: Symbol, bbo: Bbo, sequence_number: SequenceNumber) {
        self.bbo.publish_coalescible(&Event::BboUpdate {
            symbol,
            bbo,
            sequence_number,
        });
    }

    /// A halt notice must reach every subscriber on every topic, so it
    /// always uses the lossless path regardless of which topic it rides.
    pub fn publish_terminal(&self, symbol: Symbol, reason: String) {
        let event = Event::Terminal { symbol, reason };
        self.orderbook.publish_lossless(&event);
        self.trades.publish_lossless(&event);
        self.bbo.publish_lossless(&event);
    }

    /// Publish one submission's effects in the mandated order: trades in
    /// match order, then the orderbook delta, then BBO only if it
    /// changed, then a terminal notice if this submission quarantined the
    /// symbol. Must be called after the engine has released its book lock
    /// — never while holding it.
    pub fn publish_batch(&self, batch: PublishBatch) {
        for trade in batch.trades {
            self.publish_trade(trade);
        }
        if let Some((symbol, bids, asks, seq)) = batch.book_update {
            self.publish_book_update(symbol, bids, asks, seq);
        }
        if let Some((symbol, bbo, seq)) = batch.bbo_update {
            self.publish_bbo(symbol, bbo, seq);
        }
        if let Some((symbol, reason)) = batch.terminal {
            self.publish_terminal(symbol, reason);
        }
    }
}
