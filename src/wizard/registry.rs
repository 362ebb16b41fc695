//! Typed event subscription registry
//!
//! Engine events are delivered to handlers registered per topic. A `Once`
//! handler is deregistered automatically after its first delivery; a
//! `Persistent` handler stays until [`SubscriptionRegistry::clear`]. All
//! registrations for a run must be installed before the triggering engine
//! call is issued -- there is no buffering or replay.
//!
//! Handlers receive the exclusively-owned context (the progress model)
//! alongside the event, keeping the single-writer rule without locks.

use crate::engine::{EngineEvent, Topic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Once,
    Persistent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Handler<Ctx> = Box<dyn FnMut(&mut Ctx, &EngineEvent)>;

struct Subscription<Ctx> {
    id: SubscriptionId,
    topic: Topic,
    delivery: Delivery,
    handler: Handler<Ctx>,
}

pub struct SubscriptionRegistry<Ctx> {
    subscriptions: Vec<Subscription<Ctx>>,
    next_id: u64,
}

impl<Ctx> Default for SubscriptionRegistry<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx> SubscriptionRegistry<Ctx> {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe<F>(&mut self, topic: Topic, delivery: Delivery, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut Ctx, &EngineEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            topic,
            delivery,
            handler: Box::new(handler),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.retain(|s| s.id != id);
    }

    /// Deliver an event to every handler subscribed to its topic, spending
    /// `Once` subscriptions as it goes. Returns how many handlers ran.
    pub fn dispatch(&mut self, ctx: &mut Ctx, event: &EngineEvent) -> usize {
        let topic = event.topic();
        let mut delivered = 0;
        let mut spent = Vec::new();

        for subscription in &mut self.subscriptions {
            if subscription.topic != topic {
                continue;
            }
            (subscription.handler)(ctx, event);
            delivered += 1;
            if subscription.delivery == Delivery::Once {
                spent.push(subscription.id);
            }
        }

        self.subscriptions.retain(|s| !spent.contains(&s.id));
        delivered
    }

    /// Teardown: drop every handler so stale updates from a superseded run
    /// cannot reach fresh state.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding_complete() -> EngineEvent {
        EngineEvent::FindingComplete
    }

    fn relocating_start() -> EngineEvent {
        EngineEvent::RelocatingStart
    }

    #[test]
    fn once_handlers_deregister_after_first_delivery() {
        let mut registry: SubscriptionRegistry<u32> = SubscriptionRegistry::new();
        registry.subscribe(Topic::FindingComplete, Delivery::Once, |count, _| {
            *count += 1;
        });

        let mut count = 0;
        assert_eq!(registry.dispatch(&mut count, &finding_complete()), 1);
        assert_eq!(registry.dispatch(&mut count, &finding_complete()), 0);
        assert_eq!(count, 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn persistent_handlers_fire_every_time() {
        let mut registry: SubscriptionRegistry<u32> = SubscriptionRegistry::new();
        registry.subscribe(Topic::FindingComplete, Delivery::Persistent, |count, _| {
            *count += 1;
        });

        let mut count = 0;
        for _ in 0..3 {
            registry.dispatch(&mut count, &finding_complete());
        }
        assert_eq!(count, 3);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn dispatch_only_reaches_matching_topic() {
        let mut registry: SubscriptionRegistry<Vec<&'static str>> = SubscriptionRegistry::new();
        registry.subscribe(Topic::FindingComplete, Delivery::Persistent, |log, _| {
            log.push("finding");
        });
        registry.subscribe(Topic::RelocatingStart, Delivery::Once, |log, _| {
            log.push("relocating");
        });

        let mut log = Vec::new();
        registry.dispatch(&mut log, &relocating_start());
        registry.dispatch(&mut log, &finding_complete());
        assert_eq!(log, vec!["relocating", "finding"]);
    }

    #[test]
    fn unsubscribe_removes_a_single_registration() {
        let mut registry: SubscriptionRegistry<u32> = SubscriptionRegistry::new();
        let keep = registry.subscribe(Topic::FindingComplete, Delivery::Persistent, |c, _| *c += 1);
        let drop = registry.subscribe(Topic::FindingComplete, Delivery::Persistent, |c, _| *c += 10);

        registry.unsubscribe(drop);
        let mut count = 0;
        registry.dispatch(&mut count, &finding_complete());
        assert_eq!(count, 1);

        registry.unsubscribe(keep);
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_tears_down_everything() {
        let mut registry: SubscriptionRegistry<u32> = SubscriptionRegistry::new();
        registry.subscribe(Topic::FindingFiles, Delivery::Persistent, |_, _| {});
        registry.subscribe(Topic::FindingComplete, Delivery::Once, |_, _| {});
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());

        let mut count = 0;
        assert_eq!(registry.dispatch(&mut count, &finding_complete()), 0);
    }
}
