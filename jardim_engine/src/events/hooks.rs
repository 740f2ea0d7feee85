use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{
    BonusGrantedEvent,
    DelinquencyChangedEvent,
    EventHandler,
    EventProducer,
    Handler,
    OrderDeliveredEvent,
    WithdrawalDecidedEvent,
};

type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Default, Clone)]
pub struct EventProducers {
    pub bonus_granted_producer: Vec<EventProducer<BonusGrantedEvent>>,
    pub delinquency_changed_producer: Vec<EventProducer<DelinquencyChangedEvent>>,
    pub withdrawal_decided_producer: Vec<EventProducer<WithdrawalDecidedEvent>>,
    pub order_delivered_producer: Vec<EventProducer<OrderDeliveredEvent>>,
}

pub struct EventHandlers {
    pub on_bonus_granted: Option<EventHandler<BonusGrantedEvent>>,
    pub on_delinquency_changed: Option<EventHandler<DelinquencyChangedEvent>>,
    pub on_withdrawal_decided: Option<EventHandler<WithdrawalDecidedEvent>>,
    pub on_order_delivered: Option<EventHandler<OrderDeliveredEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_bonus_granted = hooks.on_bonus_granted.map(|f| EventHandler::new(buffer_size, f));
        let on_delinquency_changed = hooks.on_delinquency_changed.map(|f| EventHandler::new(buffer_size, f));
        let on_withdrawal_decided = hooks.on_withdrawal_decided.map(|f| EventHandler::new(buffer_size, f));
        let on_order_delivered = hooks.on_order_delivered.map(|f| EventHandler::new(buffer_size, f));
        Self { on_bonus_granted, on_delinquency_changed, on_withdrawal_decided, on_order_delivered }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_bonus_granted {
            result.bonus_granted_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_delinquency_changed {
            result.delinquency_changed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_withdrawal_decided {
            result.withdrawal_decided_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_delivered {
            result.order_delivered_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns a task for every registered handler. The tasks end once all the producers have been dropped.
    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_bonus_granted {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_delinquency_changed {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_withdrawal_decided {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_order_delivered {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_bonus_granted: Option<Handler<BonusGrantedEvent>>,
    pub on_delinquency_changed: Option<Handler<DelinquencyChangedEvent>>,
    pub on_withdrawal_decided: Option<Handler<WithdrawalDecidedEvent>>,
    pub on_order_delivered: Option<Handler<OrderDeliveredEvent>>,
}

impl EventHooks {
    pub fn on_bonus_granted<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(BonusGrantedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_bonus_granted = Some(Arc::new(f));
        self
    }

    pub fn on_delinquency_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(DelinquencyChangedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_delinquency_changed = Some(Arc::new(f));
        self
    }

    pub fn on_withdrawal_decided<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(WithdrawalDecidedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_withdrawal_decided = Some(Arc::new(f));
        self
    }

    pub fn on_order_delivered<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderDeliveredEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_order_delivered = Some(Arc::new(f));
        self
    }
}
