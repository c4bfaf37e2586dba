use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, NotificationFailedEvent, RegistrationCreatedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub registration_created_producer: Vec<EventProducer<RegistrationCreatedEvent>>,
    pub notification_failed_producer: Vec<EventProducer<NotificationFailedEvent>>,
}

pub struct EventHandlers {
    pub on_registration_created: Option<EventHandler<RegistrationCreatedEvent>>,
    pub on_notification_failed: Option<EventHandler<NotificationFailedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_registration_created = hooks.on_registration_created.map(|f| EventHandler::new(buffer_size, f));
        let on_notification_failed = hooks.on_notification_failed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_registration_created, on_notification_failed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_registration_created {
            result.registration_created_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_notification_failed {
            result.notification_failed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_registration_created {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_notification_failed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_registration_created: Option<Handler<RegistrationCreatedEvent>>,
    pub on_notification_failed: Option<Handler<NotificationFailedEvent>>,
}

impl EventHooks {
    pub fn on_registration_created<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(RegistrationCreatedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_registration_created = Some(Arc::new(f));
        self
    }

    pub fn on_notification_failed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(NotificationFailedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_notification_failed = Some(Arc::new(f));
        self
    }
}
