//! In-process event bus backed by a tokio broadcast channel.

use tokio::sync::broadcast;

use greenhouse_domain::event::Event;

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing never blocks and succeeds even when there are no active
/// subscribers (the event is simply dropped). Cloning yields another handle
/// onto the same channel.
#[derive(Clone)]
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: Event) {
        // send only fails when nobody is listening
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenhouse_domain::event::EventType;
    use greenhouse_domain::zone::Zone;

    #[tokio::test]
    async fn should_deliver_event_to_every_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.clone().subscribe();

        let event = Event::new(EventType::DecayStarted, Some(Zone::A), serde_json::json!({}));
        let event_id = event.id;
        bus.publish(event);

        assert_eq!(rx1.recv().await.unwrap().id, event_id);
        assert_eq!(rx2.recv().await.unwrap().id, event_id);
    }

    #[test]
    fn should_not_fail_without_subscribers() {
        let bus = InProcessEventBus::new(4);
        bus.publish(Event::new(EventType::RobotActivated, None, serde_json::json!({})));
    }

    #[tokio::test]
    async fn should_not_replay_events_published_before_subscription() {
        let bus = InProcessEventBus::new(16);
        bus.publish(Event::new(EventType::DecayStarted, None, serde_json::json!({})));

        let mut rx = bus.subscribe();
        let later = Event::new(EventType::DecayFinished, None, serde_json::json!({}));
        let later_id = later.id;
        bus.publish(later);

        assert_eq!(rx.recv().await.unwrap().id, later_id);
    }
}
