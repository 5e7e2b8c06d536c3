use crate::reward::RewardGrant;
use crate::types::GrantSource;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantEvent {
    pub source: GrantSource,
    pub grant: RewardGrant,
}

/// Fan-out of reward grants to whoever renders or applies them.
///
/// Sending never blocks and never fails for lack of listeners; a receiver
/// that falls more than `capacity` events behind sees `Lagged` and skips
/// ahead.
#[derive(Debug, Clone)]
pub struct GrantChannel {
    tx: broadcast::Sender<GrantEvent>,
}

impl GrantChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GrantEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&self, source: GrantSource, grant: RewardGrant) -> usize {
        match self.tx.send(GrantEvent { source, grant }) {
            Ok(n) => n,
            Err(_) => {
                tracing::debug!("grant published with no subscribers");
                0
            }
        }
    }

    pub fn publish_all(&self, source: GrantSource, grants: &[RewardGrant]) {
        for grant in grants {
            self.publish(source, grant.clone());
        }
    }
}

impl Default for GrantChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Pull everything currently buffered for `rx` without waiting.
pub fn drain(rx: &mut broadcast::Receiver<GrantEvent>) -> Vec<GrantEvent> {
    use broadcast::error::TryRecvError;

    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "grant receiver lagged; events dropped");
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_fine() {
        let channel = GrantChannel::default();
        assert_eq!(channel.publish(GrantSource::Achievement, RewardGrant::xp("a", 1)), 0);
    }

    #[test]
    fn every_subscriber_sees_every_grant() {
        let channel = GrantChannel::new(8);
        let mut ui = channel.subscribe();
        let mut store = channel.subscribe();
        assert_eq!(channel.subscriber_count(), 2);

        let grants = vec![
            RewardGrant::xp("ship-a-feature", 300),
            RewardGrant::skill("ship-a-feature", "teamwork", 50),
        ];
        channel.publish_all(GrantSource::Quest, &grants);

        let seen_ui = drain(&mut ui);
        let seen_store = drain(&mut store);
        assert_eq!(seen_ui, seen_store);
        assert_eq!(seen_ui.len(), 2);
        assert_eq!(seen_ui[0].source, GrantSource::Quest);
        assert_eq!(seen_ui[1].grant, grants[1]);
    }

    #[test]
    fn lagging_receiver_keeps_the_newest_events() {
        let channel = GrantChannel::new(2);
        let mut rx = channel.subscribe();
        for i in 0..5 {
            channel.publish(GrantSource::Achievement, RewardGrant::xp(format!("a{i}"), i));
        }
        let events = drain(&mut rx);
        let ids: Vec<_> = events.iter().map(|e| e.grant.target_id.as_str()).collect();
        assert_eq!(ids, vec!["a3", "a4"]);
    }
}
