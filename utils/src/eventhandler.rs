// Copyright (c) 2022 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/mintlayer/mintlayer-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;

use logging::log;
use parking_lot::{Condvar, Mutex};

pub type EventHandler<E> = Arc<dyn Fn(E) + Send + Sync>;

/// Number of handler calls that were spawned but have not returned yet
#[derive(Default)]
struct PendingCalls {
    count: Mutex<usize>,
    all_done: Condvar,
}

impl PendingCalls {
    fn start(self: &Arc<Self>) -> PendingCallGuard {
        *self.count.lock() += 1;
        PendingCallGuard(Arc::clone(self))
    }

    fn wait_for_zero(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.all_done.wait(&mut count);
        }
    }
}

/// Decrements the pending counter when the handler call ends, even if it panics
struct PendingCallGuard(Arc<PendingCalls>);

impl Drop for PendingCallGuard {
    fn drop(&mut self) {
        let mut count = self.0.count.lock();
        *count -= 1;
        if *count == 0 {
            self.0.all_done.notify_all();
        }
    }
}

/// Delivers events to subscribers on a background thread, in broadcast order.
pub struct EventsController<E> {
    event_subscribers: Vec<EventHandler<E>>,
    events_broadcaster: slave_pool::ThreadPool,
    pending: Arc<PendingCalls>,
}

impl<E: Clone + Send + Sync + 'static> EventsController<E> {
    pub fn new() -> Self {
        let events_broadcaster = slave_pool::ThreadPool::new();
        // A single worker keeps the delivery order equal to the broadcast order.
        events_broadcaster.set_threads(1).expect("Event thread-pool starting failed");
        Self {
            event_subscribers: Vec::new(),
            events_broadcaster,
            pending: Arc::new(PendingCalls::default()),
        }
    }

    pub fn subscribers(&self) -> &[EventHandler<E>] {
        &self.event_subscribers
    }

    pub fn subscribe_to_events(&mut self, handler: EventHandler<E>) {
        self.event_subscribers.push(handler)
    }

    /// Blocks until every event broadcast so far has been handled by every subscriber
    pub fn wait_for_all_events(&self) {
        self.pending.wait_for_zero();
    }

    pub fn broadcast(&self, event: E) {
        log::trace!("Broadcasting an event to {} subscribers", self.event_subscribers.len());
        for handler in &self.event_subscribers {
            let guard = self.pending.start();
            let handler = Arc::clone(handler);
            let event = event.clone();
            self.events_broadcaster.spawn(move || {
                let _guard = guard;
                handler(event)
            });
        }
    }
}

impl<E: Clone + Send + Sync + 'static> Default for EventsController<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::*;

    #[derive(Eq, PartialEq, Copy, Clone, Debug)]
    enum Event {
        Slow(u32),
        Fast(u32),
    }

    #[test]
    fn events_are_handled_in_broadcast_order() {
        let mut controller = EventsController::<Event>::new();
        let handled = Arc::new(Mutex::new(Vec::new()));

        controller.subscribe_to_events({
            let handled = Arc::clone(&handled);
            Arc::new(move |event| {
                if let Event::Slow(_) = event {
                    std::thread::sleep(Duration::from_millis(200));
                }
                handled.lock().push(event);
            })
        });

        controller.broadcast(Event::Slow(1));
        controller.broadcast(Event::Fast(2));
        controller.broadcast(Event::Slow(3));
        controller.wait_for_all_events();

        assert_eq!(
            *handled.lock(),
            vec![Event::Slow(1), Event::Fast(2), Event::Slow(3)]
        );
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(4)]
    fn every_subscriber_gets_every_event(#[case] subscribers: usize) {
        let mut controller = EventsController::<Event>::new();
        let calls = Arc::new(Mutex::new(0usize));
        for _ in 0..subscribers {
            let calls = Arc::clone(&calls);
            controller.subscribe_to_events(Arc::new(move |_| *calls.lock() += 1));
        }

        for i in 0..10 {
            controller.broadcast(Event::Fast(i));
        }
        controller.wait_for_all_events();

        assert_eq!(controller.subscribers().len(), subscribers);
        assert_eq!(*calls.lock(), subscribers * 10);
    }
}
