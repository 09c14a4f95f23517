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

use std::sync::{Arc, Mutex};

use chainstate::ChainstateEvent;
use chainstate_test_framework::TestChainstate;

mod concurrency_tests;
mod events_tests;
mod initialization_tests;
mod orphans_tests;

#[ctor::ctor]
fn init() {
    logging::init_logging();
}

type EventList = Arc<Mutex<Vec<ChainstateEvent>>>;

/// Record every event the chainstate broadcasts from now on
fn subscribe(chainstate: &mut TestChainstate) -> EventList {
    let events = EventList::default();
    let events_ = Arc::clone(&events);
    chainstate.subscribe_to_events(Arc::new(move |event: ChainstateEvent| {
        events_.lock().unwrap().push(event)
    }));
    events
}
