//! # Task launcher: offer consumption and aggregate launch results.
//!
//! [`TaskLauncher::submit`] turns a set of task descriptors into launched
//! tasks by consuming the offer stream: per batch it proposes a greedy
//! assignment, asks the filter, launches on acceptance, and declines every
//! offer it does not use.
//!
//! ## Rules
//! - Every offer of a processed batch is either part of the launch command
//!   or declined — never both, never neither.
//! - All-or-nothing per batch: a batch that cannot cover every descriptor is
//!   declined wholesale and the launcher waits for the next one. No offer is
//!   retained across batches.
//! - A synchronous driver rejection declines the attempted offers and keeps
//!   the submit pending; a later batch may satisfy it.
//! - A panicking filter counts as a rejection.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::events::Event;
use crate::launcher::filter::{OfferFilter, Proposal, ProposalEntry};
use crate::launcher::matcher::propose;
use crate::model::{Offer, OfferId, TaskDescriptor, TaskInfo};
use crate::session::{LaunchedTask, Session};

/// Launches sets of tasks by consuming resource offers.
pub struct TaskLauncher {
    session: Arc<Session>,
}

impl TaskLauncher {
    /// Creates a launcher submitting through the given session.
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Launches one task per descriptor, resolving once every task is
    /// running. The returned infos are in input descriptor order.
    ///
    /// `filter` vets each proposed assignment; `None` accepts everything.
    /// An empty descriptor list resolves immediately without touching the
    /// offer stream. The first failing per-task result fails the whole
    /// submit with that cause.
    pub async fn submit(
        &self,
        descriptors: Vec<TaskDescriptor>,
        filter: Option<Arc<dyn OfferFilter>>,
    ) -> Result<Vec<TaskInfo>, SessionError> {
        if descriptors.is_empty() {
            return Ok(Vec::new());
        }

        let mut sub = self.session.events();

        loop {
            let offers = match sub.next().await {
                Some(Event::Offers { offers }) => offers,
                Some(_) => continue,
                None => return Err(SessionError::ConnectionLost),
            };
            if offers.is_empty() {
                continue;
            }

            let Some(chosen) = propose(&offers, &descriptors) else {
                debug!(offers = offers.len(), "batch cannot cover all tasks; declining");
                self.decline_except(&offers, &[])?;
                continue;
            };

            let proposal = build_proposal(&offers, &descriptors, &chosen);
            if !accepts(filter.as_deref(), &proposal) {
                debug!("filter rejected assignment; declining batch");
                self.decline_except(&offers, &[])?;
                continue;
            }

            let tasks: Vec<TaskInfo> = descriptors
                .iter()
                .zip(&chosen)
                .map(|(descriptor, &index)| TaskInfo::from_descriptor(descriptor, &offers[index]))
                .collect();
            let offer_ids: Vec<OfferId> =
                chosen.iter().map(|&index| offers[index].id.clone()).collect();

            self.decline_except(&offers, &chosen)?;

            match self.session.launch(offer_ids.clone(), tasks) {
                Ok(watches) => {
                    drop(sub);
                    let outcomes = join_all(watches.into_iter().map(LaunchedTask::wait)).await;
                    return outcomes.into_iter().collect();
                }
                Err(err) => {
                    warn!(error = %err, "launch rejected; declining attempted offers");
                    for id in &offer_ids {
                        self.session.decline(id)?;
                    }
                    continue;
                }
            }
        }
    }

    /// Declines every offer whose index is not in `keep`.
    fn decline_except(&self, offers: &[Offer], keep: &[usize]) -> Result<(), SessionError> {
        for (index, offer) in offers.iter().enumerate() {
            if !keep.contains(&index) {
                self.session.decline(&offer.id)?;
            }
        }
        Ok(())
    }
}

/// Groups the chosen assignment into a filter-facing proposal, ordered by
/// offer delivery.
fn build_proposal<'a>(
    offers: &'a [Offer],
    descriptors: &'a [TaskDescriptor],
    chosen: &[usize],
) -> Proposal<'a> {
    let mut by_offer: BTreeMap<usize, Vec<&'a TaskDescriptor>> = BTreeMap::new();
    for (descriptor, &index) in descriptors.iter().zip(chosen) {
        by_offer.entry(index).or_default().push(descriptor);
    }

    Proposal::new(
        by_offer
            .into_iter()
            .map(|(index, tasks)| ProposalEntry {
                offer: &offers[index],
                tasks,
            })
            .collect(),
    )
}

/// Applies the filter, treating a panic as a rejection.
fn accepts(filter: Option<&dyn OfferFilter>, proposal: &Proposal<'_>) -> bool {
    let Some(filter) = filter else { return true };
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| filter.accept(proposal)))
        .unwrap_or_else(|_| {
            warn!("offer filter panicked; treating proposal as rejected");
            false
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::events::Bus;
    use crate::launcher::filter::DistinctSlaves;
    use crate::model::{FrameworkId, Resource, SlaveId, TaskId, TaskState};
    use crate::testkit::{registered, FakeDriver, FakeDriverBuilder};
    use std::time::Duration;
    use tokio::task::JoinHandle;

    fn offer(id: &str, slave: &str, names: &[&str]) -> Offer {
        Offer {
            id: OfferId::from(id),
            framework_id: FrameworkId::from("fw"),
            slave_id: SlaveId::from(slave),
            hostname: slave.to_string(),
            executor_id: None,
            resources: names.iter().map(|n| Resource::scalar(*n, 1.0)).collect(),
        }
    }

    fn descriptor(name: &str, needs: &[&str]) -> TaskDescriptor {
        TaskDescriptor::command(
            name,
            needs.iter().map(|n| Resource::scalar(*n, 1.0)).collect(),
            "run.sh",
        )
    }

    struct Harness {
        bus: Bus,
        driver: Arc<FakeDriver>,
        launcher: Arc<TaskLauncher>,
    }

    async fn harness(build: impl FnOnce(FakeDriverBuilder) -> FakeDriverBuilder) -> Harness {
        let bus = Bus::new(64);
        let builder = FakeDriver::builder(bus.clone())
            .on_start(vec![registered("fw")])
            .auto_running();
        let driver = build(builder).build();

        let session = Arc::new(Session::new(
            driver.clone(),
            bus.clone(),
            Config {
                connect_timeout: Duration::from_secs(5),
                launch_timeout: Duration::from_secs(5),
                kill_timeout: Duration::from_secs(5),
                bus_capacity: 64,
            },
        ));
        session.connect().await.expect("connect");

        Harness {
            bus,
            driver,
            launcher: Arc::new(TaskLauncher::new(session)),
        }
    }

    type Submit = JoinHandle<Result<Vec<TaskInfo>, SessionError>>;

    /// Spawns the submit and gives its subscription time to arm.
    async fn spawn_submit(
        harness: &Harness,
        descriptors: Vec<TaskDescriptor>,
        filter: Option<Arc<dyn OfferFilter>>,
    ) -> Submit {
        let launcher = Arc::clone(&harness.launcher);
        let handle = tokio::spawn(async move { launcher.submit(descriptors, filter).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle
    }

    async fn assert_pending(handle: &mut Submit) {
        let poll = tokio::time::timeout(Duration::from_millis(100), handle).await;
        assert!(poll.is_err(), "submit resolved but should stay pending");
    }

    async fn eventually(mut pred: impl FnMut() -> bool) {
        for _ in 0..200 {
            if pred() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn empty_descriptor_list_resolves_immediately() {
        let harness = harness(|b| b).await;
        let result = harness.launcher.submit(Vec::new(), None).await.unwrap();
        assert!(result.is_empty());
        assert!(harness.driver.launch_calls().is_empty());
        assert!(harness.driver.declined().is_empty());
    }

    #[tokio::test]
    async fn non_matching_offer_is_declined_and_submit_stays_pending() {
        let harness = harness(|b| b).await;
        let mut handle =
            spawn_submit(&harness, vec![descriptor("t", &["resource_a"])], None).await;

        harness.bus.publish(Event::Offers {
            offers: vec![offer("x", "s1", &["resource_x"])],
        });

        eventually(|| harness.driver.declined() == vec![OfferId::from("x")]).await;
        assert!(harness.driver.launch_calls().is_empty());
        assert_pending(&mut handle).await;
        handle.abort();
    }

    #[tokio::test]
    async fn matching_offer_launches_without_declines() {
        let harness = harness(|b| b).await;
        let handle = spawn_submit(&harness, vec![descriptor("t", &["resource_a"])], None).await;

        harness.bus.publish(Event::Offers {
            offers: vec![offer("a", "s1", &["resource_a"])],
        });

        let infos = handle.await.unwrap().unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].name, "t");
        assert!(harness.driver.declined().is_empty());

        let launches = harness.driver.launch_calls();
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].0, vec![OfferId::from("a")]);
    }

    #[tokio::test]
    async fn mixed_batch_declines_unused_and_launches_matching() {
        let harness = harness(|b| b).await;
        let handle = spawn_submit(&harness, vec![descriptor("t", &["resource_a"])], None).await;

        harness.bus.publish(Event::Offers {
            offers: vec![
                offer("x", "s1", &["resource_x"]),
                offer("a", "s2", &["resource_a"]),
            ],
        });

        let infos = handle.await.unwrap().unwrap();
        assert_eq!(infos.len(), 1);

        // every offer went exactly one way
        assert_eq!(harness.driver.declined(), vec![OfferId::from("x")]);
        let launches = harness.driver.launch_calls();
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].0, vec![OfferId::from("a")]);
    }

    #[tokio::test]
    async fn two_tasks_on_distinct_slaves_resolve_in_input_order() {
        let harness = harness(|b| b).await;
        let handle = spawn_submit(
            &harness,
            vec![descriptor("t-a", &["resource_a"]), descriptor("t-b", &["resource_b"])],
            Some(Arc::new(DistinctSlaves)),
        )
        .await;

        harness.bus.publish(Event::Offers {
            offers: vec![
                offer("o1", "s1", &["resource_a"]),
                offer("o2", "s2", &["resource_b"]),
            ],
        });

        let infos = handle.await.unwrap().unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].name, "t-a");
        assert_eq!(infos[1].name, "t-b");
        assert_eq!(infos[0].slave_id, SlaveId::from("s1"));
        assert_eq!(infos[1].slave_id, SlaveId::from("s2"));
        assert!(harness.driver.declined().is_empty());
    }

    #[tokio::test]
    async fn filter_rejection_declines_batch_and_keeps_pending() {
        let harness = harness(|b| b).await;
        let mut handle = spawn_submit(
            &harness,
            vec![descriptor("t-a", &["resource_a"]), descriptor("t-b", &["resource_b"])],
            Some(Arc::new(DistinctSlaves)),
        )
        .await;

        harness.bus.publish(Event::Offers {
            offers: vec![
                offer("o1", "s1", &["resource_a"]),
                offer("o2", "s1", &["resource_b"]),
            ],
        });

        eventually(|| harness.driver.declined().len() == 2).await;
        assert!(harness.driver.launch_calls().is_empty());
        assert_pending(&mut handle).await;
        handle.abort();
    }

    #[tokio::test]
    async fn sync_launch_failure_declines_and_retries_on_next_batch() {
        let harness = harness(|b| b.fail_next_launch("master rejected call")).await;
        let mut handle =
            spawn_submit(&harness, vec![descriptor("t", &["resource_a"])], None).await;

        harness.bus.publish(Event::Offers {
            offers: vec![offer("a1", "s1", &["resource_a"])],
        });
        eventually(|| harness.driver.declined() == vec![OfferId::from("a1")]).await;
        assert_pending(&mut handle).await;

        // a later batch satisfies the request
        harness.bus.publish(Event::Offers {
            offers: vec![offer("a2", "s1", &["resource_a"])],
        });
        let infos = handle.await.unwrap().unwrap();
        assert_eq!(infos.len(), 1);

        let launches = harness.driver.launch_calls();
        assert_eq!(launches.len(), 2);
        assert_eq!(launches[1].0, vec![OfferId::from("a2")]);
    }

    #[tokio::test]
    async fn panicking_filter_counts_as_rejection() {
        let harness = harness(|b| b).await;
        let panicky: Arc<dyn OfferFilter> =
            Arc::new(|_: &Proposal<'_>| -> bool { panic!("filter bug") });
        let mut handle =
            spawn_submit(&harness, vec![descriptor("t", &["resource_a"])], Some(panicky)).await;

        harness.bus.publish(Event::Offers {
            offers: vec![offer("a", "s1", &["resource_a"])],
        });

        eventually(|| harness.driver.declined() == vec![OfferId::from("a")]).await;
        assert!(harness.driver.launch_calls().is_empty());
        assert_pending(&mut handle).await;
        handle.abort();
    }

    #[tokio::test]
    async fn empty_batches_are_ignored() {
        let harness = harness(|b| b).await;
        let handle = spawn_submit(&harness, vec![descriptor("t", &["resource_a"])], None).await;

        harness.bus.publish(Event::Offers { offers: vec![] });
        harness.bus.publish(Event::Offers {
            offers: vec![offer("a", "s1", &["resource_a"])],
        });

        let infos = handle.await.unwrap().unwrap();
        assert_eq!(infos.len(), 1);
        assert!(harness.driver.declined().is_empty());
    }

    #[tokio::test]
    async fn failing_task_fails_the_aggregate() {
        let bus = Bus::new(64);
        // no auto-running: the test controls the task updates
        let driver = FakeDriver::builder(bus.clone()).on_start(vec![registered("fw")]).build();
        let session = Arc::new(Session::new(
            driver.clone(),
            bus.clone(),
            Config {
                connect_timeout: Duration::from_secs(5),
                launch_timeout: Duration::from_secs(5),
                kill_timeout: Duration::from_secs(5),
                bus_capacity: 64,
            },
        ));
        session.connect().await.unwrap();
        let launcher = Arc::new(TaskLauncher::new(session));

        let handle = {
            let launcher = Arc::clone(&launcher);
            tokio::spawn(async move {
                launcher
                    .submit(vec![descriptor("t", &["resource_a"])], None)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        bus.publish(Event::Offers {
            offers: vec![offer("a", "s1", &["resource_a"])],
        });
        eventually(|| !driver.launch_calls().is_empty()).await;

        let task_id: TaskId = driver.launch_calls()[0].1[0].clone();
        bus.publish(Event::TaskUpdate {
            task_id,
            state: TaskState::Error,
            message: Some("bad task description".to_string()),
        });

        let err = handle.await.unwrap().unwrap_err();
        assert_eq!(err.as_label(), "task_failed");
    }
}
