//! # Assignment filters.
//!
//! Before accepting a proposed offer-to-task assignment, the launcher asks
//! an optional [`OfferFilter`] whether the proposal is acceptable. A filter
//! sees the whole proposal at once, so it can express cross-offer
//! constraints the matcher cannot.
//!
//! Closures implement [`OfferFilter`] directly; a handful of common
//! constraints ship as named types.

use crate::model::{Offer, SlaveId, TaskDescriptor};

/// A proposed assignment: each chosen offer with the tasks bound to it.
pub struct Proposal<'a> {
    entries: Vec<ProposalEntry<'a>>,
}

/// One offer of a proposal and the tasks it would carry.
pub struct ProposalEntry<'a> {
    /// The offer to accept.
    pub offer: &'a Offer,
    /// Descriptors bound to the offer, in input order.
    pub tasks: Vec<&'a TaskDescriptor>,
}

impl<'a> Proposal<'a> {
    pub(crate) fn new(entries: Vec<ProposalEntry<'a>>) -> Self {
        Self { entries }
    }

    /// Entries of the proposal, ordered by offer delivery.
    pub fn entries(&self) -> &[ProposalEntry<'a>] {
        &self.entries
    }
}

/// Predicate over a proposed assignment.
///
/// Returning `false` declines every offer of the batch; the launcher then
/// waits for later offers. `None` in
/// [`TaskLauncher::submit`](crate::launcher::TaskLauncher::submit) accepts
/// everything.
pub trait OfferFilter: Send + Sync {
    /// True if the proposed assignment is acceptable.
    fn accept(&self, proposal: &Proposal<'_>) -> bool;
}

impl<F> OfferFilter for F
where
    F: Fn(&Proposal<'_>) -> bool + Send + Sync,
{
    fn accept(&self, proposal: &Proposal<'_>) -> bool {
        self(proposal)
    }
}

/// Accepts only assignments where every task lands on a distinct slave.
pub struct DistinctSlaves;

impl OfferFilter for DistinctSlaves {
    fn accept(&self, proposal: &Proposal<'_>) -> bool {
        let mut seen: Vec<&SlaveId> = Vec::new();
        for entry in proposal.entries() {
            if entry.tasks.len() > 1 {
                return false;
            }
            if seen.contains(&&entry.offer.slave_id) {
                return false;
            }
            seen.push(&entry.offer.slave_id);
        }
        true
    }
}

/// Accepts only assignments placed entirely on one specific slave.
pub struct OnSlave(pub SlaveId);

impl OfferFilter for OnSlave {
    fn accept(&self, proposal: &Proposal<'_>) -> bool {
        proposal
            .entries()
            .iter()
            .all(|entry| entry.offer.slave_id == self.0)
    }
}

/// Accepts only assignments binding at most `k` tasks to any one offer.
pub struct MaxTasksPerOffer(pub usize);

impl OfferFilter for MaxTasksPerOffer {
    fn accept(&self, proposal: &Proposal<'_>) -> bool {
        proposal
            .entries()
            .iter()
            .all(|entry| entry.tasks.len() <= self.0)
    }
}
