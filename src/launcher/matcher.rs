//! # Offer-to-descriptor matching.
//!
//! Matching is name-set containment: an offer matches a descriptor when it
//! carries every resource name the descriptor requests. Amounts are not
//! compared here; quantitative arithmetic belongs to the caller's filter.
//!
//! Assignment is greedy and deterministic: descriptors bind in input order,
//! each to the first unbound offer (in delivery order) that matches it, one
//! descriptor per offer. Packing several descriptors into one offer, or
//! keeping promising offers across batches, is intentionally not done.

use crate::model::{Offer, TaskDescriptor};

/// True if `offer` carries every resource name `descriptor` requests.
pub(crate) fn offer_matches(offer: &Offer, descriptor: &TaskDescriptor) -> bool {
    descriptor
        .resources
        .iter()
        .all(|need| offer.has_resource(&need.name))
}

/// Proposes a full assignment: for each descriptor (in order) the index of
/// the offer chosen to carry it. `None` if any descriptor stays unmatched.
pub(crate) fn propose(offers: &[Offer], descriptors: &[TaskDescriptor]) -> Option<Vec<usize>> {
    let mut bound = vec![false; offers.len()];
    let mut chosen = Vec::with_capacity(descriptors.len());

    for descriptor in descriptors {
        let index = offers
            .iter()
            .enumerate()
            .find(|(i, offer)| !bound[*i] && offer_matches(offer, descriptor))
            .map(|(i, _)| i)?;
        bound[index] = true;
        chosen.push(index);
    }

    Some(chosen)
}
