use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assumptions::ProjectionInput;
use crate::error::LeaseProjectionError;
use crate::LeaseProjectionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferOrigin {
    OurOffer,
    TheirCounter,
}

/// One proposal in a negotiation's sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub proposal_id: String,
    pub offer_number: u32,
    pub origin: OfferOrigin,
    /// Proposal this one was duplicated from, for counter-offers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_proposal_id: Option<String>,
    pub input: ProjectionInput,
    pub created_at: DateTime<Utc>,
}

/// Ordered offer chain of one negotiation.
///
/// Offer numbers are assigned under the chain's lock, so concurrent
/// counter-offers never share a number.
#[derive(Debug)]
pub struct Negotiation {
    pub id: String,
    pub name: String,
    offers: Mutex<Vec<Offer>>,
}

impl Negotiation {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Negotiation {
            id: id.into(),
            name: name.into(),
            offers: Mutex::new(Vec::new()),
        }
    }

    /// Append a fresh offer at the end of the sequence.
    pub fn add_offer(
        &self,
        proposal_id: impl Into<String>,
        origin: OfferOrigin,
        input: ProjectionInput,
    ) -> LeaseProjectionResult<Offer> {
        let mut offers = self.lock();
        let offer = Offer {
            proposal_id: unique_id(&offers, proposal_id.into())?,
            offer_number: next_offer_number(&offers),
            origin,
            parent_proposal_id: None,
            input,
            created_at: Utc::now(),
        };
        offers.push(offer.clone());
        Ok(offer)
    }

    /// Duplicate `parent_proposal_id` as a new offer with the next number.
    pub fn create_counter_offer(
        &self,
        parent_proposal_id: &str,
        proposal_id: impl Into<String>,
        origin: OfferOrigin,
    ) -> LeaseProjectionResult<Offer> {
        let mut offers = self.lock();
        let parent = offers
            .iter()
            .find(|o| o.proposal_id == parent_proposal_id)
            .ok_or_else(|| {
                LeaseProjectionError::NotFound(format!(
                    "Proposal '{parent_proposal_id}' in negotiation '{}'",
                    self.id
                ))
            })?;

        let mut input = parent.input.clone();
        input.proposal_name = format!("{} (counter)", parent.input.proposal_name);

        let offer = Offer {
            proposal_id: unique_id(&offers, proposal_id.into())?,
            offer_number: next_offer_number(&offers),
            origin,
            parent_proposal_id: Some(parent_proposal_id.to_string()),
            input,
            created_at: Utc::now(),
        };
        info!(
            negotiation = %self.id,
            offer_number = offer.offer_number,
            parent = parent_proposal_id,
            "counter-offer created"
        );
        offers.push(offer.clone());
        Ok(offer)
    }

    /// Rewrite the sequence in the given order and renumber from 1.
    /// `proposal_ids` must be a permutation of the current offers.
    pub fn reorder(&self, proposal_ids: &[String]) -> LeaseProjectionResult<()> {
        let mut offers = self.lock();

        let current: HashSet<&str> = offers.iter().map(|o| o.proposal_id.as_str()).collect();
        let requested: HashSet<&str> = proposal_ids.iter().map(String::as_str).collect();
        if proposal_ids.len() != offers.len()
            || requested.len() != proposal_ids.len()
            || current != requested
        {
            return Err(LeaseProjectionError::invalid(
                "proposal_ids",
                "Reorder must list every offer of the negotiation exactly once",
            ));
        }

        let mut reordered = Vec::with_capacity(offers.len());
        for (i, id) in proposal_ids.iter().enumerate() {
            if let Some(pos) = offers.iter().position(|o| &o.proposal_id == id) {
                let mut offer = offers.swap_remove(pos);
                offer.offer_number = i as u32 + 1;
                reordered.push(offer);
            }
        }
        *offers = reordered;
        Ok(())
    }

    /// Snapshot of the offers in sequence order.
    pub fn offers(&self) -> Vec<Offer> {
        self.lock().clone()
    }

    pub fn offer(&self, proposal_id: &str) -> Option<Offer> {
        self.lock().iter().find(|o| o.proposal_id == proposal_id).cloned()
    }

    pub fn latest(&self) -> Option<Offer> {
        self.lock().iter().max_by_key(|o| o.offer_number).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Offer>> {
        self.offers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn next_offer_number(offers: &[Offer]) -> u32 {
    offers.iter().map(|o| o.offer_number).max().unwrap_or(0) + 1
}

fn unique_id(offers: &[Offer], proposal_id: String) -> LeaseProjectionResult<String> {
    if offers.iter().any(|o| o.proposal_id == proposal_id) {
        return Err(LeaseProjectionError::invalid(
            "proposal_id",
            format!("Proposal '{proposal_id}' is already part of this negotiation"),
        ));
    }
    Ok(proposal_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::sample_input;
    use std::sync::Arc;
    use std::thread;

    fn negotiation() -> Negotiation {
        let n = Negotiation::new("neg-1", "Campus A lease");
        n.add_offer("p-1", OfferOrigin::OurOffer, sample_input()).unwrap();
        n
    }

    #[test]
    fn test_counter_offer_duplicates_parent() {
        let n = negotiation();
        let counter = n
            .create_counter_offer("p-1", "p-2", OfferOrigin::TheirCounter)
            .unwrap();
        assert_eq!(counter.offer_number, 2);
        assert_eq!(counter.parent_proposal_id.as_deref(), Some("p-1"));
        assert_eq!(counter.input.rent, sample_input().rent);
        assert_eq!(counter.input.proposal_name, "Campus A - initial offer (counter)");
        assert_eq!(n.latest().unwrap().proposal_id, "p-2");
    }

    #[test]
    fn test_counter_offer_of_unknown_parent() {
        let n = negotiation();
        assert!(matches!(
            n.create_counter_offer("p-9", "p-2", OfferOrigin::OurOffer),
            Err(LeaseProjectionError::NotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_proposal_id_rejected() {
        let n = negotiation();
        assert!(n
            .create_counter_offer("p-1", "p-1", OfferOrigin::OurOffer)
            .is_err());
    }

    #[test]
    fn test_concurrent_counter_offers_get_unique_numbers() {
        let n = Arc::new(negotiation());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let n = Arc::clone(&n);
                thread::spawn(move || {
                    n.create_counter_offer("p-1", format!("c-{i}"), OfferOrigin::TheirCounter)
                        .unwrap()
                        .offer_number
                })
            })
            .collect();
        let mut numbers: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, (2..=9).collect::<Vec<u32>>());
    }

    #[test]
    fn test_reorder_renumbers_sequence() {
        let n = negotiation();
        n.create_counter_offer("p-1", "p-2", OfferOrigin::TheirCounter)
            .unwrap();
        n.create_counter_offer("p-2", "p-3", OfferOrigin::OurOffer)
            .unwrap();
        n.reorder(&["p-3".into(), "p-1".into(), "p-2".into()]).unwrap();
        let order: Vec<(String, u32)> = n
            .offers()
            .into_iter()
            .map(|o| (o.proposal_id, o.offer_number))
            .collect();
        assert_eq!(
            order,
            vec![("p-3".into(), 1), ("p-1".into(), 2), ("p-2".into(), 3)]
        );
        // numbering continues after the highest number
        let next = n
            .create_counter_offer("p-3", "p-4", OfferOrigin::TheirCounter)
            .unwrap();
        assert_eq!(next.offer_number, 4);
    }

    #[test]
    fn test_reorder_rejects_non_permutation() {
        let n = negotiation();
        n.create_counter_offer("p-1", "p-2", OfferOrigin::TheirCounter)
            .unwrap();
        assert!(n.reorder(&["p-1".into()]).is_err());
        assert!(n.reorder(&["p-1".into(), "p-1".into()]).is_err());
        assert!(n.reorder(&["p-1".into(), "p-9".into()]).is_err());
        // unchanged after a rejected reorder
        assert_eq!(n.offers()[0].proposal_id, "p-1");
    }
}
