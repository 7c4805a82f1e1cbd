use std::collections::BTreeMap;

use crate::matching::compatibility::compatible;
use crate::models::ticket::Ticket;

/// Groups tickets by their bucket key, preserving the incoming
/// (creation-time) order within each group. BTreeMap keeps bucket
/// iteration deterministic for a given batch.
pub fn bucket_tickets(tickets: &[Ticket]) -> BTreeMap<String, Vec<&Ticket>> {
    let mut buckets: BTreeMap<String, Vec<&Ticket>> = BTreeMap::new();
    for ticket in tickets {
        buckets.entry(ticket.bucket.clone()).or_default().push(ticket);
    }
    buckets
}

/// First-fit greedy pairing within one bucket: for each unprocessed ticket,
/// take the first later unprocessed ticket that is compatible, mark both
/// used and move on. Favors low latency over global match quality.
pub fn find_pairs<'a>(bucket: &[&'a Ticket]) -> Vec<(&'a Ticket, &'a Ticket)> {
    let mut used = vec![false; bucket.len()];
    let mut pairs = Vec::new();

    for i in 0..bucket.len() {
        if used[i] {
            continue;
        }
        for j in (i + 1)..bucket.len() {
            if used[j] {
                continue;
            }
            if compatible(bucket[i], bucket[j]) {
                used[i] = true;
                used[j] = true;
                pairs.push((bucket[i], bucket[j]));
                break;
            }
        }
    }

    pairs
}
