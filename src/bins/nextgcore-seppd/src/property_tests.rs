//! Property-based tests for the SEPP context
//!
//! Peer and association pools keep their capacity across any mix of
//! additions and removals, and handles never resolve after release.

#[cfg(test)]
mod tests {
    use crate::context::SeppContext;
    use crate::error::SeppError;
    use ogs_sbi::StreamId;
    use proptest::prelude::*;

    fn receiver(i: usize) -> String {
        format!("sepp{}.5gc.mnc001.mcc001.3gppnetwork.org", i)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Filling the node pool, draining it and filling it again always
        /// admits exactly `max_node` peers
        #[test]
        fn prop_node_drain_and_refill(max_node in 1usize..32) {
            let mut ctx = SeppContext::new();
            ctx.init(max_node, 1);

            for round in 0..2 {
                for i in 0..max_node {
                    ctx.node_add(&receiver(round * max_node + i)).unwrap();
                }
                let over = ctx.node_add("one-too-many.example.org");
                let is_capacity_error = matches!(over, Err(SeppError::CapacityExceeded { .. }));
                prop_assert!(is_capacity_error);
                prop_assert_eq!(ctx.node_count(), max_node);

                ctx.node_remove_all();
                prop_assert_eq!(ctx.node_count(), 0);
            }
        }

        /// Draining the association pool with a bulk removal frees every
        /// slot for the next batch of requests
        #[test]
        fn prop_assoc_drain_and_refill(max_assoc in 1usize..32) {
            let mut ctx = SeppContext::new();
            ctx.init(1, max_assoc);

            for round in 0..2 {
                let mut handles = Vec::with_capacity(max_assoc);
                for i in 0..max_assoc {
                    handles.push(ctx.assoc_add(StreamId((round * max_assoc + i) as u64)).unwrap());
                }
                let over = ctx.assoc_add(StreamId(u64::MAX));
                let is_capacity_error = matches!(over, Err(SeppError::CapacityExceeded { .. }));
                prop_assert!(is_capacity_error);
                prop_assert_eq!(ctx.assoc_count(), max_assoc);

                ctx.assoc_remove_all();
                prop_assert_eq!(ctx.assoc_count(), 0);
                for handle in &handles {
                    prop_assert!(ctx.assoc_find(*handle).is_none());
                }
            }
        }

        /// Random add/remove sequences never exceed capacity and released
        /// associations stay unreachable
        #[test]
        fn prop_assoc_handles(
            max_assoc in 1usize..16,
            ops in prop::collection::vec(any::<bool>(), 1..128),
        ) {
            let mut ctx = SeppContext::new();
            ctx.init(1, max_assoc);

            let mut live = Vec::new();
            let mut released = Vec::new();
            for (i, add) in ops.into_iter().enumerate() {
                if add {
                    match ctx.assoc_add(StreamId(i as u64)) {
                        Ok(handle) => live.push(handle),
                        Err(SeppError::CapacityExceeded { max, .. }) => {
                            prop_assert_eq!(max, max_assoc);
                            prop_assert_eq!(live.len(), max_assoc);
                        }
                        Err(e) => prop_assert!(false, "unexpected error {:?}", e),
                    }
                } else if let Some(handle) = live.pop() {
                    ctx.assoc_remove(handle);
                    released.push(handle);
                }

                prop_assert_eq!(ctx.assoc_count(), live.len());
                for handle in &released {
                    prop_assert!(ctx.assoc_find(*handle).is_none());
                }
                for handle in &live {
                    prop_assert!(ctx.assoc_find(*handle).is_some());
                }
            }
        }
    }
}
