use super::listener;
use crate::ChangeEvent;

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn given_any_callback_count_when_dispatched_then_runs_each_in_order(count in 1usize..12) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let order = runtime.block_on(async {
            let (listener, _handle) = listener();
            let order = Arc::new(Mutex::new(Vec::new()));

            for index in 0..count {
                let order = Arc::clone(&order);
                listener
                    .add_listener(move |_event| {
                        let order = Arc::clone(&order);
                        async move {
                            order.lock().unwrap().push(index);
                            Ok(())
                        }
                    })
                    .await;
            }

            let delivered = listener
                .dispatch(ChangeEvent::decode(br#"{"id":1}"#).unwrap())
                .await;
            assert_eq!(delivered, count);

            let order = order.lock().unwrap().clone();
            order
        });

        prop_assert_eq!(order, (0..count).collect::<Vec<_>>());
    }

    #[test]
    fn given_any_integer_fields_when_decoded_then_values_round_trip(id in any::<i32>(), quantity in 0i32..) {
        let payload = json!({"id": id, "quantity": quantity}).to_string();

        let event = ChangeEvent::decode(payload.as_bytes()).unwrap();

        let expected_id = json!(id);
        let expected_quantity = json!(quantity);
        prop_assert_eq!(event.get("id"), Some(&expected_id));
        prop_assert_eq!(event.get("quantity"), Some(&expected_quantity));
    }
}
