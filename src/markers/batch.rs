use gloo_timers::future::TimeoutFuture;

/// Feeds `items` to `sink` in chunks of `batch_size`, yielding to the event
/// loop between chunks. Stops early once `keep_going` returns false.
///
/// Returns the number of items handed to the sink.
pub async fn insert_in_batches<T>(
    items: &[T],
    batch_size: usize,
    keep_going: impl Fn() -> bool,
    mut sink: impl FnMut(&[T]),
) -> usize {
    let mut inserted = 0;
    for (i, chunk) in items.chunks(batch_size.max(1)).enumerate() {
        if i > 0 {
            TimeoutFuture::new(0).await;
        }
        if !keep_going() {
            break;
        }
        sink(chunk);
        inserted += chunk.len();
    }
    inserted
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn test_all_items_arrive_in_order() {
        let items: Vec<u32> = (0..10).collect();
        let seen = RefCell::new(Vec::new());
        let count = insert_in_batches(&items, 3, || true, |chunk| seen.borrow_mut().extend_from_slice(chunk)).await;
        assert_eq!(count, 10);
        assert_eq!(*seen.borrow(), items);
    }

    #[wasm_bindgen_test]
    async fn test_stops_when_superseded() {
        let items: Vec<u32> = (0..10).collect();
        let batches = Cell::new(0);
        let count = insert_in_batches(&items, 4, || batches.get() < 1, |_| batches.set(batches.get() + 1)).await;
        assert_eq!(count, 4);
    }
}
