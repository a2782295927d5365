mod common;
use common::*;

use serial_test::serial;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tsqueue::{ChunkedStore, ElementStore, SyncQueue};

fn spawn_producer<S>(queue: &Arc<SyncQueue<usize, S>>, base: usize, count: usize) -> thread::JoinHandle<()>
where
  S: ElementStore<usize> + Send + 'static,
{
  let queue = Arc::clone(queue);
  thread::spawn(move || {
    for i in 0..count {
      queue.push(base + i);
    }
  })
}

fn spawn_wait_consumer<S>(queue: &Arc<SyncQueue<usize, S>>, count: usize) -> thread::JoinHandle<Vec<usize>>
where
  S: ElementStore<usize> + Send + 'static,
{
  let queue = Arc::clone(queue);
  thread::spawn(move || (0..count).map(|_| queue.wait_and_pop()).collect())
}

#[test]
fn ping_pong_round_trips() {
  const PING_PONGS: usize = 100;
  let pings = Arc::new(SyncQueue::<Box<usize>>::new());
  let pongs = Arc::new(SyncQueue::<Box<usize>>::new());
  let hops = Arc::new(AtomicUsize::new(0));

  let pinger = {
    let (pings, pongs) = (Arc::clone(&pings), Arc::clone(&pongs));
    thread::spawn(move || {
      for i in 0..PING_PONGS {
        let num = Box::new(i);
        let addr = &*num as *const usize;

        pings.push(num);
        let back = pongs.wait_and_pop();

        assert_eq!(&*back as *const usize, addr, "a different element came back");
        assert_eq!(*back, i + 1);
      }
    })
  };

  let ponger = {
    let (pings, pongs, hops) = (Arc::clone(&pings), Arc::clone(&pongs), Arc::clone(&hops));
    thread::spawn(move || {
      for _ in 0..PING_PONGS {
        let mut num = pings.wait_and_pop();
        *num += 1;
        hops.fetch_add(1, Ordering::SeqCst);
        pongs.push(num);
      }
    })
  };

  ponger.join().unwrap();
  pinger.join().unwrap();

  assert_eq!(hops.load(Ordering::SeqCst), PING_PONGS);
  assert!(pings.is_empty());
  assert!(pongs.is_empty());
}

#[test]
fn wait_and_pop_blocks_until_push() {
  let queue = Arc::new(SyncQueue::<&'static str>::new());
  let consumer = {
    let queue = Arc::clone(&queue);
    thread::spawn(move || queue.wait_and_pop())
  };

  wait_until(LONG_TIMEOUT, "consumer to park", || queue.waiters() == 1);
  thread::sleep(SHORT_TIMEOUT);
  assert!(!consumer.is_finished(), "wait_and_pop returned with nothing pushed");
  assert_eq!(queue.waiters(), 1);

  queue.push("hello");
  assert_eq!(consumer.join().unwrap(), "hello");
  assert_eq!(queue.waiters(), 0);
  assert!(queue.is_empty());
}

#[test]
fn each_push_wakes_a_parked_consumer() {
  let queue = Arc::new(SyncQueue::<usize>::new());
  let consumers: Vec<_> = (0..4).map(|_| spawn_wait_consumer(&queue, 1)).collect();

  wait_until(LONG_TIMEOUT, "all consumers to park", || queue.waiters() == 4);
  for i in 0..4 {
    queue.push(i);
  }

  let mut got: Vec<usize> = consumers.into_iter().flat_map(|h| h.join().unwrap()).collect();
  got.sort_unstable();
  assert_eq!(got, vec![0, 1, 2, 3]);
}

#[test]
#[serial]
fn try_pop_under_contention_finds_every_element_once() {
  let queue = Arc::new(SyncQueue::<usize>::new());

  for repeat in 0..REPEATS {
    let base = repeat * 2 * ELEMENTS_PER_THREAD;
    queue.push_all(base..base + 2 * ELEMENTS_PER_THREAD);

    let consumers: Vec<_> = (0..2)
      .map(|_| {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
          let mut found = Vec::with_capacity(ELEMENTS_PER_THREAD);
          for _ in 0..ELEMENTS_PER_THREAD {
            found.push(queue.try_pop().expect("pre-loaded queue reported empty"));
          }
          found
        })
      })
      .collect();

    let mut seen = HashSet::with_capacity(2 * ELEMENTS_PER_THREAD);
    for handle in consumers {
      for item in handle.join().unwrap() {
        assert!(seen.insert(item), "element {} popped twice", item);
      }
    }
    assert_eq!(seen.len(), 2 * ELEMENTS_PER_THREAD);
    assert!(queue.is_empty());
  }
}

#[test]
#[serial]
fn wait_and_pop_from_two_threads_drains_preloaded_queue() {
  let queue = Arc::new(SyncQueue::<usize>::new());

  for _ in 0..REPEATS {
    queue.push_all(0..2 * ELEMENTS_PER_THREAD);
    let consumers: Vec<_> = (0..2).map(|_| spawn_wait_consumer(&queue, ELEMENTS_PER_THREAD)).collect();

    let mut got: Vec<usize> = consumers.into_iter().flat_map(|h| h.join().unwrap()).collect();
    got.sort_unstable();
    assert!(got.into_iter().eq(0..2 * ELEMENTS_PER_THREAD));
    assert!(queue.is_empty());
  }
}

#[test]
#[serial]
fn pushes_from_two_threads_are_all_delivered() {
  let queue = Arc::new(SyncQueue::<usize>::new());

  for _ in 0..REPEATS {
    let producers = [
      spawn_producer(&queue, 0, ELEMENTS_PER_THREAD),
      spawn_producer(&queue, ELEMENTS_PER_THREAD, ELEMENTS_PER_THREAD),
    ];
    for handle in producers {
      handle.join().unwrap();
    }
    assert_eq!(queue.len(), 2 * ELEMENTS_PER_THREAD);

    // Each producer's elements stay in that producer's order.
    let (mut next_a, mut next_b) = (0, ELEMENTS_PER_THREAD);
    for _ in 0..2 * ELEMENTS_PER_THREAD {
      let item = queue.wait_and_pop();
      if item < ELEMENTS_PER_THREAD {
        assert_eq!(item, next_a);
        next_a += 1;
      } else {
        assert_eq!(item, next_b);
        next_b += 1;
      }
    }
    assert_eq!((next_a, next_b), (ELEMENTS_PER_THREAD, 2 * ELEMENTS_PER_THREAD));
  }
}

fn exactly_once_with<S>(make_store: fn() -> S)
where
  S: ElementStore<usize> + Send + 'static,
{
  const THREADS: usize = 5;
  let per_thread = ELEMENTS_PER_THREAD / 10;

  for _ in 0..REPEATS {
    let queue = Arc::new(SyncQueue::with_store(make_store()));
    let mut producers = Vec::with_capacity(THREADS);
    let mut consumers = Vec::with_capacity(THREADS);
    for t in 0..THREADS {
      producers.push(spawn_producer(&queue, t * per_thread, per_thread));
      consumers.push(spawn_wait_consumer(&queue, per_thread));
    }
    for handle in producers.into_iter().rev() {
      handle.join().unwrap();
    }

    let mut got: Vec<usize> = consumers.into_iter().flat_map(|h| h.join().unwrap()).collect();
    got.sort_unstable();
    assert!(got.into_iter().eq(0..THREADS * per_thread), "lost or duplicated elements");
    assert!(queue.is_empty());
    assert_eq!(queue.waiters(), 0);
  }
}

#[test]
#[serial]
fn pushes_and_pops_from_many_threads_deliver_exactly_once() {
  exactly_once_with(std::collections::VecDeque::new);
}

#[test]
#[serial]
fn chunked_store_delivers_exactly_once() {
  exactly_once_with(ChunkedStore::<usize, 32>::new);
}

#[test]
fn consumer_sees_single_producer_in_order() {
  let queue = Arc::new(SyncQueue::<usize>::new());
  let producer = spawn_producer(&queue, 0, ITEMS_HIGH);
  for expected in 0..ITEMS_HIGH {
    assert_eq!(queue.wait_and_pop(), expected);
  }
  producer.join().unwrap();
}
