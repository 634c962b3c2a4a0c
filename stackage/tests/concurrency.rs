use std::{sync::Barrier, thread};

use stackage::prelude::*;

const THREADS: usize = 8;
const PER_THREAD: usize = 200;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn handles_are_send_and_sync() {
    assert_send_sync::<Stack>();
    assert_send_sync::<Condition>();
    assert_send_sync::<Value>();
    assert_send_sync::<StkError>();
}

#[test]
fn concurrent_pushes_with_mutex_lose_nothing() {
    let stack = Stack::list();
    stack.set_mutex();
    assert!(stack.has_mutex());

    let barrier = Barrier::new(THREADS);
    thread::scope(|scope| {
        for t in 0..THREADS {
            let stack = stack.clone();
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD {
                    stack.push([format!("{t}-{i}")]);
                }
            });
        }
    });

    assert_eq!(stack.len(), THREADS * PER_THREAD);
    assert!(stack.err().is_none());
}

#[test]
fn capacity_holds_under_contention() {
    let stack = Stack::and_with_capacity(100);
    stack.set_mutex();

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let stack = stack.clone();
            scope.spawn(move || {
                for i in 0..PER_THREAD {
                    stack.push([i]);
                }
            });
        }
    });

    assert_eq!(stack.len(), 100);
    assert_eq!(stack.avail(), Some(0));
}

#[test]
fn concurrent_pops_hand_out_each_element_once() {
    let stack = Stack::list();
    stack.set_mutex().set_fifo(true).push(0..(THREADS * PER_THREAD) as i64);

    let popped: Vec<Vec<i64>> = thread::scope(|scope| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                let stack = stack.clone();
                scope.spawn(move || {
                    let mut mine = Vec::new();
                    while let Some(value) = stack.pop() {
                        mine.extend(value.as_i64());
                    }
                    mine
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().expect("worker panicked"))
            .collect()
    });

    let mut all: Vec<i64> = popped.iter().flatten().copied().collect();
    all.sort_unstable();
    assert_eq!(all, (0..(THREADS * PER_THREAD) as i64).collect::<Vec<_>>());
    for mine in &popped {
        assert!(mine.windows(2).all(|w| w[0] < w[1]), "FIFO order is kept per thread");
    }
    assert!(stack.is_empty());
}

#[test]
fn read_only_stacks_render_consistently_across_threads() {
    let inner = Stack::or();
    inner.set_paren(true).push(["b", "c"]);
    let stack = Stack::and();
    stack
        .push([Value::from("a"), Value::from(&inner), Value::from(Condition::new("n", ComparisonOperator::Gt, 1))])
        .set_read_only(true);
    let expected = stack.render();

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let stack = stack.clone();
            let expected = expected.as_str();
            scope.spawn(move || {
                for _ in 0..50 {
                    assert_eq!(stack.render(), expected);
                    assert_eq!(
                        stack.traverse(&[1, 1]).map(|v| v.to_string()).as_deref(),
                        Some("c")
                    );
                    stack.push(["ignored"]);
                }
            });
        }
    });

    assert_eq!(stack.len(), 3);
}

#[test]
fn policies_may_reenter_the_instance() {
    let stack = Stack::list();
    let observer = stack.clone();
    stack.set_mutex().set_push_policy(move |_| {
        if observer.len() < 3 {
            Ok(())
        } else {
            Err(StkError::policy("full"))
        }
    });

    for i in 0..5 {
        stack.push([i]);
    }
    assert_eq!(stack.len(), 3);
    assert_eq!(stack.err(), Some(StkError::policy("full")));
}
