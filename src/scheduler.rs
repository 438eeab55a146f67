//! Task scheduling for the parallel sorts.
//!
//! A sort is a tree of [`Task`]s, each covering a sub-range of the input at
//! some digit position. A [`Driver`] performs one task and reports child
//! tasks through the `recurse` callback it is handed. Below the parallel
//! threshold the whole tree runs inline on the caller's stack; above it,
//! workers drain a bounded channel of tasks, and child tasks large enough
//! to be worth shipping are offered to the channel without blocking. When
//! the channel is full the child simply runs on the thread that produced
//! it, so the queue depth stays bounded and progress never waits on queue
//! space.
//!
//! Tasks operate on disjoint index ranges, so the only synchronization is
//! the channel itself and a countdown of outstanding tasks.

use crate::tuning::Tuning;

#[cfg(feature = "multi-threaded")]
use crossbeam_channel::{bounded, Sender};
#[cfg(feature = "multi-threaded")]
use std::sync::{Condvar, Mutex};

/// One unit of sorting work: the sub-range `[lo, hi)` and the digit
/// position at which to resume. `digit` is a bit shift for the integer
/// engine and a byte offset for the byte engines; `depth` counts radix
/// recursion for the byte engines and remaining splits for the parallel
/// quicksort.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Task {
    pub lo: usize,
    pub hi: usize,
    pub digit: usize,
    pub depth: usize,
}

impl Task {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.hi - self.lo
    }
}

/// A sorting engine step: perform `task` on `data`, handing any child
/// tasks to `recurse`.
pub(crate) trait Driver<H: ?Sized>: Sync {
    fn step(&self, data: &H, task: Task, recurse: &dyn Fn(Task));
}

/// Executes a task tree, in parallel when the input and configuration
/// allow it.
pub(crate) fn run<H, D>(data: &H, driver: &D, root: Task, tuning: &Tuning)
where
    H: Sync + ?Sized,
    D: Driver<H>,
{
    let workers = tuning.workers();
    if root.len() < tuning.min_parallel || workers == 1 {
        run_inline(data, driver, root);
        return;
    }

    #[cfg(feature = "multi-threaded")]
    run_parallel(data, driver, root, tuning, workers);
    #[cfg(not(feature = "multi-threaded"))]
    run_inline(data, driver, root);
}

/// Runs `task` and all of its descendants on the current thread.
pub(crate) fn run_inline<H, D>(data: &H, driver: &D, task: Task)
where
    H: ?Sized,
    D: Driver<H> + ?Sized,
{
    driver.step(data, task, &|t| run_inline(data, driver, t));
}

/// Counts outstanding tasks; the submitting thread blocks until the count
/// drains to zero.
#[cfg(feature = "multi-threaded")]
struct Countdown {
    n: Mutex<usize>,
    drained: Condvar,
}

#[cfg(feature = "multi-threaded")]
impl Countdown {
    fn new() -> Self {
        Countdown {
            n: Mutex::new(0),
            drained: Condvar::new(),
        }
    }

    fn add(&self) {
        *self.n.lock().unwrap() += 1;
    }

    fn sub(&self) {
        let mut n = self.n.lock().unwrap();
        *n -= 1;
        if *n == 0 {
            self.drained.notify_all();
        }
    }

    fn wait(&self) {
        let mut n = self.n.lock().unwrap();
        while *n > 0 {
            n = self.drained.wait(n).unwrap();
        }
    }
}

#[cfg(feature = "multi-threaded")]
enum Msg {
    Run(Task),
    Quit,
}

#[cfg(feature = "multi-threaded")]
struct Offload<'a, H: ?Sized, D> {
    data: &'a H,
    driver: &'a D,
    tx: &'a Sender<Msg>,
    pending: &'a Countdown,
    min_offload: usize,
}

#[cfg(feature = "multi-threaded")]
impl<H: Sync + ?Sized, D: Driver<H>> Offload<'_, H, D> {
    /// Hands a task to the pool if it is large enough and the queue has
    /// room; otherwise runs it on this thread. The inline fallback keeps
    /// using `offer` for grandchildren, so a momentarily full queue does
    /// not demote the whole subtree to serial execution.
    fn offer(&self, task: Task) {
        if task.len() < self.min_offload {
            run_inline(self.data, self.driver, task);
            return;
        }
        self.pending.add();
        if let Err(rejected) = self.tx.try_send(Msg::Run(task)) {
            self.pending.sub();
            let task = match rejected.into_inner() {
                Msg::Run(t) => t,
                Msg::Quit => unreachable!(),
            };
            self.driver.step(self.data, task, &|t| self.offer(t));
        }
    }
}

#[cfg(feature = "multi-threaded")]
fn run_parallel<H, D>(data: &H, driver: &D, root: Task, tuning: &Tuning, workers: usize)
where
    H: Sync + ?Sized,
    D: Driver<H>,
{
    let cap = (workers as f32 * tuning.buffer_ratio) as usize;
    let (tx, rx) = bounded::<Msg>(cap);
    let pending = Countdown::new();
    let ctx = Offload {
        data,
        driver,
        tx: &tx,
        pending: &pending,
        min_offload: tuning.min_offload,
    };

    rayon::scope(|s| {
        for _ in 0..workers {
            let rx = rx.clone();
            let ctx = &ctx;
            s.spawn(move |_| {
                while let Ok(Msg::Run(task)) = rx.recv() {
                    ctx.driver.step(ctx.data, task, &|t| ctx.offer(t));
                    ctx.pending.sub();
                }
            });
        }

        ctx.offer(root);
        pending.wait();

        // All tasks are done; wake the workers so the scope can close.
        for _ in 0..workers {
            let _ = tx.send(Msg::Quit);
        }
    });
}
