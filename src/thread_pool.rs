use core_affinity::{get_core_ids, set_for_current};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;




/**
 * A fixed-size pool of worker threads draining one shared job queue.
 * Whichever worker frees up first takes the next job, so a sub-step whose
 * patch updates cost unevenly (boundary blocks do more guard work than
 * interior ones) does not stall behind a busy thread. Workers are pinned to
 * CPU cores, wrapping around when the pool is larger than the machine.
 * Dropping the pool closes the queue and waits for the workers to finish
 * whatever is still queued.
 */
pub struct ThreadPool {
    workers: Vec<thread::JoinHandle<()>>,
    sender: Option<Sender<Job>>,
}




/**
 * The completion handle of a job submitted with `ThreadPool::enqueue`.
 * `wait` blocks until the worker finishes and hands back whatever the job
 * returned; jobs that can fail return a `Result` and the error crosses the
 * thread boundary inside it.
 */
pub struct Future<T> {
    receiver: Receiver<T>,
}

impl<T> Future<T> {
    pub fn wait(self) -> T {
        self.receiver
            .recv()
            .expect("worker dropped a job without completing it")
    }
}




// ============================================================================
impl ThreadPool {

    /// Start a pool of exactly `num_threads` workers, each parked on the
    /// shared queue and pinned to a core chosen cyclically from whatever
    /// the system reports. No pinning happens if the core list is
    /// unavailable.
    ///
    pub fn new(num_threads: usize) -> Self {
        let (sender, receiver) = unbounded::<Job>();
        let core_ids = get_core_ids().unwrap_or_default();

        let workers = (0..num_threads)
            .map(|n| {
                let receiver = receiver.clone();
                let core_id = core_ids.get(n % core_ids.len().max(1)).copied();

                thread::spawn(move || {
                    if let Some(core_id) = core_id {
                        set_for_current(core_id);
                    }
                    for job in receiver {
                        job()
                    }
                })
            })
            .collect();

        ThreadPool {
            workers,
            sender: Some(sender),
        }
    }

    /// The number of worker threads in the pool.
    ///
    pub fn num_threads(&self) -> usize {
        self.workers.len()
    }

    /// Put a job returning a value on the queue and get back its completion
    /// handle. If nobody keeps the handle the result is discarded when the
    /// job finishes.
    ///
    pub fn enqueue<F, T>(&self, job: F) -> Future<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (sender, receiver) = bounded(1);
        let job: Job = Box::new(move || {
            sender.send(job()).ok();
        });
        self.sender.as_ref().unwrap().send(job).unwrap();
        Future { receiver }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.sender.take();

        for handle in self.workers.drain(..) {
            handle.join().unwrap();
        }
    }
}
