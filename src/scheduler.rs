use log::info;

use crate::config::{RunConfig, RunStatus};
use crate::database::Database;
use crate::error::Error;




/// A periodic task: fired by `dispatch` whenever the simulation time reaches
/// `count * interval`. The callback gets the running count along with the
/// run's shared state, and the count advances after each firing.
///
pub type Callback = Box<dyn FnMut(&Database, &RunConfig, &mut RunStatus, i64) -> Result<(), Error>>;

struct Task {
    name: String,
    interval: f64,
    count: i64,
    callback: Callback,
}




/**
 * A table of named repeating tasks, dispatched between time steps on the
 * main thread. Tasks with a non-positive interval never fire.
 */
#[derive(Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
}




// ============================================================================
impl Scheduler {

    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Register a task under a name, with its firing interval and the count
    /// it should resume from.
    ///
    pub fn repeat(&mut self, name: &str, interval: f64, count: i64, callback: Callback) {
        self.tasks.push(Task {
            name: name.to_string(),
            interval,
            count,
            callback,
        });
    }

    /// Run every task whose next firing time has been reached. Tasks that
    /// fell several intervals behind (after a restart with a larger
    /// interval, say) catch up one firing at a time.
    ///
    pub fn dispatch(
        &mut self,
        time: f64,
        database: &Database,
        config: &RunConfig,
        status: &mut RunStatus,
    ) -> Result<(), Error> {
        for task in &mut self.tasks {
            while task.interval > 0.0 && task.count as f64 * task.interval <= time {
                info!("run task '{}' (count {})", task.name, task.count);
                (task.callback)(database, config, status, task.count)?;
                task.count += 1;
            }
        }
        Ok(())
    }

    /// The registered task names with their intervals and pending counts.
    ///
    pub fn entries(&self) -> impl Iterator<Item = (&str, f64, i64)> {
        self.tasks
            .iter()
            .map(|t| (t.name.as_str(), t.interval, t.count))
    }
}




// ============================================================================
#[cfg(test)]
mod test {
    use super::*;
    use crate::database::Database;

    fn empty_database() -> Database {
        Database::new(4, 4, Vec::new())
    }

    fn base_config() -> RunConfig {
        RunConfig {
            num_blocks: 1,
            nr: 4,
            outer_radius: 10.0,
            tfinal: 1.0,
            cpi: 0.0,
            vtki: 0.0,
            rk: 1,
            noise: 0.0,
            heating_rate: 0.0,
            cooling_rate: 0.0,
            num_threads: 1,
            restart: String::new(),
            outdir: ".".into(),
        }
    }

    #[test]
    fn tasks_fire_at_multiples_of_their_interval() {
        let database = empty_database();
        let config = base_config();
        let mut status = RunStatus::from_config(&config);
        let mut scheduler = Scheduler::new();

        scheduler.repeat("tick", 1.0, 0, Box::new(|_, _, sts, count| {
            sts.vtk_count = count + 1;
            Ok(())
        }));

        scheduler.dispatch(0.0, &database, &config, &mut status).unwrap();
        assert_eq!(status.vtk_count, 1);

        scheduler.dispatch(0.5, &database, &config, &mut status).unwrap();
        assert_eq!(status.vtk_count, 1);

        scheduler.dispatch(1.0, &database, &config, &mut status).unwrap();
        assert_eq!(status.vtk_count, 2);
    }

    #[test]
    fn disabled_tasks_never_fire() {
        let database = empty_database();
        let config = base_config();
        let mut status = RunStatus::from_config(&config);
        let mut scheduler = Scheduler::new();

        scheduler.repeat("never", 0.0, 0, Box::new(|_, _, _, _| {
            panic!("should not fire")
        }));
        scheduler.dispatch(100.0, &database, &config, &mut status).unwrap();
    }

    #[test]
    fn restarted_counts_skip_past_firings() {
        let database = empty_database();
        let config = base_config();
        let mut status = RunStatus::from_config(&config);
        let mut scheduler = Scheduler::new();

        scheduler.repeat("tick", 1.0, 3, Box::new(|_, _, sts, count| {
            sts.chkpt_count = count + 1;
            Ok(())
        }));

        // Resuming at t = 2.5 with count 3 means the next firing is t = 3
        scheduler.dispatch(2.5, &database, &config, &mut status).unwrap();
        assert_eq!(status.chkpt_count, 0);

        scheduler.dispatch(3.1, &database, &config, &mut status).unwrap();
        assert_eq!(status.chkpt_count, 4);
    }
}
