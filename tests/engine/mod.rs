mod scenarios;
mod subscribers;
mod tokio_timers;
