use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;

use crate::presentation::{Scheduler, Task};

/// 浏览器定时器。每个任务独立计时，等同于逐个调用 `setTimeout`。
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay_ms: u32, task: Task) {
        spawn_local(async move {
            if delay_ms > 0 {
                TimeoutFuture::new(delay_ms).await;
            }
            task();
        });
    }
}
