//! 单槽防抖：新的调度覆盖尚未触发的旧值，只有一串输入中的最后一个会被执行
//!
//! 计时交给调用方：界面层持有一个可重启的单次定时器，每次 [`Debouncer::schedule`]
//! 后以 [`Debouncer::delay`] 重新启动它，定时器触发时调用 [`Debouncer::fire`]。

use std::time::Duration;

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 调度一个值，丢弃之前尚未触发的值
    pub fn schedule(&mut self, value: T) {
        if self.pending.replace(value).is_some() {
            tracing::trace!("防抖: 覆盖尚未触发的值");
        }
    }

    /// 定时器到期：取出最后一次调度的值
    pub fn fire(&mut self) -> Option<T> {
        self.pending.take()
    }
}
