//! 协作式定时器队列
//!
//! 由 UI 主循环在每个 tick 调用 [`Scheduler::poll`] 驱动，不创建任何线程。
//! 每个组件持有自己的 `Scheduler`，组件销毁时其定时器随之释放。

use std::time::{Duration, Instant};

/// 定时器句柄，用于取消
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<T> {
    id: TimerId,
    deadline: Instant,
    payload: T,
}

/// 按截止时间触发的定时器集合
#[derive(Debug)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// 在 `now + delay` 触发 `payload`
    pub fn schedule_after(&mut self, now: Instant, delay: Duration, payload: T) -> TimerId {
        self.schedule_at(now + delay, payload)
    }

    pub fn schedule_at(&mut self, deadline: Instant, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            deadline,
            payload,
        });
        id
    }

    /// 取消一个定时器，返回是否确实移除
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// 取消所有满足条件的定时器
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) {
        self.entries.retain(|e| !pred(&e.payload));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 最早的截止时间
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// 取出所有已到期的负载
    ///
    /// 按截止时间排序；截止时间相同时按调度顺序。
    pub fn poll(&mut self, now: Instant) -> Vec<T> {
        self.poll_due(now).into_iter().map(|(_, payload)| payload).collect()
    }

    /// 同 [`poll`](Self::poll)，附带每个定时器的截止时间
    ///
    /// 周期性任务应以截止时间而非 `now` 为基准重新调度，避免 tick 抖动累积。
    pub fn poll_due(&mut self, now: Instant) -> Vec<(Instant, T)> {
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.deadline <= now);
        self.entries = pending;
        due.sort_by_key(|e| (e.deadline, e.id));
        due.into_iter().map(|e| (e.deadline, e.payload)).collect()
    }
}
