//! 结果网格与媒体卡片动画
//!
//! 每张卡片有两段入场动画：
//! 1. 延迟 `index × CARD_STAGGER` 后显示
//! 2. 显示后扫描进度每 `SCAN_TICK` 增加 `SCAN_STEP`，直到 100
//!
//! 动画只是装饰，不会阻塞下载操作。

use crate::media::MediaItem;
use crate::timer::Scheduler;
use std::time::{Duration, Instant};

/// 卡片之间的入场间隔
pub const CARD_STAGGER: Duration = Duration::from_millis(150);
/// 扫描进度刷新间隔
pub const SCAN_TICK: Duration = Duration::from_millis(50);
/// 每次刷新的进度增量
pub const SCAN_STEP: u8 = 10;

/// 网格中的一张卡片
#[derive(Debug, Clone, PartialEq)]
pub struct MediaCard {
    pub item: MediaItem,
    pub index: usize,
    pub visible: bool,
    /// 0..=100
    pub scan_progress: u8,
}

impl MediaCard {
    pub fn is_scanning(&self) -> bool {
        self.visible && self.scan_progress < 100
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CardTimer {
    Reveal(usize),
    Scan(usize),
}

/// 结果网格
#[derive(Debug, Default)]
pub struct ResultGrid {
    cards: Vec<MediaCard>,
    timers: Scheduler<CardTimer>,
    selected: usize,
}

impl ResultGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &[MediaCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// 追加一张卡片并安排入场动画
    pub fn push(&mut self, item: MediaItem, now: Instant) {
        let index = self.cards.len();
        self.cards.push(MediaCard {
            item,
            index,
            visible: false,
            scan_progress: 0,
        });
        let delay = CARD_STAGGER * index as u32;
        self.timers
            .schedule_after(now, delay, CardTimer::Reveal(index));
    }

    /// 清空网格并取消所有卡片定时器
    pub fn clear(&mut self) {
        self.cards.clear();
        self.timers.clear();
        self.selected = 0;
    }

    /// 推进动画
    ///
    /// 后续步骤以上一步的截止时间为基准调度，UI 卡顿后一次 tick 会补齐所有步骤。
    pub fn tick(&mut self, now: Instant) {
        loop {
            let due = self.timers.poll_due(now);
            if due.is_empty() {
                break;
            }
            for (deadline, timer) in due {
                self.fire(timer, deadline);
            }
        }
    }

    fn fire(&mut self, timer: CardTimer, at: Instant) {
        match timer {
            CardTimer::Reveal(index) => {
                if let Some(card) = self.cards.get_mut(index) {
                    card.visible = true;
                    self.timers
                        .schedule_after(at, SCAN_TICK, CardTimer::Scan(index));
                }
            }
            CardTimer::Scan(index) => {
                if let Some(card) = self.cards.get_mut(index) {
                    card.scan_progress = card.scan_progress.saturating_add(SCAN_STEP).min(100);
                    if card.scan_progress < 100 {
                        self.timers
                            .schedule_after(at, SCAN_TICK, CardTimer::Scan(index));
                    }
                }
            }
        }
    }

    /// 是否还有动画在进行
    pub fn is_animating(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn selected(&self) -> Option<&MediaCard> {
        self.cards.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if !self.cards.is_empty() {
            self.selected = (self.selected + 1) % self.cards.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.cards.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.cards.len() - 1);
        }
    }

    /// 当前所有条目（按到达顺序）
    pub fn items(&self) -> Vec<MediaItem> {
        self.cards.iter().map(|c| c.item.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn step_until(grid: &mut ResultGrid, start: Instant, until_ms: u64) {
        // 以 10ms 为步长模拟 UI tick
        let mut t = 0;
        while t <= until_ms {
            grid.tick(start + ms(t));
            t += 10;
        }
    }

    #[test]
    fn test_first_card_visible_immediately() {
        let t0 = Instant::now();
        let mut grid = ResultGrid::new();
        grid.push(MediaItem::synthesize(1, 0), t0);
        grid.tick(t0);
        assert!(grid.cards()[0].visible);
        assert_eq!(grid.cards()[0].scan_progress, 0);
    }

    #[test]
    fn test_reveal_is_staggered_by_index() {
        let t0 = Instant::now();
        let mut grid = ResultGrid::new();
        grid.push(MediaItem::synthesize(1, 0), t0);
        grid.push(MediaItem::synthesize(1, 1), t0);
        grid.push(MediaItem::synthesize(1, 2), t0);

        step_until(&mut grid, t0, 140);
        assert!(grid.cards()[0].visible);
        assert!(!grid.cards()[1].visible);

        step_until(&mut grid, t0, 160);
        assert!(grid.cards()[1].visible);
        assert!(!grid.cards()[2].visible);

        step_until(&mut grid, t0, 300);
        assert!(grid.cards()[2].visible);
    }

    #[test]
    fn test_scan_completes_and_stops() {
        let t0 = Instant::now();
        let mut grid = ResultGrid::new();
        grid.push(MediaItem::synthesize(1, 0), t0);

        step_until(&mut grid, t0, 260);
        assert_eq!(grid.cards()[0].scan_progress, 50);
        assert!(grid.cards()[0].is_scanning());

        step_until(&mut grid, t0, 600);
        assert_eq!(grid.cards()[0].scan_progress, 100);
        assert!(!grid.is_animating());
    }

    #[test]
    fn test_late_tick_catches_up() {
        let t0 = Instant::now();
        let mut grid = ResultGrid::new();
        grid.push(MediaItem::synthesize(1, 0), t0);
        grid.tick(t0 + ms(5_000));
        assert!(grid.cards()[0].visible);
        assert_eq!(grid.cards()[0].scan_progress, 100);
    }

    #[test]
    fn test_clear_cancels_timers() {
        let t0 = Instant::now();
        let mut grid = ResultGrid::new();
        grid.push(MediaItem::synthesize(1, 0), t0);
        grid.push(MediaItem::synthesize(1, 1), t0);
        grid.clear();
        assert!(grid.is_empty());
        assert!(!grid.is_animating());

        // 新一轮的卡片不受旧定时器影响
        grid.push(MediaItem::synthesize(2, 0), t0 + ms(1000));
        grid.tick(t0 + ms(1000));
        assert_eq!(grid.cards()[0].scan_progress, 0);
    }

    #[test]
    fn test_selection_wraps() {
        let t0 = Instant::now();
        let mut grid = ResultGrid::new();
        grid.select_next();
        assert!(grid.selected().is_none());
        for i in 0..3 {
            grid.push(MediaItem::synthesize(1, i), t0);
        }
        grid.select_previous();
        assert_eq!(grid.selected_index(), 2);
        grid.select_next();
        assert_eq!(grid.selected_index(), 0);
    }
}
