//! 模拟提取流程
//!
//! 不进行任何网络请求：每个有效链接在随机延迟后产出一个占位结果。
//! 该流程没有失败路径。

use crate::media::MediaItem;
use futures_util::Stream;
use futures_util::stream;
use rand::Rng;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 单次提取最多产出的条目数（固定值）
pub const MAX_ITEMS_PER_RUN: usize = 4;
/// 每个条目的最短延迟
pub const MIN_DELAY: Duration = Duration::from_millis(800);
/// 每个条目的最长延迟
pub const MAX_DELAY: Duration = Duration::from_millis(1200);

/// 在 [`MIN_DELAY`, `MAX_DELAY`] 内均匀取一个延迟
pub fn extraction_delay<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    rng.gen_range(MIN_DELAY..=MAX_DELAY)
}

/// 本次提取的标识（Unix 毫秒时间戳）
pub fn run_stamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// 实际会产出的条目数
pub fn planned_items(link_count: usize) -> usize {
    link_count.min(MAX_ITEMS_PER_RUN)
}

/// 惰性的延时结果序列
///
/// 产出 `min(link_count, 4)` 个条目；第 N+1 个条目的计时在第 N 个条目产出后才开始。
pub fn extraction_stream(link_count: usize, run_stamp: u64) -> impl Stream<Item = MediaItem> {
    let total = planned_items(link_count);
    stream::unfold(0usize, move |index| async move {
        if index >= total {
            return None;
        }
        let delay = {
            let mut rng = rand::thread_rng();
            extraction_delay(&mut rng)
        };
        tokio::time::sleep(delay).await;
        Some((MediaItem::synthesize(run_stamp, index), index + 1))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;
    use tokio::time::Instant;

    #[test]
    fn test_delay_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1_000 {
            let d = extraction_delay(&mut rng);
            assert!(d >= MIN_DELAY && d <= MAX_DELAY, "{d:?}");
        }
    }

    #[test]
    fn test_planned_items_capped() {
        assert_eq!(planned_items(0), 0);
        assert_eq!(planned_items(1), 1);
        assert_eq!(planned_items(4), 4);
        assert_eq!(planned_items(10), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_yields_in_order_with_increasing_delays() {
        let start = Instant::now();
        let mut stream = Box::pin(extraction_stream(7, 99));
        let mut arrivals = Vec::new();
        let mut ids = HashSet::new();

        while let Some(item) = stream.next().await {
            arrivals.push((Instant::now() - start, item.clone()));
            ids.insert(item.id);
        }

        assert_eq!(arrivals.len(), 4);
        assert_eq!(ids.len(), 4);
        for (i, (_, item)) in arrivals.iter().enumerate() {
            assert_eq!(item.id, format!("99-{i}"));
        }

        let mut previous = Duration::ZERO;
        for (elapsed, _) in &arrivals {
            let step = *elapsed - previous;
            assert!(step >= MIN_DELAY, "step {step:?}");
            assert!(step <= MAX_DELAY + Duration::from_millis(2), "step {step:?}");
            previous = *elapsed;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_stream_finishes_immediately() {
        let start = Instant::now();
        let items: Vec<MediaItem> = extraction_stream(0, 1).collect().await;
        assert!(items.is_empty());
        assert_eq!(Instant::now(), start);
    }
}
