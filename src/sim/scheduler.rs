//! 事件队列
//!
//! 按时间戳升序出队的最小堆；同一时间戳的事件按插入顺序出队。

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use super::event::Event;
use super::time::SimTime;

/// 堆中的条目：执行时间、插入序号和事件
#[derive(Debug)]
struct Entry {
    at: SimTime,
    seq: u64,
    ev: Event,
}

// BinaryHeap 是 max-heap；键 (at, seq) 反向比较即得到最早、最先插入的事件在堆顶。
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.at, other.seq).cmp(&(self.at, self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        (self.at, self.seq) == (other.at, other.seq)
    }
}

impl Eq for Entry {}

#[derive(Debug, Default)]
pub struct EventQueue {
    next_seq: u64,
    q: BinaryHeap<Entry>,
}

impl EventQueue {
    /// 调度事件在指定时间执行
    pub fn push(&mut self, at: SimTime, ev: Event) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        trace!(at = %at, seq, ?ev, "调度事件");
        self.q.push(Entry { at, seq, ev });
    }

    /// 取出最早的事件
    pub fn pop(&mut self) -> Option<(SimTime, Event)> {
        self.q.pop().map(|item| (item.at, item.ev))
    }

    pub fn peek_time(&self) -> Option<SimTime> {
        self.q.peek().map(|item| item.at)
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    pub fn clear(&mut self) {
        self.q.clear();
        self.next_seq = 0;
    }
}
