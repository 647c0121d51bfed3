//! 扫描运行时的共享状态
//!
//! 候选队列是工作线程之间唯一共享的可变结构：每次领取在锁内完成，
//! 保证同一个候选不会被两个工作线程处理，也不会被漏掉。
//! 阶段和计数器用原子量保存，观察者可以在扫描进行时读取。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::model::Candidate;

/// 扫描阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Running,
    /// 所有候选已被领取，等待在途请求结束
    Draining,
    Completed,
}

impl ScanPhase {
    fn as_u8(self) -> u8 {
        match self {
            ScanPhase::Idle => 0,
            ScanPhase::Running => 1,
            ScanPhase::Draining => 2,
            ScanPhase::Completed => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => ScanPhase::Idle,
            1 => ScanPhase::Running,
            2 => ScanPhase::Draining,
            _ => ScanPhase::Completed,
        }
    }
}

#[derive(Debug)]
pub struct ScanState {
    queue: Mutex<VecDeque<Candidate>>,
    phase: AtomicU8,
    total: usize,
    claimed: AtomicUsize,
    found: AtomicUsize,
}

impl ScanState {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        ScanState {
            total: candidates.len(),
            queue: Mutex::new(candidates.into()),
            phase: AtomicU8::new(ScanPhase::Idle.as_u8()),
            claimed: AtomicUsize::new(0),
            found: AtomicUsize::new(0),
        }
    }

    /// 按字典顺序领取下一个候选；队列空时进入 Draining
    pub fn claim(&self) -> Option<Candidate> {
        let next = match self.queue.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };

        match next {
            Some(candidate) => {
                self.claimed.fetch_add(1, Ordering::Relaxed);
                Some(candidate)
            }
            None => {
                self.begin_draining();
                None
            }
        }
    }

    /// 停止领取：清空剩余队列，已领取的候选不受影响
    pub fn close(&self) -> usize {
        let dropped = match self.queue.lock() {
            Ok(mut queue) => queue.drain(..).count(),
            Err(poisoned) => poisoned.into_inner().drain(..).count(),
        };
        self.begin_draining();
        dropped
    }

    pub fn set_phase(&self, phase: ScanPhase) {
        self.phase.store(phase.as_u8(), Ordering::SeqCst);
    }

    fn begin_draining(&self) {
        let _ = self.phase.compare_exchange(
            ScanPhase::Running.as_u8(),
            ScanPhase::Draining.as_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    pub fn record_found(&self) {
        self.found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn phase(&self) -> ScanPhase {
        ScanPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn claimed(&self) -> usize {
        self.claimed.load(Ordering::Relaxed)
    }

    pub fn found(&self) -> usize {
        self.found.load(Ordering::Relaxed)
    }
}
