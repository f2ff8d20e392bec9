use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::error::ReviewError;
use crate::service::review::EditableOrder;

/// 审核会话表: 每份单据一个会话, 由单个操作员独占
#[derive(Debug, Default)]
pub struct ReviewSessions {
    sessions: DashMap<u64, EditableOrder>,
    next_id: AtomicU64,
}

impl ReviewSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, order: EditableOrder) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.sessions.insert(id, order);
        id
    }

    pub fn snapshot(&self, id: u64) -> Result<EditableOrder, ReviewError> {
        self.sessions
            .get(&id)
            .map(|s| s.value().clone())
            .ok_or(ReviewError::SessionNotFound(id))
    }

    /// 在会话上执行一次修改, 返回修改后的快照
    pub fn edit<F>(&self, id: u64, f: F) -> Result<EditableOrder, ReviewError>
    where
        F: FnOnce(&mut EditableOrder) -> Result<(), ReviewError>,
    {
        let mut entry = self.sessions.get_mut(&id).ok_or(ReviewError::SessionNotFound(id))?;
        f(entry.value_mut())?;
        Ok(entry.value().clone())
    }

    pub fn close(&self, id: u64) -> Option<EditableOrder> {
        self.sessions.remove(&id).map(|(_, order)| order)
    }
}
