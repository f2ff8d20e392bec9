//! 审核中的订单: 操作员逐字段修正明细、改选匹配商品

use crate::error::ReviewError;
use crate::models::{CanonicalField, FieldValue, LineItem, ReviewRow};
use crate::service::pipeline::Reconciliation;

/// 可编辑的订单状态; 修改立即生效, 不记录历史, 提交前不持久化
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditableOrder {
    rows: Vec<ReviewRow>,
}

impl From<Reconciliation> for EditableOrder {
    fn from(r: Reconciliation) -> Self {
        Self::new(r.rows)
    }
}

impl EditableOrder {
    pub fn new(rows: Vec<ReviewRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ReviewRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 当前明细快照 (用于导出与提交)
    pub fn line_items(&self) -> Vec<LineItem> {
        self.rows.iter().map(|r| r.line_item.clone()).collect()
    }

    /// 修改某行的一个标准字段。数字字段只接受数字或空值。
    pub fn update_field(&mut self, index: usize, field: CanonicalField, value: FieldValue) -> Result<(), ReviewError> {
        if field.is_numeric() && !matches!(value, FieldValue::Number(_)) && !value.is_empty() {
            return Err(ReviewError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
            });
        }
        self.row_mut(index)?.line_item.set(field, value);
        Ok(())
    }

    /// 设置匹配商品; 不要求出现在候选列表中, 空字符串表示清除
    pub fn update_match(&mut self, index: usize, product: impl Into<String>) -> Result<(), ReviewError> {
        self.row_mut(index)?.line_item.matched_product = product.into();
        Ok(())
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut ReviewRow, ReviewError> {
        let len = self.rows.len();
        self.rows.get_mut(index).ok_or(ReviewError::RowOutOfRange { index, len })
    }
}
