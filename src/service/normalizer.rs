//! 字段标准化: 把识别服务的供应商字段名映射到标准明细字段

use crate::models::{CanonicalField, FieldValue, LineItem, RawRecord};

/// 供应商字段名 -> 标准字段 (区分大小写)
const FIELD_ALIASES: &[(&str, CanonicalField)] = &[
    ("Request Item", CanonicalField::ItemName),
    ("Item", CanonicalField::ItemName),
    ("Item Name", CanonicalField::ItemName),
    ("Qty", CanonicalField::Qty),
    ("Quantity", CanonicalField::Qty),
    ("Unit Price", CanonicalField::Price),
    ("Price", CanonicalField::Price),
    ("Amount", CanonicalField::TotalAmount),
    ("Total", CanonicalField::TotalAmount),
    ("Total Amount", CanonicalField::TotalAmount),
];

/// 查找字段名对应的标准字段, 未知字段返回 None
pub fn canonical_field(key: &str) -> Option<CanonicalField> {
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, field)| *field)
}

/// 标准字段的第一个供应商别名
pub fn primary_alias(field: CanonicalField) -> Option<&'static str> {
    FIELD_ALIASES
        .iter()
        .find(|(_, f)| *f == field)
        .map(|(alias, _)| *alias)
}

/// 标准化一条记录; 未知字段丢弃, 缺失字段为空值, 不会失败
pub fn normalize_record(record: &RawRecord) -> LineItem {
    let mut item = LineItem::default();
    for (key, value) in record {
        match canonical_field(key) {
            Some(field) => item.set(field, FieldValue::from_json(value)),
            None => tracing::trace!(key = %key, "ignoring unmapped extraction field"),
        }
    }
    item
}

/// 逐条标准化, 顺序与数量不变
pub fn normalize_records(records: &[RawRecord]) -> Vec<LineItem> {
    records.iter().map(normalize_record).collect()
}
