use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::ReviewError;

/// 识别服务返回的原始记录 (字段名由供应商决定)
pub type RawRecord = serde_json::Map<String, Value>;

/// 明细字段值: 数字或文本, 空字符串表示未填写
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum FieldValue {
    Number(Number),
    Text(String),
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl FieldValue {
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }

    /// 非有限浮点数无法表示为 JSON 数字, 退化为空值
    pub fn number(n: f64) -> Self {
        Number::from_f64(n).map(Self::Number).unwrap_or_default()
    }

    /// 原样接收识别结果, 不做类型转换; 无法表示的值 (null/数组/对象) 视为空
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::Text(s.clone()),
            Value::Bool(b) => Self::Text(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => Self::empty(),
        }
    }

    /// 解析数字输入框的内容: 空白 -> 空值, 整数文本保持整数, 其余按浮点数
    pub fn parse_numeric(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Some(Self::empty());
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Some(Self::Number(n.into()));
        }
        if let Ok(n) = trimmed.parse::<u64>() {
            return Some(Self::Number(n.into()));
        }
        let n: f64 = trimmed.parse().ok()?;
        n.is_finite().then(|| Self::number(n))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => n.serialize(serializer),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::from_json(&value)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::number(n)
    }
}

/// 标准明细行 (固定五个字段)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub qty: FieldValue,
    #[serde(default)]
    pub price: FieldValue,
    #[serde(default)]
    pub total_amount: FieldValue,
    #[serde(default)]
    pub matched_product: String,
}

/// 标准字段名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    ItemName,
    Qty,
    Price,
    TotalAmount,
    MatchedProduct,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 5] = [
        Self::ItemName,
        Self::Qty,
        Self::Price,
        Self::TotalAmount,
        Self::MatchedProduct,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ItemName => "item_name",
            Self::Qty => "qty",
            Self::Price => "price",
            Self::TotalAmount => "total_amount",
            Self::MatchedProduct => "matched_product",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Qty | Self::Price | Self::TotalAmount)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ReviewError::UnknownField(s.to_string()))
    }
}

impl LineItem {
    /// 写入一个标准字段; 文本字段取值的文本形式
    pub fn set(&mut self, field: CanonicalField, value: FieldValue) {
        match field {
            CanonicalField::ItemName => self.item_name = value.to_string(),
            CanonicalField::Qty => self.qty = value,
            CanonicalField::Price => self.price = value,
            CanonicalField::TotalAmount => self.total_amount = value,
            CanonicalField::MatchedProduct => self.matched_product = value.to_string(),
        }
    }

    pub fn get(&self, field: CanonicalField) -> FieldValue {
        match field {
            CanonicalField::ItemName => FieldValue::Text(self.item_name.clone()),
            CanonicalField::Qty => self.qty.clone(),
            CanonicalField::Price => self.price.clone(),
            CanonicalField::TotalAmount => self.total_amount.clone(),
            CanonicalField::MatchedProduct => FieldValue::Text(self.matched_product.clone()),
        }
    }
}
