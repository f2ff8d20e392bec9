use crate::api::AppState;
use crate::error::ReviewError;
use crate::models::{CanonicalField, CreateOrderRequest, FieldValue, ReviewRow};
use crate::service::export::{self, CSV_FILENAME};
use crate::service::{Document, EditableOrder};
use axum::{
    body::Bytes,
    extract::{Json, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 失败响应体
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

/// 审核会话响应体
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub session_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches_available: Option<bool>,
    pub rows: Vec<ReviewRow>,
}

impl ReviewResponse {
    fn new(session_id: u64, order: &EditableOrder) -> Self {
        Self {
            session_id,
            matches_available: None,
            rows: order.rows().to_vec(),
        }
    }
}

/// 修改字段请求体
#[derive(Debug, Deserialize)]
pub struct UpdateFieldRequest {
    pub field: String,
    #[serde(default)]
    pub value: Value,
}

/// 修改匹配商品请求体
#[derive(Debug, Deserialize)]
pub struct UpdateMatchRequest {
    #[serde(default)]
    pub product: String,
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let response = ApiResponse {
        success: false,
        message: message.into(),
    };
    (status, Json(response)).into_response()
}

fn review_failure(e: ReviewError) -> Response {
    let status = match e {
        ReviewError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    failure(status, e.to_string())
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 创建订单; 请求体不要求 Content-Type
pub async fn create_order(State(state): State<AppState>, body: Bytes) -> Response {
    let req: CreateOrderRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!("invalid create order body: {}", e);
            return failure(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong");
        }
    };

    match state.orders.create_order(req.line_items).await {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(e) => {
            tracing::error!("create order failed: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
        }
    }
}

/// 全部订单
pub async fn list_orders(State(state): State<AppState>) -> Response {
    match state.orders.list_orders().await {
        Ok(orders) => (StatusCode::OK, Json(orders)).into_response(),
        Err(e) => {
            tracing::error!("list orders failed: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
        }
    }
}

/// 上传单据并运行对账流水线, 成功后开启审核会话
pub async fn process_document(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut document = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                let filename = field.file_name().unwrap_or("document.pdf").to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        document = Some(Document::new(filename, bytes.to_vec()));
                        break;
                    }
                    Err(e) => return failure(StatusCode::BAD_REQUEST, e.to_string()),
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => return failure(StatusCode::BAD_REQUEST, e.to_string()),
        }
    }

    let Some(document) = document else {
        return failure(StatusCode::BAD_REQUEST, "missing file field");
    };

    match state.pipeline.process(&document).await {
        Ok(reconciliation) => {
            let matches_available = reconciliation.matches_available;
            let order = EditableOrder::from(reconciliation);
            let rows = order.rows().to_vec();
            let response = ReviewResponse {
                session_id: state.sessions.open(order),
                matches_available: Some(matches_available),
                rows,
            };
            tracing::info!(
                "document {} ready for review: session {}, {} rows",
                document.filename,
                response.session_id,
                response.rows.len()
            );
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => failure(StatusCode::BAD_GATEWAY, e.to_string()),
    }
}

/// 审核会话当前内容
pub async fn get_review(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match state.sessions.snapshot(id) {
        Ok(order) => (StatusCode::OK, Json(ReviewResponse::new(id, &order))).into_response(),
        Err(e) => review_failure(e),
    }
}

/// 把请求中的 JSON 值转换为字段值; 数字字段接受数字、数字文本、空白
fn field_value(field: CanonicalField, value: &Value) -> Result<FieldValue, ReviewError> {
    if !field.is_numeric() {
        return Ok(FieldValue::from_json(value));
    }
    let parsed = match value {
        Value::Number(n) => Some(FieldValue::Number(n.clone())),
        Value::String(s) => FieldValue::parse_numeric(s),
        Value::Null => Some(FieldValue::empty()),
        _ => None,
    };
    parsed.ok_or_else(|| ReviewError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// 修改某行的一个字段
pub async fn update_field(
    State(state): State<AppState>,
    Path((id, index)): Path<(u64, usize)>,
    Json(req): Json<UpdateFieldRequest>,
) -> Response {
    let result = req
        .field
        .parse::<CanonicalField>()
        .and_then(|field| Ok((field, field_value(field, &req.value)?)))
        .and_then(|(field, value)| state.sessions.edit(id, |o| o.update_field(index, field, value)));

    match result {
        Ok(order) => (StatusCode::OK, Json(ReviewResponse::new(id, &order))).into_response(),
        Err(e) => review_failure(e),
    }
}

/// 改选匹配商品
pub async fn update_match(
    State(state): State<AppState>,
    Path((id, index)): Path<(u64, usize)>,
    Json(req): Json<UpdateMatchRequest>,
) -> Response {
    match state.sessions.edit(id, |o| o.update_match(index, req.product)) {
        Ok(order) => (StatusCode::OK, Json(ReviewResponse::new(id, &order))).into_response(),
        Err(e) => review_failure(e),
    }
}

/// 导出 CSV
pub async fn export_csv(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let order = match state.sessions.snapshot(id) {
        Ok(order) => order,
        Err(e) => return review_failure(e),
    };

    match export::to_csv_string(&order.line_items()) {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv;charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", CSV_FILENAME),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("csv export failed: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
        }
    }
}

/// 提交审核结果为订单; 失败时会话保留, 可重试
pub async fn submit_review(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let order = match state.sessions.snapshot(id) {
        Ok(order) => order,
        Err(e) => return review_failure(e),
    };
    if order.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "no line items to submit");
    }

    match state.orders.submit(&order).await {
        Ok(created) => {
            state.sessions.close(id);
            (StatusCode::CREATED, Json(created)).into_response()
        }
        Err(e) => {
            tracing::error!("submit review {} failed: {}", id, e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create an order.")
        }
    }
}
