use crate::domain::models::cat::Cat;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::http::pipeline::{ReadHandler, Reply, RequestContext, TxHandler};
use crate::infrastructure::persistence::{cats, Database, UnitOfWork};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Deserialize)]
struct CatInput {
    name: String,
    gender: String,
}

fn parse_body(body: &[u8]) -> ApiResult<CatInput> {
    let input: CatInput = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {}", e)))?;
    if input.name.is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }
    if !Cat::is_valid_gender(&input.gender) {
        return Err(ApiError::BadRequest(
            "gender must be MALE or FEMALE".to_string(),
        ));
    }
    Ok(input)
}

fn parse_id(ctx: &RequestContext) -> ApiResult<String> {
    let id = ctx.param("cat_id")?;
    Uuid::parse_str(id)
        .map_err(|_| ApiError::BadRequest("the provided id is not a valid uuid".to_string()))?;
    Ok(id.to_string())
}

pub struct CreateCat;

#[async_trait]
impl TxHandler for CreateCat {
    async fn handle(
        &self,
        body: &[u8],
        ctx: &RequestContext,
        uow: &mut UnitOfWork,
    ) -> ApiResult<Reply> {
        let input = parse_body(body)?;
        let cat = Cat::new(ctx.subject_id.clone(), input.name, input.gender);
        cats::insert(uow.connection(), &cat).await?;
        Ok(Reply::ok(json!({ "id": cat.id })))
    }
}

pub struct GetCat;

#[async_trait]
impl ReadHandler for GetCat {
    async fn handle(&self, ctx: &RequestContext, db: &Database) -> ApiResult<Reply> {
        let id = parse_id(ctx)?;
        let cat = cats::find_by_id(db.pool(), &id)
            .await?
            .ok_or_else(|| ApiError::NotFound("the record is not found".to_string()))?;
        Ok(Reply::ok(serde_json::to_value(cat).map_err(|e| {
            ApiError::Internal(format!("failed to encode response: {}", e))
        })?))
    }
}

pub struct UpdateCat;

#[async_trait]
impl TxHandler for UpdateCat {
    async fn handle(
        &self,
        body: &[u8],
        ctx: &RequestContext,
        uow: &mut UnitOfWork,
    ) -> ApiResult<Reply> {
        let id = parse_id(ctx)?;
        let input = parse_body(body)?;
        let updated_at = Utc::now().to_rfc3339();
        let rows = cats::update(
            uow.connection(),
            &id,
            &ctx.subject_id,
            &input.name,
            &input.gender,
            &updated_at,
        )
        .await?;
        if rows == 0 {
            return Err(ApiError::NotFound("the record is not found".to_string()));
        }
        Ok(Reply::ok(json!({ "id": id })))
    }
}

pub struct DeleteCat;

#[async_trait]
impl TxHandler for DeleteCat {
    async fn handle(
        &self,
        _body: &[u8],
        ctx: &RequestContext,
        uow: &mut UnitOfWork,
    ) -> ApiResult<Reply> {
        let id = parse_id(ctx)?;
        let rows = cats::delete(uow.connection(), &id, &ctx.subject_id).await?;
        if rows == 0 {
            return Err(ApiError::NotFound("the record is not found".to_string()));
        }
        Ok(Reply::ok(json!({ "id": id })))
    }
}
