use crate::models::{ErrorResponse, QueryApiRequest, QueryApiResponse};
use crate::state::AppState;
use actix_web::{post, web, HttpResponse, Responder};
use askdb_agents::{Assistant, QueryRequest};
use tracing::{error, info};

#[post("/query")]
pub async fn query(req: web::Json<QueryApiRequest>, state: web::Data<AppState>) -> impl Responder {
    let req = req.into_inner();

    let db_path = if req.use_default_db {
        state.default_db_path.clone()
    } else {
        match req.db_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => {
                return HttpResponse::BadRequest().json(ErrorResponse {
                    error: "db_path is required when use_default_db is false".to_string(),
                });
            }
        }
    };

    let mode = req.mode.unwrap_or_default();
    info!(
        question = %req.question,
        db_path = %db_path,
        mode = ?mode,
        "Processing query"
    );

    let client = match (state.clients)(req.model_name.as_deref()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create LLM client");
            return HttpResponse::Ok().json(QueryApiResponse {
                sql_query: String::new(),
                response: format!("Error: {}", e),
            });
        }
    };

    let answer = Assistant::new(client)
        .with_channel_factory(state.channels.clone())
        .with_config(state.loop_config)
        .ask(QueryRequest {
            question: req.question,
            context: req.context,
            db_path,
            mode,
        })
        .await;

    HttpResponse::Ok().json(QueryApiResponse {
        sql_query: answer.sql_query,
        response: answer.response,
    })
}
