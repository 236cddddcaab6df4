use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{
    accounts, balances, expenses, limits, missions, reports, settlements,
    storage::{self, ReceiptStore},
};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub store: Arc<dyn ReceiptStore>,
}

/// Resolves Basic credentials to a [`engine::Session`] and attaches it to
/// the request. Unapproved accounts get a 403 so clients can show a
/// "pending approval" message instead of a login failure.
async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let session = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
        .map_err(|err| match err {
            EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        })?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/expenses", post(expenses::submit).get(expenses::list))
        .route("/expenses/list", post(expenses::list_filtered))
        .route(
            "/expenses/{id}",
            patch(expenses::update).delete(expenses::remove),
        )
        .route("/expenses/{id}/approve", post(expenses::approve))
        .route("/expenses/{id}/reject", post(expenses::reject))
        .route("/limits", get(limits::list))
        .route("/limits/{category}", put(limits::set))
        .route("/missions", post(missions::start).get(missions::list))
        .route("/missions/active", get(missions::active))
        .route("/missions/{id}/finish", post(missions::finish))
        .route("/missions/{id}/stats", get(balances::mission_stats))
        .route(
            "/settlements",
            post(settlements::record).get(settlements::list),
        )
        .route("/settlements/{id}/ack", post(settlements::acknowledge))
        .route("/balance", get(balances::own))
        .route("/balance/{user_id}", get(balances::of_user))
        .route("/receipts", post(storage::upload))
        .route("/reports/export", post(reports::export))
        .route("/users", get(accounts::list))
        .route("/users/{id}/approve", post(accounts::approve))
        .route("/users/{id}/role", put(accounts::set_role))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        // Registration is the only unauthenticated route.
        .route("/register", post(accounts::register))
        .with_state(state)
}

pub async fn run(engine: Engine, store: Arc<dyn ReceiptStore>) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, store, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    store: Arc<dyn ReceiptStore>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        store,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    store: Arc<dyn ReceiptStore>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, store, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use base64::Engine as _;
    use chrono::Utc;
    use http_body_util::BodyExt;
    use sea_orm::{ActiveValue, Database, EntityTrait};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::storage::FsReceiptStore;
    use engine::{Role, profiles, roles};
    use migration::MigratorTrait;

    use super::*;

    async fn seed_user(db: &sea_orm::DatabaseConnection, approved: bool) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        profiles::Entity::insert(profiles::ActiveModel {
            id: ActiveValue::Set(id),
            name: ActiveValue::Set("ravi".to_string()),
            email: ActiveValue::Set(format!("{id}@example.com")),
            password: ActiveValue::Set("password".to_string()),
            is_approved: ActiveValue::Set(approved),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        })
        .exec(db)
        .await
        .unwrap();
        roles::Entity::insert(roles::ActiveModel {
            user_id: ActiveValue::Set(id),
            role: ActiveValue::Set(Role::User.as_str().to_string()),
        })
        .exec(db)
        .await
        .unwrap();
        id
    }

    async fn test_router() -> (Router, sea_orm::DatabaseConnection) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let state = ServerState {
            engine: Arc::new(Engine::builder().database(db.clone()).build()),
            store: Arc::new(FsReceiptStore::new(
                std::env::temp_dir().join(format!("receipts_{}", Uuid::new_v4())),
                "http://localhost/receipts",
            )),
        };
        (router(state), db)
    }

    fn basic(user: Uuid) -> String {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{user}@example.com:password"));
        format!("Basic {encoded}")
    }

    #[tokio::test]
    async fn missing_credentials_get_401() {
        let (router, _db) = test_router().await;
        let res = router
            .oneshot(Request::get("/expenses").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unapproved_account_gets_403() {
        let (router, db) = test_router().await;
        let user = seed_user(&db, false).await;
        let res = router
            .oneshot(
                Request::get("/expenses")
                    .header(header::AUTHORIZATION, basic(user))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn approved_account_can_list_expenses() {
        let (router, db) = test_router().await;
        let user = seed_user(&db, true).await;
        let res = router
            .oneshot(
                Request::get("/expenses")
                    .header(header::AUTHORIZATION, basic(user))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = res.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["expenses"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn registration_is_open() {
        let (router, _db) = test_router().await;
        let res = router
            .oneshot(
                Request::post("/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "name": "meera",
                            "email": "meera@example.com",
                            "password": "secret"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }
}
