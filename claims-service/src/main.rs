mod assembly;
mod clients;
mod dev_auth;
mod profile;
mod questions;
mod screens;
mod tasks;
mod validation;

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Json,
    routing::{get, post},
};
use claim_flow::{
    ExecutionStatus, Graph, GraphBuilder, GraphStorage, InMemoryGraphStorage,
    InMemorySessionStorage, Session, SessionStorage,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::assembly::StatementFormData;
use crate::clients::{EsignClient, ProfileStoreClient, SigningHandoff, SubscriptionClient};
use crate::screens::{Routed, Screen, ScreenEvent, route, screen_for_subscription};
use crate::tasks::{
    EditProfileTask, GeneralChatTask, GenerateStatementTask, IntakeTask, PostClaimChatTask,
    WelcomeTask, intake_routes, session_keys,
};

#[derive(Clone)]
struct AppState {
    graph_storage: Arc<dyn GraphStorage>,
    session_storage: Arc<dyn SessionStorage>,
    profiles: Arc<ProfileStoreClient>,
    subscriptions: Arc<SubscriptionClient>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    session_id: Option<String>,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    session_id: String,
    response: Option<String>,
    status: String,
    screen: Screen,
}

#[derive(Debug, Serialize)]
struct EventResponse {
    screen: Screen,
}

#[derive(Debug, Deserialize)]
struct DevAuthRequest {
    email: String,
    code: Option<String>,
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct DevAuthResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

/// Initialize structured JSON tracing based on environment variables
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "claims_service=debug,claim_flow=debug,tower_http=debug".into()
    });

    match log_format.as_str() {
        "pretty" => {
            // Human-readable logging for development
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            // Structured JSON logging for production
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

/// Middleware to add a correlation ID to all requests
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    request.headers_mut().insert(
        "x-correlation-id",
        HeaderValue::from_str(&correlation_id).unwrap(),
    );

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

#[tokio::main]
async fn main() {
    init_tracing();

    // Required for every LLM-backed task
    if std::env::var("OPENROUTER_API_KEY").is_err() {
        error!("OPENROUTER_API_KEY not set");
        std::process::exit(1);
    }

    let profiles = match ProfileStoreClient::from_env() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("profile store not configured: {}", e);
            std::process::exit(1);
        }
    };

    let subscriptions = match SubscriptionClient::from_env() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("subscription lookup not configured: {}", e);
            std::process::exit(1);
        }
    };

    let graph_storage = Arc::new(InMemoryGraphStorage::new());
    let session_storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());

    let default_graph = create_default_graph(profiles.clone());
    graph_storage
        .save("default".to_string(), Arc::new(default_graph))
        .await
        .expect("Failed to save default graph");

    let app_state = AppState {
        graph_storage,
        session_storage,
        profiles,
        subscriptions,
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/chat", post(chat))
        .route("/session/{id}", get(get_session))
        .route("/session/{id}/event", post(session_event))
        .route("/session/{id}/signing", post(create_signing))
        .route("/dev-auth", post(dev_auth_gate))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(correlation_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();

    info!("Server running on http://0.0.0.0:3000");

    axum::serve(listener, app).await.unwrap();
}

async fn health_check() -> &'static str {
    "OK"
}

/// One chat turn: run the session's current task against the new input, then
/// apply any screen transition the turn implies.
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    let session_id_provided = request.session_id.is_some();
    let session_id = request
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if session_id_provided && Uuid::parse_str(&session_id).is_err() {
        error!(session_id = %session_id, "Invalid session ID format");
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut session = match state.session_storage.get(&session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            // A caller-provided id must reference an existing session
            if session_id_provided {
                error!(session_id = %session_id, "Session not found");
                return Err(StatusCode::NOT_FOUND);
            }
            info!(session_id = %session_id, "Creating new session");
            let session = Session::new_from_task(session_id.clone(), "welcome");
            session.context.set(session_keys::SCREEN, Screen::Chat).await;
            session
        }
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to get session");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    session
        .context
        .set(session_keys::USER_INPUT, request.content)
        .await;
    session
        .context
        .set(session_keys::SESSION_ID, session_id.clone())
        .await;

    let graph = get_or_create_graph(state.graph_storage.clone()).await?;

    let result = match graph.execute_session(&mut session).await {
        Ok(result) => result,
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to execute graph");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // Turns that finish a flow move the screen as well.
    let implied_event = if result.task_id == "generate_statement" {
        Some(ScreenEvent::IntakeCompleted)
    } else if result.status == ExecutionStatus::Completed {
        match result.task_id.as_str() {
            "edit_profile" => Some(ScreenEvent::EditCompleted),
            "post_claim_chat" => Some(ScreenEvent::BackToDocument),
            _ => None,
        }
    } else {
        None
    };
    if let Some(event) = implied_event {
        apply_screen_event(&state, &mut session, &event).await;
    }

    let screen = current_screen(&session).await;

    if let Err(e) = state.session_storage.save(session).await {
        error!(session_id = %session_id, error = %e, "Failed to save session");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    info!(session_id = %session_id, status = ?result.status, "Chat turn completed");

    Ok(Json(ChatResponse {
        session_id,
        response: result.response,
        status: format!("{:?}", result.status),
        screen,
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, StatusCode> {
    match state.session_storage.get(&session_id).await {
        Ok(Some(session)) => Ok(Json(session)),
        Ok(None) => {
            info!(session_id = %session_id, "Session not found");
            Err(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to get session");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Apply an explicit screen-router event to a session.
async fn session_event(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(event): Json<ScreenEvent>,
) -> Result<Json<EventResponse>, StatusCode> {
    let mut session = match state.session_storage.get(&session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => return Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to get session");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let screen = apply_screen_event(&state, &mut session, &event).await;

    if let Err(e) = state.session_storage.save(session).await {
        error!(session_id = %session_id, error = %e, "Failed to save session");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    Ok(Json(EventResponse { screen }))
}

/// Assemble the signing form from the session's profile, create the
/// e-signature submission, and hand back the hosted signing URL.
async fn create_signing(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SigningHandoff>, StatusCode> {
    let mut session = match state.session_storage.get(&session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => return Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to get session");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // Signing is payment-gated; anonymous sessions are sent to signup.
    let user: Option<String> = session.context.get(session_keys::USER_ID).await;
    if user.is_none() {
        session
            .context
            .set(session_keys::SCREEN, Screen::AuthSignup)
            .await;
        if let Err(e) = state.session_storage.save(session).await {
            error!(session_id = %session_id, error = %e, "Failed to save session");
        }
        return Err(StatusCode::UNAUTHORIZED);
    }

    let profile = crate::tasks::types::load_profile(&session.context).await;
    let form = StatementFormData::from_profile(&profile);

    let esign = match EsignClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!(session_id = %session_id, error = %e, "e-signature provider not configured");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let handoff = match esign.create_submission(&form, &profile.email).await {
        Ok(handoff) => handoff,
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to create signing submission");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    apply_screen_event(&state, &mut session, &ScreenEvent::SigningStarted).await;
    if let Err(e) = state.session_storage.save(session).await {
        error!(session_id = %session_id, error = %e, "Failed to save session");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    info!(session_id = %session_id, claim_id = handoff.claim_id, "Signing handoff created");
    Ok(Json(handoff))
}

/// Time-windowed developer gate. With a code, verifies it; without one,
/// issues the current window's code.
async fn dev_auth_gate(
    State(state): State<AppState>,
    Json(request): Json<DevAuthRequest>,
) -> Result<Json<DevAuthResponse>, StatusCode> {
    let allowed = match std::env::var("DEV_AUTH_EMAIL") {
        Ok(email) => email,
        Err(_) => {
            warn!("developer gate requested but DEV_AUTH_EMAIL is not configured");
            return Err(StatusCode::FORBIDDEN);
        }
    };
    if !request.email.eq_ignore_ascii_case(&allowed) {
        warn!(email = %request.email, "Unauthorized developer email");
        return Err(StatusCode::FORBIDDEN);
    }

    match request.code {
        Some(code) => {
            let valid = dev_auth::verify_code(&code);
            if valid {
                if let Some(session_id) = request.session_id {
                    enable_dev_mode(&state, &session_id).await;
                }
            }
            Ok(Json(DevAuthResponse {
                valid: Some(valid),
                code: None,
            }))
        }
        None => Ok(Json(DevAuthResponse {
            valid: None,
            code: Some(dev_auth::current_code()),
        })),
    }
}

async fn enable_dev_mode(state: &AppState, session_id: &str) {
    match state.session_storage.get(session_id).await {
        Ok(Some(session)) => {
            session.context.set(session_keys::DEV_MODE, true).await;
            if let Err(e) = state.session_storage.save(session).await {
                error!(session_id = %session_id, error = %e, "Failed to save session");
            } else {
                info!(session_id = %session_id, "Developer mode enabled");
            }
        }
        Ok(None) => warn!(session_id = %session_id, "Session not found for dev mode"),
        Err(e) => error!(session_id = %session_id, error = %e, "Failed to get session"),
    }
}

async fn current_screen(session: &Session) -> Screen {
    session
        .context
        .get(session_keys::SCREEN)
        .await
        .unwrap_or_default()
}

/// Route an event against the session: move the screen, run the paid-customer
/// check where required, and reset or repoint the flow for navigation events.
async fn apply_screen_event(
    state: &AppState,
    session: &mut Session,
    event: &ScreenEvent,
) -> Screen {
    use crate::tasks::types::{load_profile, store_profile};

    // Authentication events bind the user to the session and link the
    // stored profile to the account.
    match event {
        ScreenEvent::LoginSucceeded { user_id, email } => {
            session
                .context
                .set(session_keys::USER_ID, user_id.clone())
                .await;

            // Returning users get their stored profile back.
            let current = load_profile(&session.context).await;
            if current.email.is_empty() {
                if let Some(email) = email.as_deref() {
                    match state.profiles.fetch(email).await {
                        Ok(Some(stored)) => {
                            info!(email = %email, "restored stored profile");
                            store_profile(&session.context, &stored).await;
                        }
                        Ok(None) => {}
                        Err(e) => warn!(error = %e, "failed to load stored profile"),
                    }
                }
            }

            let mut profile = load_profile(&session.context).await;
            profile.has_signed_up = true;
            store_profile(&session.context, &profile).await;
            if let Err(e) = state.profiles.save(&profile).await {
                warn!(error = %e, "failed to link profile after login");
            }
        }
        ScreenEvent::SignupSucceeded { user_id } => {
            session
                .context
                .set(session_keys::USER_ID, user_id.clone())
                .await;

            let mut profile = load_profile(&session.context).await;
            profile.has_signed_up = true;
            store_profile(&session.context, &profile).await;
            if let Err(e) = state.profiles.save(&profile).await {
                warn!(error = %e, "failed to link profile after signup");
            }
        }
        // Confirming the claim persists it before the payment step.
        ScreenEvent::ProceedToPayment => {
            let profile = load_profile(&session.context).await;
            if let Err(e) = state.profiles.save(&profile).await {
                warn!(error = %e, "failed to persist profile before payment");
            }
        }
        // Navigation events also move the flow pointer.
        ScreenEvent::EditRequested => session.advance_to("edit_profile"),
        ScreenEvent::OpenPostClaimChat => session.advance_to("post_claim_chat"),
        _ => {}
    }

    let user: Option<String> = session.context.get(session_keys::USER_ID).await;
    let screen = match route(event, user.as_deref()) {
        Routed::To(screen) => screen,
        Routed::SubscriptionCheck { user_id } => {
            screen_for_subscription(state.subscriptions.has_paid_customer(&user_id).await)
        }
        Routed::Reset => {
            session.context.clear().await;
            session.current_task_id = "welcome".to_string();
            session.previous_task_id = None;
            session.status_message = None;
            Screen::Chat
        }
    };

    session.context.set(session_keys::SCREEN, screen).await;
    info!(session_id = %session.id, screen = ?screen, event = ?event, "Screen updated");
    screen
}

fn create_default_graph(profiles: Arc<ProfileStoreClient>) -> Graph {
    let welcome = Arc::new(WelcomeTask);
    let intake = Arc::new(IntakeTask);
    let generate_statement = Arc::new(GenerateStatementTask::new(profiles.clone()));
    let edit_profile = Arc::new(EditProfileTask::new(profiles));
    let post_claim_chat = Arc::new(PostClaimChatTask);
    let general_chat = Arc::new(GeneralChatTask);

    GraphBuilder::new("veteran_claims_intake")
        .add_task(welcome)
        .add_task(intake)
        .add_task(generate_statement)
        .add_task(edit_profile)
        .add_task(post_claim_chat)
        .add_task(general_chat)
        // First reply decides between the existing-claim guide and the
        // scripted intake.
        .add_conditional_edge(
            "welcome",
            |context| {
                context
                    .get_sync::<String>(session_keys::INTAKE_ROUTE)
                    .map(|route| route == intake_routes::EXISTING_CLAIM)
                    .unwrap_or(false)
            },
            "post_claim_chat",
            "intake",
        )
        .add_edge("intake", "generate_statement")
        .add_edge("generate_statement", "general_chat")
        .set_start_task("welcome")
        .build()
}

async fn get_or_create_graph(
    graph_storage: Arc<dyn GraphStorage>,
) -> Result<Arc<Graph>, StatusCode> {
    let graph_id = "default";
    match graph_storage.get(graph_id).await {
        Ok(Some(graph)) => Ok(graph),
        Ok(None) => {
            error!("Graph not found: {}", graph_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            error!("Failed to get graph: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        AppState {
            graph_storage: Arc::new(InMemoryGraphStorage::new()),
            session_storage: Arc::new(InMemorySessionStorage::new()),
            profiles: Arc::new(ProfileStoreClient::new("http://localhost:0")),
            subscriptions: Arc::new(SubscriptionClient::new("http://localhost:0")),
        }
    }

    #[tokio::test]
    async fn start_new_claim_resets_flow_and_screen() {
        let state = test_state();
        let mut session = Session::new_from_task("s1".to_string(), "general_chat");
        session
            .context
            .set(session_keys::SCREEN, Screen::DocumentPreview)
            .await;
        session.context.set(session_keys::QUESTION_INDEX, 7usize).await;
        session.context.add_user_message("hello").await;

        let screen = apply_screen_event(&state, &mut session, &ScreenEvent::StartNewClaim).await;

        assert_eq!(screen, Screen::Chat);
        assert_eq!(session.current_task_id, "welcome");
        let index: Option<usize> = session.context.get(session_keys::QUESTION_INDEX).await;
        assert!(index.is_none());
        assert!(session.context.history().is_empty());
    }

    #[tokio::test]
    async fn edit_request_points_the_flow_at_the_editor() {
        let state = test_state();
        let mut session = Session::new_from_task("s1".to_string(), "general_chat");

        let screen = apply_screen_event(&state, &mut session, &ScreenEvent::EditRequested).await;

        assert_eq!(screen, Screen::EditMode);
        assert_eq!(session.current_task_id, "edit_profile");
    }

    #[tokio::test]
    async fn signing_events_route_back_to_preview() {
        let state = test_state();
        let mut session = Session::new_from_task("s1".to_string(), "general_chat");

        let screen = apply_screen_event(&state, &mut session, &ScreenEvent::SigningStarted).await;
        assert_eq!(screen, Screen::DocumentSigning);

        let screen =
            apply_screen_event(&state, &mut session, &ScreenEvent::SigningDeferred).await;
        assert_eq!(screen, Screen::DocumentPreview);
    }

    #[tokio::test]
    async fn default_graph_routes_welcome_by_intake_route() {
        let graph = create_default_graph(Arc::new(ProfileStoreClient::new("http://localhost:0")));

        let context = claim_flow::Context::new();
        assert_eq!(
            graph.find_next_task("welcome", &context).as_deref(),
            Some("intake")
        );

        context
            .set(session_keys::INTAKE_ROUTE, intake_routes::EXISTING_CLAIM)
            .await;
        assert_eq!(
            graph.find_next_task("welcome", &context).as_deref(),
            Some("post_claim_chat")
        );

        assert_eq!(
            graph.find_next_task("intake", &context).as_deref(),
            Some("generate_statement")
        );
        assert_eq!(
            graph.find_next_task("generate_statement", &context).as_deref(),
            Some("general_chat")
        );
    }
}
