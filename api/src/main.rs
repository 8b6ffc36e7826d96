use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::MatchedPath;
use axum::{Router, routing::get};
use dotenvy::dotenv;
use ::http::HeaderValue;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use campus_api::application::services::realtime::change_relay::ChangeRelay;
use campus_api::application::services::realtime::watch_registry::WatchRegistry;
use campus_api::bootstrap::app_context::{AppContext, AppServices};
use campus_api::bootstrap::config::Config;
use campus_api::infrastructure::db::repositories::{
    admission_repository_sqlx::SqlxAdmissionRepository,
    announcement_repository_sqlx::SqlxAnnouncementRepository,
    contact_repository_sqlx::SqlxContactRepository, diary_repository_sqlx::SqlxDiaryRepository,
    event_repository_sqlx::SqlxEventRepository, feedback_repository_sqlx::SqlxFeedbackRepository,
    quiz_repository_sqlx::SqlxQuizRepository, timetable_repository_sqlx::SqlxTimetableRepository,
    user_repository_sqlx::SqlxUserRepository,
};
use campus_api::infrastructure::notifications::LogSmsNotifier;
use campus_api::infrastructure::realtime::{PgChangeFeed, RoomHub};
use campus_api::presentation::http;
use campus_api::presentation::http::health::HealthState;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            http::auth::register,
            http::auth::login,
            http::auth::logout,
            http::auth::me,
            http::admissions::submit_admission,
            http::admissions::list_admissions,
            http::admissions::approve_admission,
            http::admissions::decline_admission,
            http::quizzes::list_quizzes,
            http::quizzes::create_quiz,
            http::quizzes::list_class_quizzes,
            http::quizzes::get_quiz,
            http::quizzes::update_quiz,
            http::quizzes::delete_quiz,
            http::quizzes::submit_quiz,
            http::quizzes::list_submissions,
            http::events::list_events,
            http::events::upcoming_events,
            http::events::create_event,
            http::events::update_event,
            http::events::delete_event,
            http::events::register_for_event,
            http::timetable::list_timetable,
            http::timetable::class_timetable,
            http::timetable::create_timetable_entry,
            http::timetable::update_timetable_entry,
            http::timetable::delete_timetable_entry,
            http::feedback::create_feedback,
            http::feedback::list_feedback,
            http::feedback::my_feedback,
            http::contact::submit_contact,
            http::contact::list_contacts,
            http::contact::update_contact_status,
            http::contact::reply_to_contact,
            http::diary::create_diary_entry,
            http::diary::my_diary,
            http::diary::student_diary,
            http::diary::comment_on_diary,
            http::announcements::create_announcement,
            http::announcements::list_announcements,
            http::realtime::admin_dashboard,
            http::realtime::teacher_dashboard,
            http::realtime::student_dashboard,
            http::realtime::disconnect,
            campus_api::presentation::ws::axum_ws_entry,
            http::health::health,
        ),
        components(schemas(
            http::error::ErrorBody,
            http::auth::RegisterRequest,
            http::auth::LoginRequest,
            http::auth::LoginResponse,
            http::auth::MeResponse,
            http::admissions::AdmissionRequest,
            http::admissions::AdmissionCreated,
            http::admissions::DecisionRequest,
            http::admissions::DecisionResponse,
            http::events::RegistrationResponse,
            http::contact::StatusRequest,
            http::contact::ReplyRequest,
            http::diary::CommentRequest,
            http::realtime::AdminDashboardResponse,
            http::realtime::TeacherDashboardResponse,
            http::realtime::StudentDashboardResponse,
            http::realtime::DisconnectRequest,
            http::realtime::DisconnectResponse,
            http::health::HealthResp,
            campus_api::domain::users::user::User,
            campus_api::domain::users::user::Role,
            campus_api::domain::admissions::admission::Admission,
            campus_api::domain::admissions::admission::AdmissionStatus,
            campus_api::domain::quizzes::quiz::Quiz,
            campus_api::domain::quizzes::quiz::QuizView,
            campus_api::domain::quizzes::quiz::QuizPatch,
            campus_api::domain::quizzes::quiz::QuizScore,
            campus_api::domain::quizzes::quiz::QuizSubmission,
            campus_api::domain::quizzes::quiz::Question,
            campus_api::domain::quizzes::quiz::QuestionOption,
            campus_api::domain::quizzes::quiz::QuestionType,
            campus_api::domain::quizzes::quiz::CorrectAnswer,
            campus_api::domain::quizzes::quiz::Answer,
            campus_api::domain::quizzes::quiz::GradedAnswer,
            campus_api::domain::quizzes::quiz::ShowResults,
            campus_api::application::use_cases::quizzes::create_quiz::CreateQuizRequest,
            campus_api::application::use_cases::quizzes::create_quiz::QuestionInput,
            campus_api::application::use_cases::quizzes::submit_quiz::SubmitQuizRequest,
            campus_api::application::use_cases::quizzes::submit_quiz::SubmissionReceipt,
            campus_api::domain::events::event::Event,
            campus_api::domain::events::event::EventView,
            campus_api::domain::events::event::EventPatch,
            campus_api::domain::events::event::EventType,
            campus_api::domain::events::event::EventScope,
            campus_api::domain::events::event::Recurrence,
            campus_api::domain::events::event::Frequency,
            campus_api::domain::events::event::Attachment,
            campus_api::application::use_cases::events::manage_event::CreateEventRequest,
            campus_api::application::use_cases::events::manage_event::UpdateEventRequest,
            campus_api::domain::timetables::timetable::TimetableEntry,
            campus_api::domain::timetables::timetable::TimetableDraft,
            campus_api::domain::timetables::timetable::TimetablePatch,
            campus_api::domain::timetables::timetable::Weekday,
            campus_api::domain::feedback::feedback::Feedback,
            campus_api::domain::feedback::feedback::FeedbackWithStudent,
            campus_api::domain::feedback::feedback::NewFeedback,
            campus_api::domain::contact::contact::ContactMessage,
            campus_api::domain::contact::contact::ContactReply,
            campus_api::domain::contact::contact::NewContact,
            campus_api::domain::contact::contact::ContactCounts,
            campus_api::domain::contact::contact::ContactStatus,
            campus_api::domain::contact::contact::ContactPriority,
            campus_api::domain::contact::contact::ContactCategory,
            campus_api::domain::diary::diary::DiaryEntry,
            campus_api::domain::diary::diary::DiaryComment,
            campus_api::domain::diary::diary::NewDiaryEntry,
            campus_api::domain::announcements::announcement::Announcement,
            campus_api::domain::announcements::announcement::NewAnnouncement,
            campus_api::domain::announcements::announcement::AnnouncementKind,
            campus_api::domain::announcements::announcement::AnnouncementPriority,
            campus_api::domain::announcements::announcement::Audience,
            campus_api::application::use_cases::dashboards::admin_dashboard::AdminDashboardData,
            campus_api::application::use_cases::dashboards::admin_dashboard::AdmissionCounts,
            campus_api::application::use_cases::dashboards::member_dashboards::TeacherDashboardData,
            campus_api::application::use_cases::dashboards::member_dashboards::StudentDashboardData,
        )),
        tags(
            (name = "Auth", description = "Authentication"),
            (name = "Admissions", description = "Admission applications and decisions"),
            (name = "Quizzes", description = "Quizzes, submissions and grading"),
            (name = "Events", description = "School calendar and registrations"),
            (name = "Timetable", description = "Class timetables"),
            (name = "Feedback", description = "Student feedback"),
            (name = "Contact", description = "Contact inbox"),
            (name = "Diary", description = "Student diaries"),
            (name = "Announcements", description = "Announcements"),
            (name = "Realtime", description = "Dashboards and live updates"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

fn cors_layer(cfg: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            ::http::Method::GET,
            ::http::Method::POST,
            ::http::Method::PUT,
            ::http::Method::DELETE,
            ::http::Method::PATCH,
            ::http::Method::OPTIONS,
        ])
        .allow_headers([
            ::http::header::CONTENT_TYPE,
            ::http::header::AUTHORIZATION,
        ]);
    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        _ if cfg.is_production => {
            // FRONTEND_URL is enforced at startup in production; deny everything otherwise.
            base.allow_origin(AllowOrigin::exact(HeaderValue::from_static("http://invalid")))
        }
        _ => base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(?e, "shutdown_signal_failed");
    }
    info!("shutdown_requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "campus_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(
        port = cfg.api_port,
        production = cfg.is_production,
        channel = %cfg.change_feed_channel,
        sms = cfg.sms_enabled,
        "Starting campus backend"
    );

    // Database
    let pool = campus_api::infrastructure::db::connect_pool(
        &cfg.database_url,
        cfg.database_max_connections,
        &cfg.change_feed_channel,
    )
    .await?;
    campus_api::infrastructure::db::migrate(&pool).await?;

    let rooms = RoomHub::new(cfg.room_buffer);
    let watches = Arc::new(WatchRegistry::new());

    let services = AppServices::new(
        Arc::new(SqlxUserRepository::new(pool.clone())),
        Arc::new(SqlxAdmissionRepository::new(pool.clone())),
        Arc::new(SqlxQuizRepository::new(pool.clone())),
        Arc::new(SqlxEventRepository::new(pool.clone())),
        Arc::new(SqlxTimetableRepository::new(pool.clone())),
        Arc::new(SqlxDiaryRepository::new(pool.clone())),
        Arc::new(SqlxContactRepository::new(pool.clone())),
        Arc::new(SqlxFeedbackRepository::new(pool.clone())),
        Arc::new(SqlxAnnouncementRepository::new(pool.clone())),
        Arc::new(LogSmsNotifier::new(cfg.sms_enabled)),
        rooms.clone(),
        watches.clone(),
    );
    let ctx = AppContext::new(cfg.clone(), services);

    // Change relay: database notifications -> socket rooms
    let feed = Arc::new(PgChangeFeed::new(
        pool.clone(),
        cfg.change_feed_channel.clone(),
        Duration::from_secs(cfg.change_feed_retry_secs),
    ));
    let relay = ChangeRelay::new(feed, Arc::new(rooms.clone()), watches, ctx.document_sources());
    let relay_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(relay.run());

    // Build API router
    let api_router = Router::new()
        .nest(
            "/api",
            http::health::routes(HealthState {
                pool: pool.clone(),
                rooms: rooms.clone(),
            }),
        )
        .nest("/api/auth", http::auth::routes(ctx.clone()))
        .nest("/api", http::admissions::routes(ctx.clone()))
        .nest("/api", http::quizzes::routes(ctx.clone()))
        .nest("/api", http::events::routes(ctx.clone()))
        .nest("/api", http::timetable::routes(ctx.clone()))
        .nest("/api", http::feedback::routes(ctx.clone()))
        .nest("/api", http::contact::routes(ctx.clone()))
        .nest("/api", http::diary::routes(ctx.clone()))
        .nest("/api", http::announcements::routes(ctx.clone()))
        .nest("/api", http::realtime::routes(ctx.clone()))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()));

    // Mount WS endpoint on the same port as HTTP
    let ws_router = Router::new()
        .route(
            "/api/realtime/ws",
            get(campus_api::presentation::ws::axum_ws_entry),
        )
        .with_state(ctx.clone());

    let app = api_router
        .merge(ws_router)
        .layer(cors_layer(&cfg))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &::http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    relay_handle.abort();
    match relay_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(?e, "Change relay failed"),
        Err(e) if e.is_cancelled() => {}
        Err(e) => error!(?e, "Change relay panicked"),
    }
    served?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_the_socket_and_error_body() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/realtime/ws"));
        assert!(doc.paths.paths.contains_key("/api/quizzes/{id}/submit"));
        let schemas = doc.components.map(|c| c.schemas).unwrap_or_default();
        assert!(schemas.contains_key("ErrorBody"));
    }
}
