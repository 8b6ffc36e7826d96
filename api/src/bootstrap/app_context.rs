use std::sync::Arc;

use crate::application::ports::admission_repository::AdmissionRepository;
use crate::application::ports::announcement_repository::AnnouncementRepository;
use crate::application::ports::contact_repository::ContactRepository;
use crate::application::ports::diary_repository::DiaryRepository;
use crate::application::ports::event_repository::EventRepository;
use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::application::ports::quiz_repository::QuizRepository;
use crate::application::ports::sms_notifier::SmsNotifier;
use crate::application::ports::timetable_repository::TimetableRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::realtime::change_relay::DocumentSources;
use crate::application::services::realtime::watch_registry::WatchRegistry;
use crate::bootstrap::config::Config;
use crate::infrastructure::realtime::RoomHub;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    user_repo: Arc<dyn UserRepository>,
    admission_repo: Arc<dyn AdmissionRepository>,
    quiz_repo: Arc<dyn QuizRepository>,
    event_repo: Arc<dyn EventRepository>,
    timetable_repo: Arc<dyn TimetableRepository>,
    diary_repo: Arc<dyn DiaryRepository>,
    contact_repo: Arc<dyn ContactRepository>,
    feedback_repo: Arc<dyn FeedbackRepository>,
    announcement_repo: Arc<dyn AnnouncementRepository>,
    sms: Arc<dyn SmsNotifier>,
    rooms: RoomHub,
    watches: Arc<WatchRegistry>,
}

impl AppServices {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        admission_repo: Arc<dyn AdmissionRepository>,
        quiz_repo: Arc<dyn QuizRepository>,
        event_repo: Arc<dyn EventRepository>,
        timetable_repo: Arc<dyn TimetableRepository>,
        diary_repo: Arc<dyn DiaryRepository>,
        contact_repo: Arc<dyn ContactRepository>,
        feedback_repo: Arc<dyn FeedbackRepository>,
        announcement_repo: Arc<dyn AnnouncementRepository>,
        sms: Arc<dyn SmsNotifier>,
        rooms: RoomHub,
        watches: Arc<WatchRegistry>,
    ) -> Self {
        Self {
            user_repo,
            admission_repo,
            quiz_repo,
            event_repo,
            timetable_repo,
            diary_repo,
            contact_repo,
            feedback_repo,
            announcement_repo,
            sms,
            rooms,
            watches,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn admission_repo(&self) -> Arc<dyn AdmissionRepository> {
        self.services.admission_repo.clone()
    }

    pub fn quiz_repo(&self) -> Arc<dyn QuizRepository> {
        self.services.quiz_repo.clone()
    }

    pub fn event_repo(&self) -> Arc<dyn EventRepository> {
        self.services.event_repo.clone()
    }

    pub fn timetable_repo(&self) -> Arc<dyn TimetableRepository> {
        self.services.timetable_repo.clone()
    }

    pub fn diary_repo(&self) -> Arc<dyn DiaryRepository> {
        self.services.diary_repo.clone()
    }

    pub fn contact_repo(&self) -> Arc<dyn ContactRepository> {
        self.services.contact_repo.clone()
    }

    pub fn feedback_repo(&self) -> Arc<dyn FeedbackRepository> {
        self.services.feedback_repo.clone()
    }

    pub fn announcement_repo(&self) -> Arc<dyn AnnouncementRepository> {
        self.services.announcement_repo.clone()
    }

    pub fn sms(&self) -> Arc<dyn SmsNotifier> {
        self.services.sms.clone()
    }

    pub fn rooms(&self) -> RoomHub {
        self.services.rooms.clone()
    }

    pub fn watches(&self) -> Arc<WatchRegistry> {
        self.services.watches.clone()
    }

    /// The repositories the change relay re-reads documents from.
    pub fn document_sources(&self) -> DocumentSources {
        let s = &self.services;
        DocumentSources {
            users: s.user_repo.clone(),
            admissions: s.admission_repo.clone(),
            quizzes: s.quiz_repo.clone(),
            events: s.event_repo.clone(),
            timetables: s.timetable_repo.clone(),
            diary: s.diary_repo.clone(),
            contacts: s.contact_repo.clone(),
            announcements: s.announcement_repo.clone(),
            feedback: s.feedback_repo.clone(),
        }
    }
}

#[cfg(test)]
impl AppContext {
    /// Context backed by the in-memory ports.
    pub fn in_memory() -> Self {
        use crate::application::testing::*;
        let services = AppServices::new(
            Arc::new(InMemoryUsers::default()),
            Arc::new(InMemoryAdmissions::default()),
            Arc::new(InMemoryQuizzes::default()),
            Arc::new(InMemoryEvents::default()),
            Arc::new(InMemoryTimetables::default()),
            Arc::new(InMemoryDiary::default()),
            Arc::new(InMemoryContacts::default()),
            Arc::new(InMemoryFeedback::default()),
            Arc::new(InMemoryAnnouncements::default()),
            Arc::new(RecordingSms::default()),
            RoomHub::new(16),
            Arc::new(WatchRegistry::new()),
        );
        AppContext::new(Config::for_tests(), services)
    }
}
