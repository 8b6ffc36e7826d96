use std::sync::Arc;

use chrono::Utc;
use futures_util::StreamExt;
use serde::Serialize;

use crate::application::ports::admission_repository::AdmissionRepository;
use crate::application::ports::announcement_repository::AnnouncementRepository;
use crate::application::ports::change_feed::ChangeFeed;
use crate::application::ports::contact_repository::ContactRepository;
use crate::application::ports::diary_repository::DiaryRepository;
use crate::application::ports::event_repository::EventRepository;
use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::application::ports::quiz_repository::QuizRepository;
use crate::application::ports::room_publisher::RoomPublisher;
use crate::application::ports::timetable_repository::TimetableRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::realtime::watch_registry::WatchRegistry;
use crate::domain::realtime::change::{
    ChangeNotification, ChangedDocument, Collection, Operation, Room, data_changes, route,
};
use crate::domain::users::user::{Role, Viewer};

/// Repositories the relay re-reads changed rows from.
#[derive(Clone)]
pub struct DocumentSources {
    pub users: Arc<dyn UserRepository>,
    pub admissions: Arc<dyn AdmissionRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub events: Arc<dyn EventRepository>,
    pub timetables: Arc<dyn TimetableRepository>,
    pub diary: Arc<dyn DiaryRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub announcements: Arc<dyn AnnouncementRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
}

fn other<T: Serialize>(doc: Option<T>) -> anyhow::Result<Option<ChangedDocument>> {
    Ok(doc
        .map(serde_json::to_value)
        .transpose()?
        .map(ChangedDocument::Other))
}

impl DocumentSources {
    /// Profiles of the students behind the given dashboard namespaces.
    pub async fn students(&self, namespaces: &[Room]) -> anyhow::Result<Vec<Viewer>> {
        let mut viewers = Vec::new();
        for room in namespaces {
            if let Room::Namespace {
                role: Role::Student,
                user_id,
            } = room
            {
                if let Some(user) = self.users.find_by_id(*user_id).await? {
                    viewers.push(user.viewer());
                }
            }
        }
        Ok(viewers)
    }

    /// Current state of the changed row. `None` for deletes and for rows
    /// that are gone by the time the notification is handled.
    pub async fn load(&self, change: &ChangeNotification) -> anyhow::Result<Option<ChangedDocument>> {
        if change.operation == Operation::Delete {
            return Ok(None);
        }
        let id = change.id;
        Ok(match change.collection {
            Collection::Quizzes => self
                .quizzes
                .find(id)
                .await?
                .map(|q| ChangedDocument::Quiz(Box::new(q))),
            Collection::QuizSubmissions => match self.quizzes.find_submission(id).await? {
                Some(submission) => self.quizzes.find(submission.quiz_id).await?.map(|quiz| {
                    ChangedDocument::Submission {
                        submission: Box::new(submission),
                        quiz_class: quiz.class,
                    }
                }),
                None => None,
            },
            Collection::Timetables => self
                .timetables
                .find(id)
                .await?
                .map(|t| ChangedDocument::Timetable(Box::new(t))),
            Collection::Events => self
                .events
                .find(id)
                .await?
                .map(|e| ChangedDocument::Event(Box::new(e))),
            Collection::Diary => self
                .diary
                .find(id)
                .await?
                .map(|d| ChangedDocument::Diary(Box::new(d))),
            Collection::Users => other(self.users.find_by_id(id).await?)?,
            Collection::Admissions => other(self.admissions.find(id).await?)?,
            Collection::Contact => other(self.contacts.find(id).await?)?,
            Collection::Announcements => other(self.announcements.find(id).await?)?,
            Collection::Feedback => other(self.feedback.find(id).await?)?,
        })
    }
}

/// Turns database change notifications into room messages. It is the only
/// producer of realtime frames; handlers write rows and the triggers do the
/// rest.
pub struct ChangeRelay {
    feed: Arc<dyn ChangeFeed>,
    publisher: Arc<dyn RoomPublisher>,
    watches: Arc<WatchRegistry>,
    sources: DocumentSources,
}

impl ChangeRelay {
    pub fn new(
        feed: Arc<dyn ChangeFeed>,
        publisher: Arc<dyn RoomPublisher>,
        watches: Arc<WatchRegistry>,
        sources: DocumentSources,
    ) -> Self {
        Self {
            feed,
            publisher,
            watches,
            sources,
        }
    }

    /// Runs until the feed ends. A failing notification is logged and
    /// skipped.
    pub async fn run(self) -> anyhow::Result<()> {
        let mut changes = self.feed.subscribe().await?;
        tracing::info!("change_relay_started");
        while let Some(change) = changes.next().await {
            if let Err(error) = self.relay(&change).await {
                tracing::error!(
                    error = ?error,
                    collection = change.collection.as_str(),
                    operation = change.operation.as_str(),
                    id = %change.id,
                    "change_relay_failed"
                );
            }
        }
        tracing::warn!("change_relay_stopped");
        Ok(())
    }

    /// Publishes the frames for one change and returns how many went out.
    pub async fn relay(&self, change: &ChangeNotification) -> anyhow::Result<usize> {
        let document = self.sources.load(change).await?;
        if document.is_none() && change.operation != Operation::Delete {
            tracing::debug!(
                collection = change.collection.as_str(),
                id = %change.id,
                "change_relay_document_missing"
            );
            return Ok(0);
        }
        let now = Utc::now();
        let mut messages = route(change, document.as_ref(), now)?;
        let namespaces = self.watches.watchers(change.collection).await;
        let students = match &document {
            Some(ChangedDocument::Event(_)) => self.sources.students(&namespaces).await?,
            _ => Vec::new(),
        };
        messages.extend(data_changes(
            change,
            document.as_ref(),
            namespaces,
            &students,
            now,
        )?);
        let sent = messages.len();
        for message in messages {
            self.publisher.publish(message).await?;
        }
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::*;
    use crate::domain::events::event::EventScope;
    use crate::domain::events::event::tests::sample_event;
    use crate::domain::quizzes::quiz::tests::sample_quiz;
    use uuid::Uuid;

    struct Fixture {
        users: Arc<InMemoryUsers>,
        events: Arc<InMemoryEvents>,
        quizzes: Arc<InMemoryQuizzes>,
        publisher: Arc<RecordingPublisher>,
        watches: Arc<WatchRegistry>,
        sources: DocumentSources,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUsers::default());
        let events = Arc::new(InMemoryEvents::default());
        let quizzes = Arc::new(InMemoryQuizzes::default());
        let sources = DocumentSources {
            users: users.clone(),
            admissions: Arc::new(InMemoryAdmissions::default()),
            quizzes: quizzes.clone(),
            events: events.clone(),
            timetables: Arc::new(InMemoryTimetables::default()),
            diary: Arc::new(InMemoryDiary::default()),
            contacts: Arc::new(InMemoryContacts::default()),
            announcements: Arc::new(InMemoryAnnouncements::default()),
            feedback: Arc::new(InMemoryFeedback::default()),
        };
        Fixture {
            users,
            events,
            quizzes,
            publisher: Arc::new(RecordingPublisher::default()),
            watches: Arc::new(WatchRegistry::new()),
            sources,
        }
    }

    fn change(collection: Collection, operation: Operation, id: Uuid) -> ChangeNotification {
        ChangeNotification {
            collection,
            operation,
            id,
        }
    }

    #[tokio::test]
    async fn relays_routes_and_dashboard_frames() {
        let f = fixture();
        let quiz = sample_quiz(Utc::now());
        f.quizzes.insert(quiz.clone());
        let teacher = Room::namespace(Role::Teacher, Uuid::new_v4());
        f.watches.register(teacher.clone(), &[Collection::Quizzes]).await;

        let feed = Arc::new(ScriptedFeed::new(vec![
            change(Collection::Quizzes, Operation::Insert, quiz.id),
            change(Collection::Quizzes, Operation::Delete, Uuid::new_v4()),
        ]));
        ChangeRelay::new(feed, f.publisher.clone(), f.watches.clone(), f.sources.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(
            f.publisher.events(),
            vec!["quiz:created", "dataChange", "quiz:deleted", "dataChange"]
        );
        let sent = f.publisher.sent.lock().unwrap();
        assert_eq!(sent[1].rooms, vec![teacher]);
        assert_eq!(sent[1].data["data"]["title"], serde_json::json!(quiz.title));
    }

    #[tokio::test]
    async fn vanished_rows_are_skipped() {
        let f = fixture();
        let relay = ChangeRelay::new(
            Arc::new(ScriptedFeed::default()),
            f.publisher.clone(),
            f.watches.clone(),
            f.sources.clone(),
        );
        let sent = relay
            .relay(&change(Collection::Events, Operation::Update, Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(sent, 0);
        assert!(f.publisher.events().is_empty());
    }

    #[tokio::test]
    async fn submissions_reach_the_quiz_class() {
        let f = fixture();
        let quiz = sample_quiz(Utc::now());
        f.quizzes.insert(quiz.clone());
        let submission = crate::domain::quizzes::quiz::NewSubmission {
            quiz_id: quiz.id,
            student_id: Uuid::new_v4(),
            answers: vec![],
            score: quiz.score(&[]),
            total_questions: quiz.questions.len() as i32,
            time_taken: None,
            submitted_at: Utc::now(),
        };
        let stored = f.quizzes.record_submission(&submission).await.unwrap().unwrap();
        let relay = ChangeRelay::new(
            Arc::new(ScriptedFeed::default()),
            f.publisher.clone(),
            f.watches.clone(),
            f.sources.clone(),
        );
        relay
            .relay(&change(Collection::QuizSubmissions, Operation::Insert, stored.id))
            .await
            .unwrap();
        let sent = f.publisher.sent.lock().unwrap();
        assert_eq!(sent[0].event, "quiz:submitted");
        assert_eq!(sent[0].rooms, vec![Room::class("6A")]);
        assert_eq!(sent[0].data["totalQuestions"], serde_json::json!(2));
    }

    #[tokio::test]
    async fn class_events_skip_student_dashboards_outside_the_class() {
        let f = fixture();
        let event = sample_event(Utc::now(), EventScope::Class);
        f.events.insert(event.clone());
        let in_class = f.users.seed("Ravi Kumar", Role::Student, Some("7B"));
        let elsewhere = f.users.seed("Asha Singh", Role::Student, Some("6A"));
        let ravi = Room::namespace(Role::Student, in_class.id);
        let asha = Room::namespace(Role::Student, elsewhere.id);
        f.watches.register(ravi.clone(), &[Collection::Events]).await;
        f.watches.register(asha.clone(), &[Collection::Events]).await;

        ChangeRelay::new(
            Arc::new(ScriptedFeed::default()),
            f.publisher.clone(),
            f.watches.clone(),
            f.sources.clone(),
        )
        .relay(&change(Collection::Events, Operation::Update, event.id))
        .await
        .unwrap();

        let sent = f.publisher.sent.lock().unwrap();
        let dashboards: Vec<_> = sent
            .iter()
            .filter(|m| m.event == "dataChange")
            .map(|m| m.rooms.clone())
            .collect();
        assert_eq!(dashboards, vec![vec![ravi]]);
        assert!(sent.iter().all(|m| !m.rooms.contains(&asha)));
    }
}
