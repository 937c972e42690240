//! Mock API for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;

use crate::envelope::Reply;
use crate::error::ApiError;
use crate::model::{
    AnswerOption, AnswerRegistration, CreatedAnswer, CreatedEvaluation, CreatedQuestion,
    FinishResult, Group, LoginCredentials, LoginGrant, NewAnswer, NewEvaluation, NewQuestion,
    OpenEvaluationsQuery, PresentationQuestion, PresentationRequest, Question, QuestionAssignment,
    StartedPresentation, StudentEvaluation, StudentGroup, Subject, Topic,
};
use crate::session::{Role, Session};
use crate::traits::{ApiResult, QuizzkiApi};

/// One recorded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login(Role),
    Subjects,
    Topics,
    SubjectGroups(u64),
    TopicQuestions(u64),
    CreateQuestion,
    CreateAnswer,
    CreateEvaluation,
    AssignQuestion,
    AssignRandom(u64),
    StudentGroups,
    OpenEvaluations(u64),
    StartPresentation(u64),
    PresentationQuestions(u64),
    QuestionOptions(u64),
    RegisterAnswer { question: u64, answer: u64 },
    Finish(u64),
}

impl Call {
    /// Short endpoint name, used for failure injection and body lookup.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Call::Login(_) => "login",
            Call::Subjects => "subjects",
            Call::Topics => "topics",
            Call::SubjectGroups(_) => "subject_groups",
            Call::TopicQuestions(_) => "topic_questions",
            Call::CreateQuestion => "create_question",
            Call::CreateAnswer => "create_answer",
            Call::CreateEvaluation => "create_evaluation",
            Call::AssignQuestion => "assign_question",
            Call::AssignRandom(_) => "assign_random",
            Call::StudentGroups => "student_groups",
            Call::OpenEvaluations(_) => "open_evaluations",
            Call::StartPresentation(_) => "start_presentation",
            Call::PresentationQuestions(_) => "presentation_questions",
            Call::QuestionOptions(_) => "question_options",
            Call::RegisterAnswer { .. } => "register_answer",
            Call::Finish(_) => "finish",
        }
    }
}

/// A scripted, in-memory `QuizzkiApi`.
///
/// Returns the canned data it was built with, records every call in order,
/// and can be told to fail specific calls.
#[derive(Default)]
pub struct MockApi {
    grant: Option<LoginGrant>,
    subjects: Vec<Subject>,
    topics: Vec<Topic>,
    groups: HashMap<u64, Vec<Group>>,
    questions: HashMap<u64, Vec<Question>>,
    student_groups: Vec<StudentGroup>,
    evaluations: HashMap<u64, Vec<StudentEvaluation>>,
    presentation_id: u64,
    presentation_questions: HashMap<u64, Vec<PresentationQuestion>>,
    options: HashMap<u64, Vec<AnswerOption>>,
    score: f64,
    /// Failures keyed by exact call.
    failing_calls: Vec<(Call, ApiError)>,
    /// Failures keyed by endpoint name.
    failing_endpoints: HashMap<&'static str, ApiError>,
    next_id: AtomicU64,
    calls: Mutex<Vec<Call>>,
    bodies: Mutex<HashMap<&'static str, serde_json::Value>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            grant: Some(LoginGrant {
                token: "mock-token".into(),
                id: "1".into(),
            }),
            presentation_id: 1,
            next_id: AtomicU64::new(100),
            ..Default::default()
        }
    }

    pub fn with_grant(mut self, token: &str, id: &str) -> Self {
        self.grant = Some(LoginGrant {
            token: token.into(),
            id: id.into(),
        });
        self
    }

    pub fn with_subjects(mut self, subjects: Vec<Subject>) -> Self {
        self.subjects = subjects;
        self
    }

    pub fn with_topics(mut self, topics: Vec<Topic>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_groups(mut self, subject_id: u64, groups: Vec<Group>) -> Self {
        self.groups.insert(subject_id, groups);
        self
    }

    pub fn with_questions(mut self, topic_id: u64, questions: Vec<Question>) -> Self {
        self.questions.insert(topic_id, questions);
        self
    }

    pub fn with_student_groups(mut self, groups: Vec<StudentGroup>) -> Self {
        self.student_groups = groups;
        self
    }

    pub fn with_evaluations(mut self, group_id: u64, evaluations: Vec<StudentEvaluation>) -> Self {
        self.evaluations.insert(group_id, evaluations);
        self
    }

    pub fn with_presentation(
        mut self,
        presentation_id: u64,
        evaluation_id: u64,
        questions: Vec<PresentationQuestion>,
    ) -> Self {
        self.presentation_id = presentation_id;
        self.presentation_questions.insert(evaluation_id, questions);
        self
    }

    pub fn with_options(mut self, question_id: u64, options: Vec<AnswerOption>) -> Self {
        self.options.insert(question_id, options);
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Make one exact call fail.
    pub fn failing_call(mut self, call: Call, error: ApiError) -> Self {
        self.failing_calls.push((call, error));
        self
    }

    /// Make every call to an endpoint fail.
    pub fn failing_endpoint(mut self, endpoint: &'static str, error: ApiError) -> Self {
        self.failing_endpoints.insert(endpoint, error);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of calls made to one endpoint.
    pub fn count(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.endpoint() == endpoint)
            .count()
    }

    /// The JSON body of the last request sent to `endpoint`.
    pub fn last_body(&self, endpoint: &str) -> Option<serde_json::Value> {
        self.bodies.lock().unwrap().get(endpoint).cloned()
    }

    fn record(&self, call: Call) -> Result<(), ApiError> {
        let endpoint = call.endpoint();
        self.calls.lock().unwrap().push(call.clone());

        if let Some((_, err)) = self.failing_calls.iter().find(|(c, _)| *c == call) {
            return Err(err.clone());
        }
        if let Some(err) = self.failing_endpoints.get(endpoint) {
            return Err(err.clone());
        }
        Ok(())
    }

    fn record_body(&self, endpoint: &'static str, body: &impl Serialize) {
        if let Ok(value) = serde_json::to_value(body) {
            self.bodies.lock().unwrap().insert(endpoint, value);
        }
    }

    fn reply<T>(message: &str, data: T) -> ApiResult<T> {
        Ok(Reply {
            message: message.to_string(),
            data,
        })
    }
}

#[async_trait]
impl QuizzkiApi for MockApi {
    async fn login(&self, role: Role, credentials: &LoginCredentials) -> ApiResult<LoginGrant> {
        self.record_body("login", credentials);
        self.record(Call::Login(role))?;
        match &self.grant {
            Some(grant) => Self::reply("Login exitoso", grant.clone()),
            None => Err(ApiError::Http {
                status: 401,
                message: "Credenciales inválidas".into(),
            }),
        }
    }

    async fn subjects(&self, _session: &Session) -> ApiResult<Vec<Subject>> {
        self.record(Call::Subjects)?;
        Self::reply("OK", self.subjects.clone())
    }

    async fn topics(&self, _session: &Session) -> ApiResult<Vec<Topic>> {
        self.record(Call::Topics)?;
        Self::reply("OK", self.topics.clone())
    }

    async fn subject_groups(&self, _session: &Session, subject_id: u64) -> ApiResult<Vec<Group>> {
        self.record(Call::SubjectGroups(subject_id))?;
        Self::reply(
            "OK",
            self.groups.get(&subject_id).cloned().unwrap_or_default(),
        )
    }

    async fn topic_questions(
        &self,
        _session: &Session,
        topic_id: u64,
    ) -> ApiResult<Vec<Question>> {
        self.record(Call::TopicQuestions(topic_id))?;
        Self::reply(
            "OK",
            self.questions.get(&topic_id).cloned().unwrap_or_default(),
        )
    }

    async fn create_question(
        &self,
        _session: &Session,
        question: &NewQuestion,
    ) -> ApiResult<CreatedQuestion> {
        self.record_body("create_question", question);
        self.record(Call::CreateQuestion)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Self::reply("Pregunta creada correctamente", CreatedQuestion { id })
    }

    async fn create_answer(&self, _session: &Session, answer: &NewAnswer) -> ApiResult<CreatedAnswer> {
        self.record_body("create_answer", answer);
        self.record(Call::CreateAnswer)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Self::reply("Respuesta creada correctamente", CreatedAnswer { id })
    }

    async fn create_evaluation(
        &self,
        _session: &Session,
        evaluation: &NewEvaluation,
    ) -> ApiResult<CreatedEvaluation> {
        self.record_body("create_evaluation", evaluation);
        self.record(Call::CreateEvaluation)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Self::reply("Evaluación creada correctamente", CreatedEvaluation { id })
    }

    async fn assign_question(
        &self,
        _session: &Session,
        assignment: &QuestionAssignment,
    ) -> ApiResult<()> {
        self.record_body("assign_question", assignment);
        self.record(Call::AssignQuestion)?;
        Self::reply("Pregunta asignada", ())
    }

    async fn assign_random_questions(
        &self,
        _session: &Session,
        evaluation_id: u64,
    ) -> ApiResult<()> {
        self.record(Call::AssignRandom(evaluation_id))?;
        Self::reply("Preguntas aleatorias asignadas", ())
    }

    async fn student_groups(&self, _session: &Session) -> ApiResult<Vec<StudentGroup>> {
        self.record(Call::StudentGroups)?;
        Self::reply("OK", self.student_groups.clone())
    }

    async fn open_evaluations(
        &self,
        _session: &Session,
        query: &OpenEvaluationsQuery,
    ) -> ApiResult<Vec<StudentEvaluation>> {
        self.record_body("open_evaluations", query);
        self.record(Call::OpenEvaluations(query.id_group))?;
        Self::reply(
            "OK",
            self.evaluations
                .get(&query.id_group)
                .cloned()
                .unwrap_or_default(),
        )
    }

    async fn start_presentation(
        &self,
        _session: &Session,
        request: &PresentationRequest,
    ) -> ApiResult<StartedPresentation> {
        self.record_body("start_presentation", request);
        self.record(Call::StartPresentation(request.id_evaluation))?;
        Self::reply(
            "Presentación iniciada",
            StartedPresentation {
                id: self.presentation_id,
            },
        )
    }

    async fn presentation_questions(
        &self,
        _session: &Session,
        evaluation_id: u64,
    ) -> ApiResult<Vec<PresentationQuestion>> {
        self.record(Call::PresentationQuestions(evaluation_id))?;
        Self::reply(
            "OK",
            self.presentation_questions
                .get(&evaluation_id)
                .cloned()
                .unwrap_or_default(),
        )
    }

    async fn question_options(
        &self,
        _session: &Session,
        question_id: u64,
    ) -> ApiResult<Vec<AnswerOption>> {
        self.record(Call::QuestionOptions(question_id))?;
        Self::reply(
            "OK",
            self.options.get(&question_id).cloned().unwrap_or_default(),
        )
    }

    async fn register_answer(
        &self,
        _session: &Session,
        registration: &AnswerRegistration,
    ) -> ApiResult<()> {
        self.record_body("register_answer", registration);
        self.record(Call::RegisterAnswer {
            question: registration.id_question,
            answer: registration.id_answer,
        })?;
        Self::reply("Respuesta registrada", ())
    }

    async fn finish_presentation(
        &self,
        _session: &Session,
        presentation_id: u64,
    ) -> ApiResult<FinishResult> {
        self.record(Call::Finish(presentation_id))?;
        Self::reply(
            "Evaluación finalizada",
            FinishResult { score: self.score },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_order() {
        let api = MockApi::new().with_topics(vec![Topic {
            id: 1,
            name: "Redes".into(),
        }]);
        let session = Session::new(Role::Teacher, "t", "1");

        let topics = api.topics(&session).await.unwrap();
        assert_eq!(topics.data.len(), 1);
        api.subjects(&session).await.unwrap();

        assert_eq!(api.calls(), vec![Call::Topics, Call::Subjects]);
        assert_eq!(api.count("topics"), 1);
    }

    #[tokio::test]
    async fn injected_failures() {
        let api = MockApi::new()
            .failing_endpoint(
                "subjects",
                ApiError::Server {
                    message: "caído".into(),
                },
            )
            .failing_call(Call::SubjectGroups(2), ApiError::Timeout(30));
        let session = Session::new(Role::Teacher, "t", "1");

        assert!(api.subjects(&session).await.is_err());
        assert!(api.subject_groups(&session, 1).await.is_ok());
        assert_eq!(
            api.subject_groups(&session, 2).await.unwrap_err(),
            ApiError::Timeout(30)
        );
        assert_eq!(api.call_count(), 3);
    }

    #[tokio::test]
    async fn bodies_are_kept() {
        let api = MockApi::new();
        let creds = LoginCredentials {
            email: "a@b.com".into(),
            password: "xyz".into(),
        };
        api.login(Role::Student, &creds).await.unwrap();
        assert_eq!(api.last_body("login").unwrap()["email"], "a@b.com");
    }
}
