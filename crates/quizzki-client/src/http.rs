//! `QuizzkiApi` over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use quizzki_core::envelope::{classify, classify_ack, Reply};
use quizzki_core::error::ApiError;
use quizzki_core::model::{
    AnswerOption, AnswerRegistration, CreatedAnswer, CreatedEvaluation, CreatedQuestion,
    FinishResult, Group, LoginCredentials, LoginGrant, NewAnswer, NewEvaluation, NewQuestion,
    OneOrMany, OpenEvaluationsQuery, PresentationQuestion, PresentationQuestions,
    PresentationRequest, Question, QuestionAssignment, QuestionOptions, StartedPresentation,
    StudentEvaluation, StudentGroup, Subject, Topic,
};
use quizzki_core::session::{Role, Session};
use quizzki_core::traits::{ApiResult, QuizzkiApi};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A Quizzki server reached over HTTP.
pub struct HttpApi {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, session: Option<&Session>) -> RequestBuilder {
        let req = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("content-type", "application/json");
        match session {
            Some(s) => req.header("Authorization", format!("Bearer {}", s.token)),
            None => req,
        }
    }

    /// Send and read the body once. Transport failures are mapped here;
    /// everything after this point is envelope classification.
    async fn send(&self, req: RequestBuilder) -> Result<Raw, ApiError> {
        let response = req.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(Raw {
            status: status.as_u16(),
            reason: status.canonical_reason(),
            body,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::Network(e.to_string())
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        let raw = self.send(req).await?;
        classify(raw.status, raw.reason, &raw.body)
            .inspect_err(|e| warn!(error = %e, "request failed"))
    }

    async fn acknowledge(&self, req: RequestBuilder) -> ApiResult<()> {
        let raw = self.send(req).await?;
        classify_ack(raw.status, raw.reason, &raw.body)
            .inspect_err(|e| warn!(error = %e, "request failed"))
    }

    async fn get<T: DeserializeOwned>(&self, session: &Session, path: &str) -> ApiResult<T> {
        self.fetch(self.request(Method::GET, path, Some(session)))
            .await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.fetch(self.request(Method::POST, path, Some(session)).json(body))
            .await
    }
}

struct Raw {
    status: u16,
    reason: Option<&'static str>,
    body: String,
}

fn unwrap_many<T>(reply: Reply<OneOrMany<T>>) -> Reply<Vec<T>> {
    reply.map(OneOrMany::into_vec)
}

#[async_trait]
impl QuizzkiApi for HttpApi {
    #[instrument(skip_all, fields(role = %role))]
    async fn login(&self, role: Role, credentials: &LoginCredentials) -> ApiResult<LoginGrant> {
        let path = format!("/api/auth/login/{role}");
        self.fetch(self.request(Method::POST, &path, None).json(credentials))
            .await
    }

    #[instrument(skip_all)]
    async fn subjects(&self, session: &Session) -> ApiResult<Vec<Subject>> {
        self.get(session, "/api/teacher/subjects").await
    }

    #[instrument(skip_all)]
    async fn topics(&self, session: &Session) -> ApiResult<Vec<Topic>> {
        self.get(session, "/api/teacher/topics").await
    }

    #[instrument(skip(self, session))]
    async fn subject_groups(&self, session: &Session, subject_id: u64) -> ApiResult<Vec<Group>> {
        self.get(session, &format!("/api/teacher/subjects/{subject_id}/groups"))
            .await
    }

    #[instrument(skip(self, session))]
    async fn topic_questions(
        &self,
        session: &Session,
        topic_id: u64,
    ) -> ApiResult<Vec<Question>> {
        self.get(session, &format!("/api/teacher/topics/{topic_id}/questions"))
            .await
    }

    #[instrument(skip_all, fields(topic = question.topic_id))]
    async fn create_question(
        &self,
        session: &Session,
        question: &NewQuestion,
    ) -> ApiResult<CreatedQuestion> {
        self.post(session, "/api/teacher/question/create", question)
            .await
    }

    #[instrument(skip_all, fields(question = answer.question_id))]
    async fn create_answer(
        &self,
        session: &Session,
        answer: &NewAnswer,
    ) -> ApiResult<CreatedAnswer> {
        self.post(session, "/api/teacher/answerOption/create", answer)
            .await
    }

    #[instrument(skip_all, fields(name = %evaluation.name))]
    async fn create_evaluation(
        &self,
        session: &Session,
        evaluation: &NewEvaluation,
    ) -> ApiResult<CreatedEvaluation> {
        self.post(session, "/api/teacher/evaluation/create", evaluation)
            .await
    }

    #[instrument(skip_all, fields(evaluation = assignment.evaluation_id, question = assignment.question_id))]
    async fn assign_question(
        &self,
        session: &Session,
        assignment: &QuestionAssignment,
    ) -> ApiResult<()> {
        let req = self
            .request(
                Method::POST,
                "/api/teacher/evaluation/assign-question",
                Some(session),
            )
            .json(assignment);
        self.acknowledge(req).await
    }

    #[instrument(skip(self, session))]
    async fn assign_random_questions(
        &self,
        session: &Session,
        evaluation_id: u64,
    ) -> ApiResult<()> {
        let path = format!("/api/teacher/evaluation/{evaluation_id}/assign-random-questions");
        self.fetch::<serde_json::Value>(self.request(Method::POST, &path, Some(session)))
            .await
            .map(|reply| reply.map(|_| ()))
    }

    #[instrument(skip_all)]
    async fn student_groups(&self, session: &Session) -> ApiResult<Vec<StudentGroup>> {
        self.get(session, &format!("/api/student/{}/groups", session.id))
            .await
    }

    #[instrument(skip_all, fields(group = query.id_group))]
    async fn open_evaluations(
        &self,
        session: &Session,
        query: &OpenEvaluationsQuery,
    ) -> ApiResult<Vec<StudentEvaluation>> {
        let path = format!("/api/student/{}/evaluations", session.id);
        self.post(session, &path, query).await.map(unwrap_many)
    }

    #[instrument(skip_all, fields(evaluation = request.id_evaluation))]
    async fn start_presentation(
        &self,
        session: &Session,
        request: &PresentationRequest,
    ) -> ApiResult<StartedPresentation> {
        let path = format!("/api/student/{}/evaluations/present", session.id);
        self.post(session, &path, request).await
    }

    #[instrument(skip(self, session))]
    async fn presentation_questions(
        &self,
        session: &Session,
        evaluation_id: u64,
    ) -> ApiResult<Vec<PresentationQuestion>> {
        let path = format!("/api/student/evaluations/{evaluation_id}/questions");
        let reply: Reply<PresentationQuestions> = self.get(session, &path).await?;
        Ok(reply.map(|wrapped| wrapped.questions))
    }

    #[instrument(skip(self, session))]
    async fn question_options(
        &self,
        session: &Session,
        question_id: u64,
    ) -> ApiResult<Vec<AnswerOption>> {
        let path = format!("/api/student/evaluations/questions/{question_id}/options");
        let reply: Reply<QuestionOptions> = self.get(session, &path).await?;
        Ok(reply.map(|wrapped| wrapped.options))
    }

    #[instrument(skip_all, fields(question = registration.id_question, answer = registration.id_answer))]
    async fn register_answer(
        &self,
        session: &Session,
        registration: &AnswerRegistration,
    ) -> ApiResult<()> {
        let path = format!("/api/student/{}/evaluations/register-answer", session.id);
        let req = self
            .request(Method::POST, &path, Some(session))
            .json(registration);
        self.acknowledge(req).await
    }

    #[instrument(skip(self, session))]
    async fn finish_presentation(
        &self,
        session: &Session,
        presentation_id: u64,
    ) -> ApiResult<FinishResult> {
        let path = format!("/api/student/evaluations/{presentation_id}/finish");
        self.fetch(self.request(Method::POST, &path, Some(session)))
            .await
    }
}
