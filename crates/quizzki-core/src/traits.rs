//! The `QuizzkiApi` trait.
//!
//! One method per REST endpoint. `quizzki-client` implements it over HTTP;
//! [`MockApi`](crate::mock::MockApi) implements it in memory for tests. The
//! flows in [`auth`](crate::auth), [`teacher`](crate::teacher) and
//! [`student`](crate::student) only ever talk to this trait.

use async_trait::async_trait;

use crate::envelope::Reply;
use crate::error::ApiError;
use crate::model::{
    AnswerOption, AnswerRegistration, CreatedAnswer, CreatedEvaluation, CreatedQuestion,
    FinishResult, Group, LoginCredentials, LoginGrant, NewAnswer, NewEvaluation, NewQuestion,
    OpenEvaluationsQuery, PresentationQuestion, PresentationRequest, Question, QuestionAssignment,
    StartedPresentation, StudentEvaluation, StudentGroup, Subject, Topic,
};
use crate::session::{Role, Session};

pub type ApiResult<T> = Result<Reply<T>, ApiError>;

#[async_trait]
pub trait QuizzkiApi: Send + Sync {
    // -- auth ---------------------------------------------------------------

    /// `POST /api/auth/login/{role}`
    async fn login(&self, role: Role, credentials: &LoginCredentials) -> ApiResult<LoginGrant>;

    // -- teacher ------------------------------------------------------------

    /// `GET /api/teacher/subjects`
    async fn subjects(&self, session: &Session) -> ApiResult<Vec<Subject>>;

    /// `GET /api/teacher/topics`
    async fn topics(&self, session: &Session) -> ApiResult<Vec<Topic>>;

    /// `GET /api/teacher/subjects/{id}/groups`
    async fn subject_groups(&self, session: &Session, subject_id: u64) -> ApiResult<Vec<Group>>;

    /// `GET /api/teacher/topics/{id}/questions`
    async fn topic_questions(&self, session: &Session, topic_id: u64)
        -> ApiResult<Vec<Question>>;

    /// `POST /api/teacher/question/create`
    async fn create_question(
        &self,
        session: &Session,
        question: &NewQuestion,
    ) -> ApiResult<CreatedQuestion>;

    /// `POST /api/teacher/answerOption/create`
    async fn create_answer(&self, session: &Session, answer: &NewAnswer)
        -> ApiResult<CreatedAnswer>;

    /// `POST /api/teacher/evaluation/create`
    async fn create_evaluation(
        &self,
        session: &Session,
        evaluation: &NewEvaluation,
    ) -> ApiResult<CreatedEvaluation>;

    /// `POST /api/teacher/evaluation/assign-question`
    async fn assign_question(
        &self,
        session: &Session,
        assignment: &QuestionAssignment,
    ) -> ApiResult<()>;

    /// `POST /api/teacher/evaluation/{id}/assign-random-questions`
    async fn assign_random_questions(&self, session: &Session, evaluation_id: u64)
        -> ApiResult<()>;

    // -- student ------------------------------------------------------------

    /// `GET /api/student/{id}/groups`
    async fn student_groups(&self, session: &Session) -> ApiResult<Vec<StudentGroup>>;

    /// `POST /api/student/{id}/evaluations`
    async fn open_evaluations(
        &self,
        session: &Session,
        query: &OpenEvaluationsQuery,
    ) -> ApiResult<Vec<StudentEvaluation>>;

    /// `POST /api/student/{id}/evaluations/present`
    async fn start_presentation(
        &self,
        session: &Session,
        request: &PresentationRequest,
    ) -> ApiResult<StartedPresentation>;

    /// `GET /api/student/evaluations/{id}/questions`
    async fn presentation_questions(
        &self,
        session: &Session,
        evaluation_id: u64,
    ) -> ApiResult<Vec<PresentationQuestion>>;

    /// `GET /api/student/evaluations/questions/{id}/options`
    async fn question_options(
        &self,
        session: &Session,
        question_id: u64,
    ) -> ApiResult<Vec<AnswerOption>>;

    /// `POST /api/student/{id}/evaluations/register-answer`
    async fn register_answer(
        &self,
        session: &Session,
        registration: &AnswerRegistration,
    ) -> ApiResult<()>;

    /// `POST /api/student/evaluations/{id}/finish`
    async fn finish_presentation(
        &self,
        session: &Session,
        presentation_id: u64,
    ) -> ApiResult<FinishResult>;
}
