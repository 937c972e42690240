//! Teacher console: reference listings and authoring.

use chrono::NaiveDateTime;
use tracing::{debug, instrument};

use crate::envelope::Reply;
use crate::error::{FlowError, ValidationError};
use crate::model::{
    Group, NewAnswer, NewEvaluation, NewQuestion, Question, QuestionAssignment, Subject, Topic,
    DEFAULT_QUESTION_TYPE,
};
use crate::session::Session;
use crate::traits::QuizzkiApi;
use crate::validation::{validate_answer, validate_percentage, validate_statement};

/// What the teacher fills in to author a question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDraft {
    pub topic_id: u64,
    pub statement: String,
    pub public: bool,
    /// Falls back to [`DEFAULT_QUESTION_TYPE`].
    pub question_type: Option<String>,
    pub composed_question_id: Option<u64>,
}

impl QuestionDraft {
    pub fn new(topic_id: u64, statement: impl Into<String>) -> Self {
        Self {
            topic_id,
            statement: statement.into(),
            public: true,
            question_type: None,
            composed_question_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerDraft {
    pub question_id: u64,
    pub description: String,
    pub correct: bool,
}

/// The evaluation form. Counts and percentages default to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationDraft {
    pub name: String,
    pub topic_id: u64,
    pub group_id: u64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub max_time: u32,
    pub question_count: u32,
    pub random_questions_count: u32,
    pub passing_percentage: f64,
    pub course_percentage: f64,
}

impl EvaluationDraft {
    fn check(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EvaluationNameRequired);
        }
        if self.topic_id == 0 {
            return Err(ValidationError::TopicRequired);
        }
        if self.group_id == 0 {
            return Err(ValidationError::GroupRequired);
        }
        validate_percentage(self.passing_percentage)?;
        validate_percentage(self.course_percentage)?;
        if self.end <= self.start {
            return Err(ValidationError::EndBeforeStart);
        }
        Ok(())
    }
}

/// Operations available to a signed-in teacher.
///
/// Every method is a single request made with the session's token, except
/// [`all_groups`](Self::all_groups) which walks the subjects one by one.
pub struct TeacherConsole<'a, A: QuizzkiApi + ?Sized> {
    api: &'a A,
    session: &'a Session,
}

impl<'a, A: QuizzkiApi + ?Sized> TeacherConsole<'a, A> {
    pub fn new(api: &'a A, session: &'a Session) -> Self {
        Self { api, session }
    }

    pub async fn subjects(&self) -> Result<Vec<Subject>, FlowError> {
        Ok(self.api.subjects(self.session).await?.data)
    }

    pub async fn topics(&self) -> Result<Vec<Topic>, FlowError> {
        Ok(self.api.topics(self.session).await?.data)
    }

    pub async fn groups_for_subject(&self, subject_id: u64) -> Result<Vec<Group>, FlowError> {
        Ok(self.api.subject_groups(self.session, subject_id).await?.data)
    }

    /// Groups of every subject, in subject order.
    #[instrument(skip(self))]
    pub async fn all_groups(&self) -> Result<Vec<Group>, FlowError> {
        let subjects = self.subjects().await?;
        let mut groups = Vec::new();
        for subject in &subjects {
            let batch = self.groups_for_subject(subject.id).await?;
            debug!(subject = subject.id, count = batch.len(), "groups loaded");
            groups.extend(batch);
        }
        Ok(groups)
    }

    pub async fn questions_for_topic(&self, topic_id: u64) -> Result<Vec<Question>, FlowError> {
        Ok(self.api.topic_questions(self.session, topic_id).await?.data)
    }

    /// Create a question and return its new id.
    #[instrument(skip_all, fields(topic = draft.topic_id))]
    pub async fn create_question(&self, draft: QuestionDraft) -> Result<Reply<u64>, FlowError> {
        validate_statement(&draft.statement)?;
        if draft.topic_id == 0 {
            return Err(ValidationError::TopicRequired.into());
        }

        let question = NewQuestion {
            statement: draft.statement,
            is_public: draft.public,
            question_type: draft
                .question_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_QUESTION_TYPE.to_string()),
            composed_question_id: draft.composed_question_id,
            topic_id: draft.topic_id,
            professor_id: self.session.numeric_id(),
        };
        let reply = self.api.create_question(self.session, &question).await?;
        Ok(reply.map(|created| created.id))
    }

    #[instrument(skip_all, fields(question = draft.question_id))]
    pub async fn create_answer(&self, draft: AnswerDraft) -> Result<Reply<u64>, FlowError> {
        validate_answer(&draft.description)?;

        let answer = NewAnswer {
            description: draft.description,
            is_correct: draft.correct,
            question_id: draft.question_id,
        };
        let reply = self.api.create_answer(self.session, &answer).await?;
        Ok(reply.map(|created| created.id))
    }

    #[instrument(skip_all, fields(name = %draft.name))]
    pub async fn create_evaluation(&self, draft: EvaluationDraft) -> Result<Reply<u64>, FlowError> {
        draft.check()?;

        let evaluation = NewEvaluation {
            name: draft.name,
            max_time: draft.max_time,
            question_count: draft.question_count,
            random_questions_count: draft.random_questions_count,
            passing_percentage: draft.passing_percentage,
            course_percentage: draft.course_percentage,
            start_date_time: draft.start,
            end_date_time: draft.end,
            topic_id: draft.topic_id,
            group_id: draft.group_id,
            professor_id: self.session.numeric_id(),
        };
        let reply = self.api.create_evaluation(self.session, &evaluation).await?;
        Ok(reply.map(|created| created.id))
    }

    /// Attach one question to an evaluation. Returns the server message.
    pub async fn assign_question(&self, assignment: &QuestionAssignment) -> Result<String, FlowError> {
        validate_percentage(assignment.percentage)?;
        Ok(self.api.assign_question(self.session, assignment).await?.message)
    }

    /// Let the server pick the evaluation's questions. Returns the server message.
    pub async fn assign_random(&self, evaluation_id: u64) -> Result<String, FlowError> {
        Ok(self
            .api
            .assign_random_questions(self.session, evaluation_id)
            .await?
            .message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::mock::{Call, MockApi};
    use crate::model::parse_datetime_local;
    use crate::session::Role;
    use serde_json::json;

    fn teacher() -> Session {
        Session::new(Role::Teacher, "jwt", "27")
    }

    fn subject(id: u64, name: &str) -> Subject {
        Subject {
            id,
            name: name.into(),
        }
    }

    fn group(id: u64, name: &str) -> Group {
        Group {
            id,
            name: name.into(),
            semester: "1".into(),
        }
    }

    fn draft() -> EvaluationDraft {
        EvaluationDraft {
            name: "Parcial 1".into(),
            topic_id: 3,
            group_id: 4,
            start: parse_datetime_local("2026-03-01T08:00").unwrap(),
            end: parse_datetime_local("2026-03-01T10:00").unwrap(),
            max_time: 60,
            question_count: 10,
            random_questions_count: 0,
            passing_percentage: 60.0,
            course_percentage: 20.0,
        }
    }

    #[tokio::test]
    async fn empty_statement_is_rejected_locally() {
        let api = MockApi::new();
        let session = teacher();
        let console = TeacherConsole::new(&api, &session);

        let err = console
            .create_question(QuestionDraft::new(1, "   "))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "La pregunta no puede estar vacía");
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn question_defaults_and_professor_id() {
        let api = MockApi::new();
        let session = teacher();
        let console = TeacherConsole::new(&api, &session);

        let reply = console
            .create_question(QuestionDraft::new(5, "¿Qué es UDP?"))
            .await
            .unwrap();
        assert_eq!(reply.data, 100);
        assert_eq!(reply.message, "Pregunta creada correctamente");
        assert_eq!(
            api.last_body("create_question").unwrap(),
            json!({
                "statement": "¿Qué es UDP?",
                "isPublic": "S",
                "questionType": "Selección única",
                "composedQuestionId": null,
                "topicId": 5,
                "professorId": 27
            })
        );
    }

    #[tokio::test]
    async fn private_question_with_overrides() {
        let api = MockApi::new();
        let session = teacher();
        let console = TeacherConsole::new(&api, &session);

        let mut q = QuestionDraft::new(5, "Parte b");
        q.public = false;
        q.question_type = Some("Selección múltiple".into());
        q.composed_question_id = Some(9);
        console.create_question(q).await.unwrap();

        let body = api.last_body("create_question").unwrap();
        assert_eq!(body["isPublic"], "N");
        assert_eq!(body["questionType"], "Selección múltiple");
        assert_eq!(body["composedQuestionId"], 9);
    }

    #[tokio::test]
    async fn empty_answer_has_its_own_message() {
        let api = MockApi::new();
        let session = teacher();
        let console = TeacherConsole::new(&api, &session);

        let err = console
            .create_answer(AnswerDraft {
                question_id: 1,
                description: "".into(),
                correct: true,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "La respuesta no puede estar vacía");
        assert_eq!(api.call_count(), 0);

        console
            .create_answer(AnswerDraft {
                question_id: 1,
                description: "TCP".into(),
                correct: true,
            })
            .await
            .unwrap();
        assert_eq!(
            api.last_body("create_answer").unwrap(),
            json!({"description": "TCP", "isCorrect": "S", "idQuestion": 1})
        );
    }

    #[tokio::test]
    async fn evaluation_checks_run_before_network() {
        let api = MockApi::new();
        let session = teacher();
        let console = TeacherConsole::new(&api, &session);

        let mut bad = draft();
        bad.end = bad.start;
        assert!(console.create_evaluation(bad).await.unwrap_err().is_local());

        let mut bad = draft();
        bad.name = " ".into();
        let err = console.create_evaluation(bad).await.unwrap_err();
        assert_eq!(err.to_string(), "El nombre de la evaluación es requerido");

        let mut bad = draft();
        bad.group_id = 0;
        let err = console.create_evaluation(bad).await.unwrap_err();
        assert_eq!(err.to_string(), "Seleccione un grupo");

        let mut bad = draft();
        bad.passing_percentage = 120.0;
        assert!(console.create_evaluation(bad).await.is_err());

        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn evaluation_body_uses_datetime_local() {
        let api = MockApi::new();
        let session = teacher();
        let console = TeacherConsole::new(&api, &session);

        let reply = console.create_evaluation(draft()).await.unwrap();
        assert_eq!(reply.message, "Evaluación creada correctamente");

        let body = api.last_body("create_evaluation").unwrap();
        assert_eq!(body["startDateTime"], "2026-03-01T08:00");
        assert_eq!(body["endDateTime"], "2026-03-01T10:00");
        assert_eq!(body["professorId"], 27);
        assert_eq!(body["groupId"], 4);
    }

    #[tokio::test]
    async fn all_groups_walks_subjects_in_order() {
        let api = MockApi::new()
            .with_subjects(vec![subject(1, "Redes"), subject(2, "Bases")])
            .with_groups(1, vec![group(10, "A")])
            .with_groups(2, vec![group(20, "B"), group(21, "C")]);
        let session = teacher();
        let console = TeacherConsole::new(&api, &session);

        let groups = console.all_groups().await.unwrap();
        let ids: Vec<u64> = groups.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![10, 20, 21]);
        assert_eq!(
            api.calls(),
            vec![Call::Subjects, Call::SubjectGroups(1), Call::SubjectGroups(2)]
        );
    }

    #[tokio::test]
    async fn all_groups_stops_at_first_failure() {
        let api = MockApi::new()
            .with_subjects(vec![subject(1, "Redes"), subject(2, "Bases"), subject(3, "SO")])
            .failing_call(
                Call::SubjectGroups(2),
                ApiError::Server {
                    message: "Materia no encontrada".into(),
                },
            );
        let session = teacher();
        let console = TeacherConsole::new(&api, &session);

        let err = console.all_groups().await.unwrap_err();
        assert_eq!(err.to_string(), "Materia no encontrada");
        assert_eq!(api.count("subject_groups"), 2);
    }

    #[tokio::test]
    async fn assignments_return_server_message() {
        let api = MockApi::new();
        let session = teacher();
        let console = TeacherConsole::new(&api, &session);

        let message = console
            .assign_question(&QuestionAssignment {
                evaluation_id: 7,
                question_id: 8,
                percentage: 25.0,
                time_limit_secs: Some(90),
            })
            .await
            .unwrap();
        assert_eq!(message, "Pregunta asignada");
        assert_eq!(api.last_body("assign_question").unwrap()["hasMaxTime"], "Y");

        let message = console.assign_random(7).await.unwrap();
        assert_eq!(message, "Preguntas aleatorias asignadas");
        assert_eq!(api.calls().last(), Some(&Call::AssignRandom(7)));
    }
}
