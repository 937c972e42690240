//! Student console: the exam state machine.
//!
//! ```text
//! Start → GroupsListed → EvaluationsListed → Presenting → Finished
//! ```
//!
//! Each transition is one or two requests. A failed request returns the
//! error and leaves the machine where it was; calling an operation from the
//! wrong state is refused before anything is sent.

use std::collections::HashMap;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, instrument};

use crate::envelope::Reply;
use crate::error::FlowError;
use crate::model::{
    AnswerOption, AnswerRegistration, OpenEvaluationsQuery, PresentationQuestion,
    PresentationRequest, StudentEvaluation, StudentGroup,
};
use crate::session::Session;
use crate::traits::QuizzkiApi;

/// Source address reported when the caller does not configure one.
pub const DEFAULT_IP_SOURCE: &str = "127.0.0.1";

#[derive(Debug, Clone, PartialEq)]
pub enum ExamState {
    Start,
    GroupsListed(Vec<StudentGroup>),
    EvaluationsListed {
        group_id: u64,
        evaluations: Vec<StudentEvaluation>,
    },
    Presenting {
        presentation_id: u64,
        evaluation_id: u64,
        questions: Vec<PresentationQuestion>,
    },
    Finished {
        score: f64,
    },
}

impl ExamState {
    fn name(&self) -> &'static str {
        match self {
            ExamState::Start => "start",
            ExamState::GroupsListed(_) => "groups listed",
            ExamState::EvaluationsListed { .. } => "evaluations listed",
            ExamState::Presenting { .. } => "presenting",
            ExamState::Finished { .. } => "finished",
        }
    }
}

/// One student's walk from group selection to a finished presentation.
pub struct ExamSession<'a, A: QuizzkiApi + ?Sized> {
    api: &'a A,
    session: &'a Session,
    ip_source: String,
    state: ExamState,
    options: HashMap<u64, Vec<AnswerOption>>,
    selections: HashMap<u64, u64>,
}

impl<'a, A: QuizzkiApi + ?Sized> ExamSession<'a, A> {
    pub fn new(api: &'a A, session: &'a Session) -> Self {
        Self {
            api,
            session,
            ip_source: DEFAULT_IP_SOURCE.to_string(),
            state: ExamState::Start,
            options: HashMap::new(),
            selections: HashMap::new(),
        }
    }

    /// Address sent as `ipSource` when a presentation starts.
    pub fn with_ip_source(mut self, ip_source: impl Into<String>) -> Self {
        self.ip_source = ip_source.into();
        self
    }

    pub fn state(&self) -> &ExamState {
        &self.state
    }

    fn refuse<T>(&self, operation: &str) -> Result<T, FlowError> {
        Err(FlowError::InvalidState(format!(
            "cannot {operation} while {}",
            self.state.name()
        )))
    }

    fn presentation_id(&self) -> Option<u64> {
        match self.state {
            ExamState::Presenting {
                presentation_id, ..
            } => Some(presentation_id),
            _ => None,
        }
    }

    pub fn groups(&self) -> &[StudentGroup] {
        match &self.state {
            ExamState::GroupsListed(groups) => groups,
            _ => &[],
        }
    }

    pub fn evaluations(&self) -> &[StudentEvaluation] {
        match &self.state {
            ExamState::EvaluationsListed { evaluations, .. } => evaluations,
            _ => &[],
        }
    }

    /// The questions of the running presentation.
    pub fn questions(&self) -> &[PresentationQuestion] {
        match &self.state {
            ExamState::Presenting { questions, .. } => questions,
            _ => &[],
        }
    }

    /// List the student's groups. Not allowed mid-presentation.
    pub async fn load_groups(&mut self) -> Result<&[StudentGroup], FlowError> {
        if matches!(self.state, ExamState::Presenting { .. }) {
            return self.refuse("list groups");
        }
        let groups = self.api.student_groups(self.session).await?.data;
        self.state = ExamState::GroupsListed(groups);
        Ok(self.groups())
    }

    /// List the evaluations open to `group_id` right now.
    pub async fn select_group(&mut self, group_id: u64) -> Result<&[StudentEvaluation], FlowError> {
        self.select_group_at(group_id, Local::now().naive_local()).await
    }

    /// Like [`select_group`](Self::select_group) with an explicit clock.
    pub async fn select_group_at(
        &mut self,
        group_id: u64,
        now: NaiveDateTime,
    ) -> Result<&[StudentEvaluation], FlowError> {
        if !matches!(
            self.state,
            ExamState::GroupsListed(_) | ExamState::EvaluationsListed { .. }
        ) {
            return self.refuse("select a group");
        }
        let query = OpenEvaluationsQuery::new(group_id, self.session.numeric_id(), now);
        let evaluations = self.api.open_evaluations(self.session, &query).await?.data;
        debug!(group_id, count = evaluations.len(), "evaluations loaded");

        self.state = ExamState::EvaluationsListed {
            group_id,
            evaluations,
        };
        Ok(self.evaluations())
    }

    /// Open a presentation for `evaluation_id`, then fetch its questions.
    ///
    /// Once the presentation exists the machine is `Presenting` even if the
    /// question fetch fails; [`reload_questions`](Self::reload_questions)
    /// retries the fetch without opening a second presentation.
    #[instrument(skip(self))]
    pub async fn select_evaluation(
        &mut self,
        evaluation_id: u64,
    ) -> Result<&[PresentationQuestion], FlowError> {
        if !matches!(self.state, ExamState::EvaluationsListed { .. }) {
            return self.refuse("start an evaluation");
        }
        let request = PresentationRequest {
            id_evaluation: evaluation_id,
            id_student: self.session.numeric_id(),
            ip_source: self.ip_source.clone(),
        };
        let presentation_id = self
            .api
            .start_presentation(self.session, &request)
            .await?
            .data
            .id;
        info!(presentation_id, "presentation started");

        self.options.clear();
        self.selections.clear();
        self.state = ExamState::Presenting {
            presentation_id,
            evaluation_id,
            questions: Vec::new(),
        };
        self.reload_questions().await
    }

    /// Fetch the running presentation's questions again.
    pub async fn reload_questions(&mut self) -> Result<&[PresentationQuestion], FlowError> {
        let ExamState::Presenting { evaluation_id, .. } = self.state else {
            return self.refuse("load questions");
        };
        let fetched = self
            .api
            .presentation_questions(self.session, evaluation_id)
            .await?
            .data;
        if let ExamState::Presenting { questions, .. } = &mut self.state {
            *questions = fetched;
        }
        Ok(self.questions())
    }

    /// Options for a question, fetched once per presentation.
    pub async fn options(&mut self, question_id: u64) -> Result<&[AnswerOption], FlowError> {
        if self.presentation_id().is_none() {
            return self.refuse("load options");
        }
        if !self.options.contains_key(&question_id) {
            let fetched = self
                .api
                .question_options(self.session, question_id)
                .await?
                .data;
            self.options.insert(question_id, fetched);
        }
        Ok(self
            .options
            .get(&question_id)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// Register `option_id` as the answer to `question_id`.
    ///
    /// The local selection only changes once the server accepts it.
    #[instrument(skip(self))]
    pub async fn answer(&mut self, question_id: u64, option_id: u64) -> Result<String, FlowError> {
        let Some(presentation_id) = self.presentation_id() else {
            return self.refuse("answer");
        };
        let registration = AnswerRegistration {
            id_evaluation_presentation: presentation_id,
            id_question: question_id,
            id_answer: option_id,
        };
        let reply = self.api.register_answer(self.session, &registration).await?;
        self.selections.insert(question_id, option_id);
        Ok(reply.message)
    }

    /// The last option successfully registered for a question.
    pub fn selected(&self, question_id: u64) -> Option<u64> {
        self.selections.get(&question_id).copied()
    }

    /// Close the presentation and return the score.
    #[instrument(skip(self))]
    pub async fn finish(&mut self) -> Result<Reply<f64>, FlowError> {
        let Some(presentation_id) = self.presentation_id() else {
            return self.refuse("finish");
        };
        let reply = self
            .api
            .finish_presentation(self.session, presentation_id)
            .await?;
        let score = reply.data.score;
        info!(presentation_id, score, "presentation finished");

        self.state = ExamState::Finished { score };
        Ok(reply.map(|result| result.score))
    }
}
