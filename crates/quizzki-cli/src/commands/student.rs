//! The `quizzki student ...` commands.
//!
//! Each one-shot command maps to a single request. `exam` runs the whole
//! flow interactively.

use anyhow::Result;
use chrono::Local;
use clap::Subcommand;
use comfy_table::{Cell, Table};

use quizzki_core::error::FlowError;
use quizzki_core::model::{
    AnswerOption, AnswerRegistration, OpenEvaluationsQuery, PresentationQuestion,
    PresentationRequest, StudentEvaluation, StudentGroup,
};
use quizzki_core::session::Role;
use quizzki_core::student::ExamSession;
use quizzki_core::traits::QuizzkiApi;

use super::{exam, load_view, print_table, table, Context};

#[derive(Subcommand)]
pub enum StudentCommand {
    /// List your groups
    Groups,

    /// List evaluations open to a group right now
    Evaluations {
        #[arg(long)]
        group: u64,
    },

    /// Start presenting an evaluation
    Start {
        #[arg(long)]
        evaluation: u64,
    },

    /// List an evaluation's questions
    Questions {
        #[arg(long)]
        evaluation: u64,
    },

    /// List a question's answer options
    Options {
        #[arg(long)]
        question: u64,
    },

    /// Register an answer
    Answer {
        #[arg(long)]
        presentation: u64,

        #[arg(long)]
        question: u64,

        #[arg(long)]
        option: u64,
    },

    /// Finish a presentation and show the score
    Finish {
        #[arg(long)]
        presentation: u64,
    },

    /// Take an evaluation interactively
    Exam,
}

pub async fn execute(ctx: &Context, command: StudentCommand) -> Result<()> {
    let session = ctx.session(Role::Student)?;
    let api = ctx.api()?;

    match command {
        StudentCommand::Groups => {
            let groups = load_view(async {
                Ok::<_, FlowError>(api.student_groups(&session).await?.data)
            })
            .await?;
            print_table(&groups_table(&groups), "No groups.");
        }

        StudentCommand::Evaluations { group } => {
            let query =
                OpenEvaluationsQuery::new(group, session.numeric_id(), Local::now().naive_local());
            let evaluations = load_view(async {
                Ok::<_, FlowError>(api.open_evaluations(&session, &query).await?.data)
            })
            .await?;
            print_table(&evaluations_table(&evaluations), "No open evaluations.");
        }

        StudentCommand::Start { evaluation } => {
            let request = PresentationRequest {
                id_evaluation: evaluation,
                id_student: session.numeric_id(),
                ip_source: ctx.config.source_address.clone(),
            };
            let reply = api.start_presentation(&session, &request).await?;
            println!("{} (presentation {})", reply.message, reply.data.id);
        }

        StudentCommand::Questions { evaluation } => {
            let questions = load_view(async {
                Ok::<_, FlowError>(api.presentation_questions(&session, evaluation).await?.data)
            })
            .await?;
            print_table(&questions_table(&questions), "No questions.");
        }

        StudentCommand::Options { question } => {
            let options = load_view(async {
                Ok::<_, FlowError>(api.question_options(&session, question).await?.data)
            })
            .await?;
            print_table(&options_table(&options), "No options.");
        }

        StudentCommand::Answer {
            presentation,
            question,
            option,
        } => {
            let registration = AnswerRegistration {
                id_evaluation_presentation: presentation,
                id_question: question,
                id_answer: option,
            };
            let reply = api.register_answer(&session, &registration).await?;
            println!("{}", reply.message);
        }

        StudentCommand::Finish { presentation } => {
            let reply = api.finish_presentation(&session, presentation).await?;
            println!("{}", reply.message);
            println!("Score: {}", reply.data.score);
        }

        StudentCommand::Exam => {
            let flow = ExamSession::new(&api, &session)
                .with_ip_source(ctx.config.source_address.clone());
            exam::run(flow, std::io::stdin().lock(), std::io::stdout()).await?;
        }
    }

    Ok(())
}

pub fn groups_table(groups: &[StudentGroup]) -> Table {
    let mut t = table(&["ID", "Group", "Subject"]);
    for g in groups {
        t.add_row(vec![Cell::new(g.id), Cell::new(&g.name), Cell::new(&g.subject_name)]);
    }
    t
}

pub fn evaluations_table(evaluations: &[StudentEvaluation]) -> Table {
    let mut t = table(&["ID", "Evaluation", "Starts", "Ends", "Questions", "Minutes", "State"]);
    for e in evaluations {
        t.add_row(vec![
            Cell::new(e.id),
            Cell::new(&e.name),
            Cell::new(&e.starts_at),
            Cell::new(&e.ends_at),
            Cell::new(e.question_count.map(|n| n.to_string()).unwrap_or_default()),
            Cell::new(e.max_time.map(|n| n.to_string()).unwrap_or_default()),
            Cell::new(&e.state),
        ]);
    }
    t
}

pub fn questions_table(questions: &[PresentationQuestion]) -> Table {
    let mut t = table(&["ID", "Question"]);
    for q in questions {
        t.add_row(vec![Cell::new(q.id), Cell::new(&q.statement)]);
    }
    t
}

pub fn options_table(options: &[AnswerOption]) -> Table {
    let mut t = table(&["ID", "Option"]);
    for o in options {
        t.add_row(vec![Cell::new(o.id), Cell::new(&o.description)]);
    }
    t
}
