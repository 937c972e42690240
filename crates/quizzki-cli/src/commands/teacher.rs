//! The `quizzki teacher ...` commands.

use anyhow::Result;
use chrono::NaiveDateTime;
use clap::Subcommand;
use comfy_table::Cell;

use quizzki_core::model::{parse_datetime_local, QuestionAssignment};
use quizzki_core::session::Role;
use quizzki_core::teacher::{AnswerDraft, EvaluationDraft, QuestionDraft, TeacherConsole};

use super::{load_view, print_table, table, Context};

#[derive(Subcommand)]
pub enum TeacherCommand {
    /// List subjects
    Subjects {
        /// Also list each subject's groups
        #[arg(long)]
        with_groups: bool,
    },

    /// List topics
    Topics,

    /// List the groups of one subject
    Groups {
        #[arg(long)]
        subject: u64,
    },

    /// List the groups of every subject
    AllGroups,

    /// List the questions of a topic
    Questions {
        #[arg(long)]
        topic: u64,
    },

    /// Author a question
    CreateQuestion {
        #[arg(long)]
        topic: u64,

        #[arg(long)]
        statement: String,

        /// Hide the question from other teachers
        #[arg(long)]
        private: bool,

        /// Question type (default: "Selección única")
        #[arg(long)]
        question_type: Option<String>,

        /// Parent question this one is part of
        #[arg(long)]
        composed_of: Option<u64>,
    },

    /// Add an answer option to a question
    CreateAnswer {
        #[arg(long)]
        question: u64,

        #[arg(long)]
        description: String,

        /// Mark this option as the correct one
        #[arg(long)]
        correct: bool,
    },

    /// Schedule an evaluation
    CreateEvaluation {
        #[arg(long)]
        name: String,

        #[arg(long)]
        topic: u64,

        #[arg(long)]
        group: u64,

        /// Start, as YYYY-MM-DDTHH:MM
        #[arg(long, value_parser = parse_datetime_local)]
        start: NaiveDateTime,

        /// End, as YYYY-MM-DDTHH:MM
        #[arg(long, value_parser = parse_datetime_local)]
        end: NaiveDateTime,

        /// Minutes allowed
        #[arg(long, default_value = "0")]
        max_time: u32,

        #[arg(long, default_value = "0")]
        question_count: u32,

        /// How many questions the server picks at random
        #[arg(long, default_value = "0")]
        random_questions: u32,

        /// Passing percentage
        #[arg(long, default_value = "0")]
        passing: f64,

        /// Weight of the evaluation in the course, as a percentage
        #[arg(long, default_value = "0")]
        course_weight: f64,
    },

    /// Attach a question to an evaluation
    AssignQuestion {
        #[arg(long)]
        evaluation: u64,

        #[arg(long)]
        question: u64,

        /// Weight of the question within the evaluation
        #[arg(long)]
        percentage: f64,

        /// Per-question time limit in seconds
        #[arg(long)]
        time_limit: Option<u32>,
    },

    /// Let the server pick an evaluation's questions
    AssignRandom {
        #[arg(long)]
        evaluation: u64,
    },
}

pub async fn execute(ctx: &Context, command: TeacherCommand) -> Result<()> {
    let session = ctx.session(Role::Teacher)?;
    let api = ctx.api()?;
    let console = TeacherConsole::new(&api, &session);

    match command {
        TeacherCommand::Subjects { with_groups } => {
            let subjects = load_view(console.subjects()).await?;
            if !with_groups {
                let mut t = table(&["ID", "Subject"]);
                for s in &subjects {
                    t.add_row(vec![Cell::new(s.id), Cell::new(&s.name)]);
                }
                print_table(&t, "No subjects.");
                return Ok(());
            }

            let mut t = table(&["Subject", "Group ID", "Group", "Semester"]);
            for s in &subjects {
                for g in load_view(console.groups_for_subject(s.id)).await? {
                    t.add_row(vec![
                        Cell::new(&s.name),
                        Cell::new(g.id),
                        Cell::new(&g.name),
                        Cell::new(&g.semester),
                    ]);
                }
            }
            print_table(&t, "No groups.");
        }

        TeacherCommand::Topics => {
            let mut t = table(&["ID", "Topic"]);
            for topic in load_view(console.topics()).await? {
                t.add_row(vec![Cell::new(topic.id), Cell::new(&topic.name)]);
            }
            print_table(&t, "No topics.");
        }

        TeacherCommand::Groups { subject } => {
            let groups = load_view(console.groups_for_subject(subject)).await?;
            print_groups(&groups);
        }

        TeacherCommand::AllGroups => {
            let groups = load_view(console.all_groups()).await?;
            print_groups(&groups);
        }

        TeacherCommand::Questions { topic } => {
            let mut t = table(&["ID", "Statement", "Type", "Public", "Part of"]);
            for q in load_view(console.questions_for_topic(topic)).await? {
                t.add_row(vec![
                    Cell::new(q.id),
                    Cell::new(&q.statement),
                    Cell::new(&q.question_type),
                    Cell::new(if q.is_public() { "yes" } else { "no" }),
                    Cell::new(
                        q.composed_question_id
                            .map(|id| id.to_string())
                            .unwrap_or_default(),
                    ),
                ]);
            }
            print_table(&t, "No questions for this topic.");
        }

        TeacherCommand::CreateQuestion {
            topic,
            statement,
            private,
            question_type,
            composed_of,
        } => {
            let draft = QuestionDraft {
                topic_id: topic,
                statement,
                public: !private,
                question_type,
                composed_question_id: composed_of,
            };
            let reply = console.create_question(draft).await?;
            println!("{} (question {})", reply.message, reply.data);
        }

        TeacherCommand::CreateAnswer {
            question,
            description,
            correct,
        } => {
            let draft = AnswerDraft {
                question_id: question,
                description,
                correct,
            };
            let reply = console.create_answer(draft).await?;
            println!("{} (answer {})", reply.message, reply.data);
        }

        TeacherCommand::CreateEvaluation {
            name,
            topic,
            group,
            start,
            end,
            max_time,
            question_count,
            random_questions,
            passing,
            course_weight,
        } => {
            let draft = EvaluationDraft {
                name,
                topic_id: topic,
                group_id: group,
                start,
                end,
                max_time,
                question_count,
                random_questions_count: random_questions,
                passing_percentage: passing,
                course_percentage: course_weight,
            };
            let reply = console.create_evaluation(draft).await?;
            println!("{} (evaluation {})", reply.message, reply.data);
        }

        TeacherCommand::AssignQuestion {
            evaluation,
            question,
            percentage,
            time_limit,
        } => {
            let assignment = QuestionAssignment {
                evaluation_id: evaluation,
                question_id: question,
                percentage,
                time_limit_secs: time_limit,
            };
            println!("{}", console.assign_question(&assignment).await?);
        }

        TeacherCommand::AssignRandom { evaluation } => {
            println!("{}", console.assign_random(evaluation).await?);
        }
    }

    Ok(())
}

fn print_groups(groups: &[quizzki_core::model::Group]) {
    let mut t = table(&["ID", "Group", "Semester"]);
    for g in groups {
        t.add_row(vec![Cell::new(g.id), Cell::new(&g.name), Cell::new(&g.semester)]);
    }
    print_table(&t, "No groups.");
}
