//! The interactive `quizzki student exam` loop.
//!
//! Prompts are written to `out` and answers read line by line from `input`.
//! A failed request prints its message and the prompt is repeated; only a
//! closed input ends the exam early.

use std::io::{BufRead, Lines, Write};

use anyhow::{bail, Result};

use quizzki_core::student::{ExamSession, ExamState};
use quizzki_core::traits::QuizzkiApi;

use super::student::{evaluations_table, groups_table, options_table};

struct Prompter<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// The next trimmed line, or `None` once input is closed.
    fn ask(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{label}: ")?;
        self.out.flush()?;
        match self.lines.next() {
            Some(line) => Ok(Some(line?.trim().to_string())),
            None => {
                writeln!(self.out)?;
                Ok(None)
            }
        }
    }

    /// Ask until the answer is a number.
    fn ask_id(&mut self, label: &str) -> Result<u64> {
        loop {
            let Some(answer) = self.ask(label)? else {
                bail!("input closed before the exam finished");
            };
            match answer.parse() {
                Ok(id) => return Ok(id),
                Err(_) => writeln!(self.out, "Not a number: {answer:?}")?,
            }
        }
    }

    /// Wait for Enter before retrying a failed request.
    fn retry(&mut self, error: impl std::fmt::Display) -> Result<()> {
        writeln!(self.out, "Error: {error}")?;
        if self.ask("Press Enter to retry")?.is_none() {
            bail!("input closed before the exam finished");
        }
        Ok(())
    }

    fn say(&mut self, text: impl std::fmt::Display) -> Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }
}

pub async fn run<A, R, W>(mut exam: ExamSession<'_, A>, input: R, out: W) -> Result<()>
where
    A: QuizzkiApi + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut io = Prompter {
        lines: input.lines(),
        out,
    };

    loop {
        match exam.load_groups().await {
            Ok(groups) if groups.is_empty() => {
                io.say("You are not enrolled in any group.")?;
                return Ok(());
            }
            Ok(groups) => {
                io.say(groups_table(groups))?;
                break;
            }
            Err(e) => io.retry(e)?,
        }
    }

    loop {
        let group_id = io.ask_id("Group ID")?;
        match exam.select_group(group_id).await {
            Ok(evaluations) if evaluations.is_empty() => {
                io.say("No open evaluations for this group.")?;
            }
            Ok(evaluations) => {
                io.say(evaluations_table(evaluations))?;
                break;
            }
            Err(e) => io.say(format!("Error: {e}"))?,
        }
    }

    loop {
        let evaluation_id = io.ask_id("Evaluation ID")?;
        let started = exam.select_evaluation(evaluation_id).await.map(|_| ());
        match started {
            Ok(()) => break,
            Err(e) if matches!(exam.state(), ExamState::Presenting { .. }) => {
                io.retry(e)?;
                while let Err(e) = exam.reload_questions().await {
                    io.retry(e)?;
                }
                break;
            }
            Err(e) => io.say(format!("Error: {e}"))?,
        }
    }

    let questions = exam.questions().to_vec();
    let total = questions.len();
    for (n, question) in questions.iter().enumerate() {
        io.say(format!("\n[{}/{total}] {}", n + 1, question.statement))?;

        let options = loop {
            match exam.options(question.id).await {
                Ok(options) => break options.to_vec(),
                Err(e) => io.retry(e)?,
            }
        };
        io.say(options_table(&options))?;

        loop {
            let Some(answer) = io.ask("Option ID (Enter to skip)")? else {
                bail!("input closed before the exam finished");
            };
            if answer.is_empty() {
                break;
            }
            let listed = answer
                .parse::<u64>()
                .ok()
                .filter(|id| options.iter().any(|o| o.id == *id));
            let Some(option_id) = listed else {
                io.say(format!("Not one of the listed options: {answer:?}"))?;
                continue;
            };
            match exam.answer(question.id, option_id).await {
                Ok(message) => {
                    io.say(message)?;
                    break;
                }
                Err(e) => io.say(format!("Error: {e}"))?,
            }
        }
    }

    let reply = loop {
        match exam.finish().await {
            Ok(reply) => break reply,
            Err(e) => io.retry(e)?,
        }
    };
    io.say(reply.message)?;
    io.say(format!("Score: {}", reply.data))?;
    Ok(())
}
