//! Data-transfer types exchanged with the Quizzki API.
//!
//! Responses keep the server's column names on the wire (`ID_MATERIA`,
//! `ENUNCIADO`, ...); request bodies are camelCase. Rust-side names are
//! English. The server is loose about identifier types, so ids and counts
//! accept either a JSON number or a numeric string.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};

/// Wire format of evaluation start/end times.
pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Wire format of the "current time" sent when listing open evaluations.
pub const ACTUAL_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Question type used when the teacher does not pick one.
pub const DEFAULT_QUESTION_TYPE: &str = "Selección única";

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Credentials posted to the login endpoint.
///
/// Note: Custom Debug impl masks the password.
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// `data` of a successful login.
#[derive(Clone, PartialEq, Deserialize)]
pub struct LoginGrant {
    pub token: String,
    #[serde(deserialize_with = "flexible::text")]
    pub id: String,
}

impl fmt::Debug for LoginGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginGrant")
            .field("token", &"***")
            .field("id", &self.id)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Subject {
    #[serde(rename = "ID_MATERIA", deserialize_with = "flexible::uint")]
    pub id: u64,
    #[serde(rename = "NOMBRE", default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Topic {
    #[serde(rename = "ID_TEMA", deserialize_with = "flexible::uint")]
    pub id: u64,
    #[serde(rename = "NOMBRE", default)]
    pub name: String,
}

/// A group as the teacher console lists it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Group {
    #[serde(rename = "ID_GRUPO", deserialize_with = "flexible::uint")]
    pub id: u64,
    #[serde(rename = "NOMBRE", default, deserialize_with = "flexible::text")]
    pub name: String,
    #[serde(rename = "SEMESTRE", default, deserialize_with = "flexible::text")]
    pub semester: String,
}

/// A group as the student console lists it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudentGroup {
    #[serde(rename = "ID_GRUPO", deserialize_with = "flexible::uint")]
    pub id: u64,
    #[serde(rename = "NOMBRE_GRUPO", default, deserialize_with = "flexible::text")]
    pub name: String,
    #[serde(rename = "NOMBRE_MATERIA", default)]
    pub subject_name: String,
}

// ---------------------------------------------------------------------------
// Authoring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Question {
    #[serde(rename = "ID_PREGUNTA", deserialize_with = "flexible::uint")]
    pub id: u64,
    #[serde(rename = "ENUNCIADO", default)]
    pub statement: String,
    /// `"S"` for public, `"N"` for private.
    #[serde(rename = "ES_PUBLICA", default)]
    pub visibility: String,
    #[serde(rename = "TIPO_PREGUNTA", default)]
    pub question_type: String,
    #[serde(
        rename = "ID_PREGUNTA_COMPUESTA",
        default,
        deserialize_with = "flexible::opt_uint"
    )]
    pub composed_question_id: Option<u64>,
    #[serde(rename = "ID_TEMA", default, deserialize_with = "flexible::opt_uint")]
    pub topic_id: Option<u64>,
    #[serde(rename = "ID_PROFESOR", default, deserialize_with = "flexible::opt_uint")]
    pub professor_id: Option<u64>,
}

impl Question {
    pub fn is_public(&self) -> bool {
        self.visibility.eq_ignore_ascii_case("S")
    }
}

/// Body of `POST /api/teacher/question/create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub statement: String,
    #[serde(serialize_with = "flag::si_no")]
    pub is_public: bool,
    pub question_type: String,
    pub composed_question_id: Option<u64>,
    pub topic_id: u64,
    pub professor_id: u64,
}

/// Body of `POST /api/teacher/answerOption/create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAnswer {
    pub description: String,
    #[serde(rename = "isCorrect", serialize_with = "flag::si_no")]
    pub is_correct: bool,
    #[serde(rename = "idQuestion")]
    pub question_id: u64,
}

/// Body of `POST /api/teacher/evaluation/create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvaluation {
    pub name: String,
    /// Minutes.
    pub max_time: u32,
    pub question_count: u32,
    pub random_questions_count: u32,
    pub passing_percentage: f64,
    pub course_percentage: f64,
    #[serde(serialize_with = "datetime_local")]
    pub start_date_time: NaiveDateTime,
    #[serde(serialize_with = "datetime_local")]
    pub end_date_time: NaiveDateTime,
    pub topic_id: u64,
    pub group_id: u64,
    pub professor_id: u64,
}

/// Link between an evaluation and one of its questions.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionAssignment {
    pub evaluation_id: u64,
    pub question_id: u64,
    /// Weight of the question within the evaluation.
    pub percentage: f64,
    /// Per-question limit in seconds; `None` means untimed.
    pub time_limit_secs: Option<u32>,
}

impl Serialize for QuestionAssignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Wire<'a> {
            id_evaluation: u64,
            id_question: u64,
            percentage: f64,
            has_max_time: &'a str,
            question_time: u32,
        }

        Wire {
            id_evaluation: self.evaluation_id,
            id_question: self.question_id,
            percentage: self.percentage,
            has_max_time: if self.time_limit_secs.is_some() { "Y" } else { "N" },
            question_time: self.time_limit_secs.unwrap_or(0),
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedQuestion {
    #[serde(rename = "idQuestion", alias = "id", alias = "ID_PREGUNTA")]
    #[serde(deserialize_with = "flexible::uint")]
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedAnswer {
    #[serde(rename = "idAnswer", alias = "id", alias = "ID_RESPUESTA")]
    #[serde(deserialize_with = "flexible::uint")]
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedEvaluation {
    #[serde(rename = "idEvaluation", alias = "id", alias = "ID_EVALUACION")]
    #[serde(deserialize_with = "flexible::uint")]
    pub id: u64,
}

// ---------------------------------------------------------------------------
// Examination
// ---------------------------------------------------------------------------

/// An evaluation open to a student's group.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudentEvaluation {
    #[serde(rename = "ID_EVALUACION", deserialize_with = "flexible::uint")]
    pub id: u64,
    #[serde(rename = "NOMBRE", default)]
    pub name: String,
    #[serde(rename = "FECHA_HORA_INICIO", default)]
    pub starts_at: String,
    #[serde(rename = "FECHA_HORA_FIN", default)]
    pub ends_at: String,
    #[serde(rename = "NUMERO_PREGUNTAS", default, deserialize_with = "flexible::opt_uint")]
    pub question_count: Option<u64>,
    /// Minutes.
    #[serde(rename = "TIEMPO_MAX", default, deserialize_with = "flexible::opt_uint")]
    pub max_time: Option<u64>,
    #[serde(rename = "ESTADO", default)]
    pub state: String,
}

/// Body of `POST /api/student/{id}/evaluations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenEvaluationsQuery {
    pub id_group: u64,
    pub id_student: u64,
    pub actual_date: String,
}

impl OpenEvaluationsQuery {
    pub fn new(group_id: u64, student_id: u64, now: NaiveDateTime) -> Self {
        Self {
            id_group: group_id,
            id_student: student_id,
            actual_date: now.format(ACTUAL_DATE_FORMAT).to_string(),
        }
    }
}

/// Body of `POST /api/student/{id}/evaluations/present`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRequest {
    pub id_evaluation: u64,
    pub id_student: u64,
    pub ip_source: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StartedPresentation {
    #[serde(rename = "id_presentacion", deserialize_with = "flexible::uint")]
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PresentationQuestion {
    #[serde(rename = "ID_PREGUNTA", deserialize_with = "flexible::uint")]
    pub id: u64,
    #[serde(rename = "ENUNCIADO", default)]
    pub statement: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PresentationQuestions {
    #[serde(rename = "preguntas", default)]
    pub questions: Vec<PresentationQuestion>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerOption {
    #[serde(rename = "ID_RESPUESTA", deserialize_with = "flexible::uint")]
    pub id: u64,
    #[serde(rename = "DESCRIPCION", default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuestionOptions {
    #[serde(rename = "opciones", default)]
    pub options: Vec<AnswerOption>,
}

/// Body of `POST /api/student/{id}/evaluations/register-answer`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRegistration {
    pub id_evaluation_presentation: u64,
    pub id_question: u64,
    pub id_answer: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FinishResult {
    #[serde(rename = "calificacion", deserialize_with = "flexible::number")]
    pub score: f64,
}

/// A payload the server sends either as one object or as an array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(v) => v,
            OneOrMany::One(t) => vec![t],
        }
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

fn datetime_local<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(DATETIME_LOCAL_FORMAT))
}

/// Parse a `YYYY-MM-DDTHH:MM` local date-time (seconds optional).
pub fn parse_datetime_local(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, DATETIME_LOCAL_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
        .map_err(|_| format!("invalid date-time '{s}', expected YYYY-MM-DDTHH:MM"))
}

mod flag {
    use serde::Serializer;

    pub fn si_no<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "S" } else { "N" })
    }
}

mod flexible {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
        Text(String),
    }

    pub fn uint<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Int(n) => Ok(n),
            Raw::Float(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
            Raw::Float(f) => Err(D::Error::custom(format!("expected an identifier, got {f}"))),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("expected an identifier, got '{s}'"))),
        }
    }

    pub fn opt_uint<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            None => Ok(None),
            Some(Raw::Int(n)) => Ok(Some(n)),
            Some(Raw::Float(f)) if f >= 0.0 && f.fract() == 0.0 => Ok(Some(f as u64)),
            Some(Raw::Float(_)) => Ok(None),
            Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(Raw::Text(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected an identifier, got '{s}'"))),
        }
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Int(n) => Ok(n as f64),
            Raw::Float(f) => Ok(f),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("expected a number, got '{s}'"))),
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Option::<Raw>::deserialize(d)? {
            None => String::new(),
            Some(Raw::Int(n)) => n.to_string(),
            Some(Raw::Float(f)) => f.to_string(),
            Some(Raw::Text(s)) => s,
        })
    }
}
