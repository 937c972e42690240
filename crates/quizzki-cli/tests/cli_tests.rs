//! CLI integration tests using assert_cmd against a wiremock server.

use std::path::Path;
use std::process::Output;

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quizzki() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("quizzki").unwrap()
}

fn ok(message: &str, data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": "SUCCESS",
        "message": message,
        "data": data
    }))
}

/// Run the binary from an empty directory against `url`, off the runtime
/// threads so the mock server keeps serving.
async fn run(dir: &TempDir, url: &str, args: &[&str], stdin: Option<&str>) -> Output {
    let mut cmd = quizzki();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("QUIZZKI_URL", url)
        .env("QUIZZKI_SESSION", dir.path().join("session.toml"))
        .env_remove("RUST_LOG")
        .args(args);
    if let Some(input) = stdin {
        cmd.write_stdin(input.to_string());
    }
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn write_session(dir: &TempDir, content: &str) {
    std::fs::write(dir.path().join("session.toml"), content).unwrap();
}

fn session_file(dir: &Path) -> String {
    std::fs::read_to_string(dir.join("session.toml")).unwrap_or_default()
}

const TEACHER_SESSION: &str = "authAdminToken = \"jwt-t\"\nadminId = \"27\"\n";
const STUDENT_SESSION: &str = "authUserToken = \"jwt-s\"\nuserId = \"42\"\n";

#[tokio::test(flavor = "multi_thread")]
async fn teacher_login_stores_admin_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/teacher"))
        .and(body_json(json!({"email": "a@b.com", "password": "xyz"})))
        .respond_with(ok("Login exitoso", json!({"token": "jwt-t", "id": 27})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let args = ["login", "--email", "a@b.com", "--password", "xyz", "--teacher"];
    run(&dir, &server.uri(), &args, None)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("teacher dashboard"));

    let stored = session_file(dir.path());
    assert!(stored.contains("adminId = \"27\""), "{stored}");
    assert!(stored.contains("authAdminToken = \"jwt-t\""), "{stored}");
    assert!(!stored.contains("userId"));
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_email_never_reaches_server() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let args = ["login", "--email", "not-an-email", "--password", "xyz"];
    run(&dir, &server.uri(), &args, None)
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: El email debe ser válido"));

    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(session_file(dir.path()).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_login_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/student"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "ERROR",
            "message": "Credenciales inválidas",
            "data": null
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let args = ["login", "--email", "a@b.com", "--password", "bad"];
    run(&dir, &server.uri(), &args, None)
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("Credenciales inválidas"));
    assert!(session_file(dir.path()).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_statement_is_rejected_locally() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_session(&dir, TEACHER_SESSION);

    let args = ["teacher", "create-question", "--topic", "1", "--statement", "  "];
    run(&dir, &server.uri(), &args, None)
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("La pregunta no puede estar vacía"));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn teacher_commands_need_a_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_session(&dir, STUDENT_SESSION);

    run(&dir, &server.uri(), &["teacher", "topics"], None)
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("no active teacher session"));
}

#[tokio::test(flavor = "multi_thread")]
async fn subjects_with_groups_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/teacher/subjects"))
        .and(header("Authorization", "Bearer jwt-t"))
        .respond_with(ok("OK", json!([{"ID_MATERIA": 1, "NOMBRE": "Redes"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/teacher/subjects/1/groups"))
        .respond_with(ok(
            "OK",
            json!([{"ID_GRUPO": 10, "NOMBRE": "Grupo A", "SEMESTRE": 3}]),
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_session(&dir, TEACHER_SESSION);

    run(&dir, &server.uri(), &["teacher", "subjects", "--with-groups"], None)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("Redes"))
        .stdout(predicate::str::contains("Grupo A"));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_evaluation_posts_datetime_local() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/teacher/evaluation/create"))
        .and(body_json(json!({
            "name": "Parcial 1",
            "maxTime": 60,
            "questionCount": 10,
            "randomQuestionsCount": 0,
            "passingPercentage": 60.0,
            "coursePercentage": 20.0,
            "startDateTime": "2026-03-01T08:00",
            "endDateTime": "2026-03-01T10:00",
            "topicId": 3,
            "groupId": 4,
            "professorId": 27
        })))
        .respond_with(ok("Evaluación creada", json!({"idEvaluation": 55})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_session(&dir, TEACHER_SESSION);

    let args = [
        "teacher",
        "create-evaluation",
        "--name",
        "Parcial 1",
        "--topic",
        "3",
        "--group",
        "4",
        "--start",
        "2026-03-01T08:00",
        "--end",
        "2026-03-01T10:00",
        "--max-time",
        "60",
        "--question-count",
        "10",
        "--passing",
        "60",
        "--course-weight",
        "20",
    ];
    run(&dir, &server.uri(), &args, None)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("Evaluación creada (evaluation 55)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/student/42/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "message": "Token inválido",
            "data": [{"ID_GRUPO": 1}]
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_session(&dir, STUDENT_SESSION);

    run(&dir, &server.uri(), &["student", "groups"], None)
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Token inválido"));
}

#[tokio::test(flavor = "multi_thread")]
async fn interactive_exam() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/student/42/groups"))
        .and(header("Authorization", "Bearer jwt-s"))
        .respond_with(ok(
            "OK",
            json!([{"ID_GRUPO": 5, "NOMBRE_GRUPO": "A", "NOMBRE_MATERIA": "Redes"}]),
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/student/42/evaluations"))
        .respond_with(ok(
            "OK",
            json!({"ID_EVALUACION": 9, "NOMBRE": "Parcial", "ESTADO": "ACTIVA"}),
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/student/42/evaluations/present"))
        .and(body_json(
            json!({"idEvaluation": 9, "idStudent": 42, "ipSource": "127.0.0.1"}),
        ))
        .respond_with(ok("Presentación iniciada", json!({"id_presentacion": 77})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/student/evaluations/9/questions"))
        .respond_with(ok(
            "OK",
            json!({"preguntas": [{"ID_PREGUNTA": 1, "ENUNCIADO": "¿TCP es confiable?"}]}),
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/student/evaluations/questions/1/options"))
        .respond_with(ok(
            "OK",
            json!({"opciones": [
                {"ID_RESPUESTA": 11, "DESCRIPCION": "Sí"},
                {"ID_RESPUESTA": 12, "DESCRIPCION": "No"}
            ]}),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/student/42/evaluations/register-answer"))
        .and(body_json(
            json!({"idEvaluationPresentation": 77, "idQuestion": 1, "idAnswer": 11}),
        ))
        .respond_with(ok("Respuesta registrada", Value::Null))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/student/evaluations/77/finish"))
        .respond_with(ok("Evaluación finalizada", json!({"calificacion": 10})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_session(&dir, STUDENT_SESSION);

    run(&dir, &server.uri(), &["student", "exam"], Some("5\n9\n11\n"))
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("¿TCP es confiable?"))
        .stdout(predicate::str::contains("Respuesta registrada"))
        .stdout(predicate::str::contains("Score: 10"));
}

#[tokio::test(flavor = "multi_thread")]
async fn logout_and_whoami() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_session(&dir, &format!("{TEACHER_SESSION}{STUDENT_SESSION}"));

    run(&dir, &server.uri(), &["whoami"], None)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("student: id 42"))
        .stdout(predicate::str::contains("teacher: id 27"));

    run(&dir, &server.uri(), &["logout", "--role", "teacher"], None)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out teacher"));

    let stored = session_file(dir.path());
    assert!(!stored.contains("adminId"));
    assert!(stored.contains("userId"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    quizzki()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizzki.toml"));
    assert!(dir.path().join("quizzki.toml").exists());

    quizzki()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    quizzki()
        .current_dir(dir.path())
        .args(["--config", "nope.toml", "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn help_output() {
    quizzki()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Console client for Quizzki examinations"));
}

#[test]
fn version_output() {
    quizzki()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizzki"));
}
