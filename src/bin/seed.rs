//! Seeds an admin account and, unless disabled, a sample quiz.
//!
//! Reads the same environment as the server plus `ADMIN_NAME`, `ADMIN_EMAIL`,
//! `ADMIN_PASSWORD`, `RESET_ADMIN_PASSWORD` and `CREATE_SAMPLE_QUIZ`.

use std::env;

use rand::{distributions::Alphanumeric, Rng};

use examly_server::{
    auth::password::hash_password,
    config::Config,
    db::Database,
    errors::AppResult,
    models::domain::{Question, Quiz, Role, User},
    repositories::{MongoQuizRepository, MongoUserRepository, QuizRepository, UserRepository},
    services::slug::generate_slug,
};

const SAMPLE_QUIZ_TITLE: &str = "Sample Quiz";

enum AdminSeed {
    Created { user: User, password: String },
    PasswordReset { user: User, password: String },
    Existing(User),
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn generate_password(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

async fn ensure_admin(users: &MongoUserRepository) -> AppResult<AdminSeed> {
    let name = env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin User".to_string());
    let email = env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let explicit_password = env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty());

    let Some(mut user) = users.find_by_email(&email.trim().to_lowercase()).await? else {
        let password = explicit_password.unwrap_or_else(|| generate_password(14));
        let user = users
            .create(User::new(&name, &email, hash_password(&password)?, Role::Admin))
            .await?;
        return Ok(AdminSeed::Created { user, password });
    };

    match explicit_password {
        Some(password) if env_flag("RESET_ADMIN_PASSWORD", false) => {
            user.password_hash = hash_password(&password)?;
            let user = users.update(user).await?;
            Ok(AdminSeed::PasswordReset { user, password })
        }
        _ => Ok(AdminSeed::Existing(user)),
    }
}

fn sample_question(text: &str, options: [&str; 4], correct: i32) -> Question {
    Question::new(text, options.iter().map(|o| o.to_string()).collect(), correct, 1)
}

async fn ensure_sample_quiz(quizzes: &MongoQuizRepository, admin: &User) -> AppResult<Option<Quiz>> {
    if !env_flag("CREATE_SAMPLE_QUIZ", true) {
        return Ok(None);
    }

    let existing = quizzes
        .list(false)
        .await?
        .into_iter()
        .find(|q| q.created_by == admin.id && q.title == SAMPLE_QUIZ_TITLE);
    if existing.is_some() {
        return Ok(existing);
    }

    let quiz = Quiz::new(
        SAMPLE_QUIZ_TITLE,
        Some("A quick sample quiz to verify the flow.".to_string()),
        &admin.id,
        vec![
            sample_question("What is 2 + 2?", ["1", "2", "3", "4"], 3),
            sample_question("Capital of France?", ["Berlin", "Madrid", "Paris", "Rome"], 2),
            sample_question("Which is a Rust web framework?", ["Django", "Flask", "Actix", "Laravel"], 2),
        ],
        10,
        2,
        &generate_slug(SAMPLE_QUIZ_TITLE),
    );

    Ok(Some(quizzes.create(quiz).await?))
}

async fn run() -> AppResult<()> {
    let config = Config::from_env();
    let db = Database::connect(&config).await?;

    let users = MongoUserRepository::new(&db, &config.users_collection);
    users.ensure_indexes().await?;
    let quizzes = MongoQuizRepository::new(&db, &config.quizzes_collection);
    quizzes.ensure_indexes().await?;

    let admin = match ensure_admin(&users).await? {
        AdminSeed::Created { user, password } => {
            println!("Admin created: {}", user.email);
            println!("Password: {}", password);
            user
        }
        AdminSeed::PasswordReset { user, password } => {
            println!("Admin password reset: {}", user.email);
            println!("New Password: {}", password);
            user
        }
        AdminSeed::Existing(user) => {
            println!("Admin exists: {}", user.email);
            user
        }
    };

    match ensure_sample_quiz(&quizzes, &admin).await? {
        Some(quiz) => {
            println!("Sample quiz ready: {}", quiz.title);
            println!("Share URL (slug): /quiz/{}", quiz.url_slug);
        }
        None => println!("Sample quiz creation skipped."),
    }

    println!("Seeding done.");
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    if let Err(e) = run().await {
        log::error!("Seeding failed: {}", e);
        std::process::exit(1);
    }
}
