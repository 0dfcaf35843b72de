use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use simple_log::{info, LogConfigBuilder};

use contest_client::api::{ContestApi, HttpApi};
use contest_client::config::ClientConfig;
use contest_client::state::ClientState;
use contest_client::store::FileStore;
use contest_client::tracker::SubmissionTracker;
use contest_client::types::{Language, SubmissionRequest};

const USAGE: &str =
    "usage: contest-client <username> <problem_id> <source_file> <language> [run|submit] [config_path]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 5 {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }

    let username = &args[1];
    let problem_id: i64 = args[2].parse().context("problem_id must be an integer")?;
    let source_path = &args[3];
    let language: Language = args[4].parse().map_err(|e: String| anyhow!(e))?;
    let is_test_run = args.get(5).map(String::as_str) == Some("run");
    let config_path = args.get(6).map(String::as_str).unwrap_or("client.json");

    let config = ClientConfig::load_or_default(config_path).await?;

    let log_config = LogConfigBuilder::builder()
        .path("contest_client.log")
        .level("info")
        .output_file()
        .build();
    simple_log::new(log_config).map_err(|e| anyhow!("cannot set up logging: {e}"))?;

    let store = Arc::new(FileStore::open("client_store.json").await);
    let state = ClientState::load(store).await;
    let api: Arc<dyn ContestApi> = Arc::new(HttpApi::new(
        &config.base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?);

    // reuse the persisted session when it matches, otherwise look the user up
    let user = match state.user().await {
        Some(user) if &user.username == username => user,
        _ => {
            let user = api.check_user(username).await?;
            state.set_user(user.clone()).await;
            user
        }
    };
    info!(
        "submitting problem {} for user {} ({})",
        problem_id, user.username, user.id
    );

    let code = tokio::fs::read_to_string(source_path)
        .await
        .with_context(|| format!("cannot read source file {source_path}"))?;

    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    let tracker = SubmissionTracker::new(api, poll_interval);
    let response = tracker
        .submit(SubmissionRequest {
            user_id: user.id,
            problem_id,
            code,
            language,
            is_test_run,
        })
        .await?;
    println!(
        "submission {} created ({:?})",
        response.submission_id, response.status
    );

    let mut last_status = None;
    loop {
        tokio::time::sleep(poll_interval).await;
        let Some(submission) = tracker.latest().await else {
            continue;
        };
        if last_status != Some(submission.status) {
            println!("status: {:?}", submission.status);
            last_status = Some(submission.status);
        }
        if submission.status.is_terminal() {
            println!(
                "verdict: {:?}  score: {}  tests: {}/{}",
                submission.status,
                submission.score,
                submission.test_cases_passed,
                submission.total_test_cases
            );
            if let Some(time) = submission.execution_time {
                println!("execution time: {time}ms");
            }
            if let Some(output) = submission.output {
                println!("output:\n{output}");
            }
            if let Some(error) = submission.error_message {
                println!("error:\n{error}");
            }
            break;
        }
    }
    Ok(())
}
