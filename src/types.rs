use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Language {
    #[serde(rename = "JAVA")]
    Java,
    #[serde(rename = "PYTHON3")]
    Python3,
    #[serde(rename = "CPP")]
    Cpp,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "JAVASCRIPT")]
    Javascript,
    #[serde(other)]
    Unknown,
}

impl Default for Language {
    fn default() -> Self {
        Language::Java
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "JAVA" => Ok(Language::Java),
            "PYTHON3" => Ok(Language::Python3),
            "CPP" => Ok(Language::Cpp),
            "C" => Ok(Language::C),
            "JAVASCRIPT" => Ok(Language::Javascript),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Pending,
    Running,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    RuntimeError,
    CompilationError,
    PartiallyAccepted,
}

impl SubmissionStatus {
    /// A terminal status means the judge is done with this submission.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmissionStatus::Pending | SubmissionStatus::Running)
    }
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        SubmissionStatus::Pending
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub status: SubmissionStatus,
    pub language: Language,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub test_cases_passed: u32,
    #[serde(default)]
    pub total_test_cases: u32,
    pub execution_time: Option<u32>, // ms
    pub output: Option<String>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub is_test_run: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub user_id: i64,
    pub problem_id: i64,
    pub code: String,
    pub language: Language,
    #[serde(default)]
    pub is_test_run: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub submission_id: String,
    pub status: SubmissionStatus,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: i64,
    pub username: String,
    pub full_name: Option<String>,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub problems_solved: u32,
    pub last_submission: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub problems_solved: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: i64,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub expected_output: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_format: String,
    #[serde(default)]
    pub output_format: String,
    #[serde(default)]
    pub constraints: String,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub time_limit: u32, // ms
    #[serde(default)]
    pub memory_limit: u32, // MB
    #[serde(default, alias = "sampleTestCases")]
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub username: String,
    pub contest_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        use SubmissionStatus::*;
        for s in [Pending, Running] {
            assert!(!s.is_terminal());
        }
        for s in [
            Accepted,
            WrongAnswer,
            TimeLimitExceeded,
            MemoryLimitExceeded,
            RuntimeError,
            CompilationError,
            PartiallyAccepted,
        ] {
            assert!(s.is_terminal());
        }
    }

    #[test]
    fn submission_wire_format() {
        let raw = r#"{
            "id": "ab-12",
            "status": "WRONG_ANSWER",
            "language": "PYTHON3",
            "score": 40,
            "testCasesPassed": 2,
            "totalTestCases": 5,
            "executionTime": 17,
            "code": "print(1)",
            "isTestRun": false
        }"#;
        let s: Submission = serde_json::from_str(raw).unwrap();
        assert_eq!(s.status, SubmissionStatus::WrongAnswer);
        assert_eq!(s.language, Language::Python3);
        assert_eq!(s.test_cases_passed, 2);
        assert!(s.status.is_terminal());
    }

    #[test]
    fn unknown_language_is_tolerated() {
        let lang: Language = serde_json::from_str("\"RUST\"").unwrap();
        assert_eq!(lang, Language::Unknown);
    }
}
