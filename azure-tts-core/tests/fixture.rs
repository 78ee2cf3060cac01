use azure_tts_core::{
    command::{speak, CommandContext, Outcome, SpeakArgs},
    credentials::MemoryStore,
    env::MapEnv,
    settings::{SettingsManager, TtsSettings},
    Result,
};
use std::io::Cursor;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::MockServer;

pub const API_VERSION: &str = "2024-02-15";
pub const DEPLOYMENT: &str = "tts-1";

/// A mock Azure endpoint plus an isolated user directory whose
/// `azure/tts.yaml` points at it.
pub struct Fixture {
    pub server: MockServer,
    pub user_dir: TempDir,
    pub settings: SettingsManager,
    pub store: MemoryStore,
    pub env: MapEnv,
}

/// Result of one command run
pub struct Run {
    pub result: Result<Outcome>,
    pub stdout: Vec<u8>,
}

impl Fixture {
    pub async fn new() -> Self {
        let fixture = Self::without_config().await;
        fixture
            .settings
            .save(&TtsSettings {
                api_base: Some(fixture.server.uri()),
                api_version: Some(API_VERSION.to_string()),
                deployment_name: Some(DEPLOYMENT.to_string()),
            })
            .unwrap();
        fixture
    }

    pub async fn without_config() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let server = MockServer::start().await;
        let user_dir = TempDir::new().unwrap();
        let settings = SettingsManager::from_user_dir(user_dir.path().to_path_buf());

        Self {
            server,
            user_dir,
            settings,
            store: MemoryStore::new(),
            env: MapEnv::new(),
        }
    }

    #[allow(dead_code)]
    pub fn speech_path(&self) -> String {
        format!("/openai/deployments/{DEPLOYMENT}/audio/speech")
    }

    #[allow(dead_code)]
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.user_dir.path().join(name)
    }

    /// Run the command with `stdin` as standard input
    pub async fn speak(&self, args: SpeakArgs, stdin: &str) -> Run {
        let ctx = CommandContext {
            env: &self.env,
            store: &self.store,
            settings: &self.settings,
        };
        let mut stdin = Cursor::new(stdin.as_bytes().to_vec());
        let mut stdout = Vec::new();

        let result = speak(args, &ctx, &mut stdin, &mut stdout).await;

        Run { result, stdout }
    }

    /// Number of requests the mock server has seen
    #[allow(dead_code)]
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

pub fn run<F, Fut>(test_fn: F)
where
    F: FnOnce(Fixture) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    run_inner(false, test_fn)
}

#[allow(dead_code)]
pub fn run_without_config<F, Fut>(test_fn: F)
where
    F: FnOnce(Fixture) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    run_inner(true, test_fn)
}

fn run_inner<F, Fut>(without_config: bool, test_fn: F)
where
    F: FnOnce(Fixture) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    use tokio::time::{timeout, Duration};

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    runtime.block_on(async {
        let fixture = if without_config {
            Fixture::without_config().await
        } else {
            Fixture::new().await
        };
        timeout(Duration::from_secs(30), test_fn(fixture))
            .await
            .expect("Test timed out after 30 seconds");
    });
}
