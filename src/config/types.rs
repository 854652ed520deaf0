use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The full run configuration consumed by the test-execution engine
///
/// Constructed once per run and immutable afterwards. Missing keys in a
/// config file fall back to the values of `RunConfiguration::default()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct RunConfiguration {
    /// Root folder scanned for test files, relative to the working directory
    #[serde(alias = "testDir")]
    pub test_directory: PathBuf,

    /// Wall-clock budget per test case, in milliseconds
    #[serde(alias = "timeout")]
    pub global_timeout_ms: u64,

    /// Wait budget for a single expectation to become true, in milliseconds
    #[serde(alias = "expectTimeout")]
    pub assertion_timeout_ms: u64,

    /// Output formats produced after the run, in order
    pub reporters: Vec<ReporterSpec>,

    /// Browser context defaults shared by every project
    #[serde(alias = "use")]
    pub shared_context: BrowserContextDefaults,

    /// Browser/device combinations the suite runs under
    pub projects: Vec<BrowserProjectSpec>,

    /// Dev server bootstrap parameters
    #[serde(alias = "webServer")]
    pub dev_server: DevServerSpec,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            test_directory: PathBuf::from("./e2e"),
            global_timeout_ms: 30_000,
            assertion_timeout_ms: 5_000,
            reporters: vec![
                ReporterSpec::Html {
                    open: OpenPolicy::OnFailure,
                },
                ReporterSpec::List,
            ],
            shared_context: BrowserContextDefaults::default(),
            projects: vec![
                BrowserProjectSpec::desktop_chromium(),
                BrowserProjectSpec::desktop_firefox(),
                BrowserProjectSpec::desktop_webkit(),
            ],
            dev_server: DevServerSpec::default(),
        }
    }
}

impl RunConfiguration {
    /// Look up a project by name and resolve its effective context
    pub fn effective_context(&self, project_name: &str) -> Option<BrowserContextDefaults> {
        self.projects
            .iter()
            .find(|p| p.name == project_name)
            .map(|p| p.effective_context(&self.shared_context))
    }
}

/// A reporter kind plus its options
///
/// Accepts a bare kind string on input (`"list"`) as shorthand for the
/// kind with default options.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReporterSpec {
    Html { open: OpenPolicy },
    List,
}

impl ReporterSpec {
    fn from_kind(kind: &str, open: Option<OpenPolicy>) -> Result<Self, String> {
        match kind {
            "html" => Ok(ReporterSpec::Html {
                open: open.unwrap_or_default(),
            }),
            "list" => Ok(ReporterSpec::List),
            other => Err(format!(
                "unrecognized reporter kind `{}` (expected `html` or `list`)",
                other
            )),
        }
    }
}

impl<'de> Deserialize<'de> for ReporterSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ReporterVisitor;

        impl<'de> Visitor<'de> for ReporterVisitor {
            type Value = ReporterSpec;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a reporter kind string or a map with a `kind` field")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                ReporterSpec::from_kind(v, None).map_err(E::custom)
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut kind: Option<String> = None;
                let mut open: Option<OpenPolicy> = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "kind" => kind = Some(map.next_value()?),
                        "open" => open = Some(map.next_value()?),
                        other => {
                            return Err(de::Error::unknown_field(other, &["kind", "open"]));
                        }
                    }
                }

                let kind = kind.ok_or_else(|| de::Error::missing_field("kind"))?;
                ReporterSpec::from_kind(&kind, open).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(ReporterVisitor)
    }
}

/// When the HTML report should be opened after a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OpenPolicy {
    Never,
    Always,
    #[default]
    OnFailure,
}

impl OpenPolicy {
    pub fn should_open(&self, any_failures: bool) -> bool {
        match self {
            OpenPolicy::Never => false,
            OpenPolicy::Always => true,
            OpenPolicy::OnFailure => any_failures,
        }
    }
}

/// When to capture an execution trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TracePolicy {
    Off,
    On,
    #[default]
    OnFirstRetry,
    RetainOnFailure,
}

impl TracePolicy {
    /// Whether a trace is recorded for the given attempt.
    /// Attempt 0 is the initial run, attempt 1 the first retry.
    pub fn should_record(&self, attempt: u32) -> bool {
        match self {
            TracePolicy::Off => false,
            TracePolicy::On => true,
            TracePolicy::OnFirstRetry => attempt == 1,
            TracePolicy::RetainOnFailure => true,
        }
    }

    /// Whether a recorded trace is kept once the attempt's outcome is known
    pub fn should_keep(&self, attempt: u32, failed: bool) -> bool {
        if !self.should_record(attempt) {
            return false;
        }
        match self {
            TracePolicy::RetainOnFailure => failed,
            _ => true,
        }
    }
}

/// When to capture a screenshot or video artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CapturePolicy {
    Off,
    On,
    #[default]
    OnlyOnFailure,
}

impl CapturePolicy {
    pub fn should_capture(&self, failed: bool) -> bool {
        match self {
            CapturePolicy::Off => false,
            CapturePolicy::On => true,
            CapturePolicy::OnlyOnFailure => failed,
        }
    }
}

/// Browser engine a project runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngine {
    Chromium,
    Firefox,
    Webkit,
}

/// Emulated window size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Context settings shared across projects unless overridden
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct BrowserContextDefaults {
    /// Default origin for relative navigations
    #[serde(rename = "baseURL", alias = "baseUrl")]
    pub base_url: String,

    pub trace: TracePolicy,
    pub screenshot: CapturePolicy,
    pub video: CapturePolicy,

    /// Budget per page action, in milliseconds
    #[serde(rename = "actionTimeout", alias = "actionTimeoutMs")]
    pub action_timeout_ms: u64,

    /// Budget per navigation, in milliseconds
    #[serde(rename = "navigationTimeout", alias = "navigationTimeoutMs")]
    pub navigation_timeout_ms: u64,

    pub viewport: Viewport,

    /// BCP 47 locale tag
    pub locale: String,
}

impl Default for BrowserContextDefaults {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            trace: TracePolicy::OnFirstRetry,
            screenshot: CapturePolicy::OnlyOnFailure,
            video: CapturePolicy::OnlyOnFailure,
            action_timeout_ms: 10_000,
            navigation_timeout_ms: 15_000,
            viewport: Viewport::default(),
            locale: "en-US".to_string(),
        }
    }
}

impl BrowserContextDefaults {
    /// Apply a project's overrides on top of these defaults
    pub fn merged(&self, overrides: &ContextOverrides) -> BrowserContextDefaults {
        BrowserContextDefaults {
            base_url: overrides
                .base_url
                .clone()
                .unwrap_or_else(|| self.base_url.clone()),
            trace: overrides.trace.unwrap_or(self.trace),
            screenshot: overrides.screenshot.unwrap_or(self.screenshot),
            video: overrides.video.unwrap_or(self.video),
            action_timeout_ms: overrides.action_timeout_ms.unwrap_or(self.action_timeout_ms),
            navigation_timeout_ms: overrides
                .navigation_timeout_ms
                .unwrap_or(self.navigation_timeout_ms),
            viewport: overrides.viewport.unwrap_or(self.viewport),
            locale: overrides
                .locale
                .clone()
                .unwrap_or_else(|| self.locale.clone()),
        }
    }
}

/// Per-project context overrides; unset fields inherit the shared defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ContextOverrides {
    #[serde(rename = "baseURL", alias = "baseUrl")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<TracePolicy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<CapturePolicy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<CapturePolicy>,

    #[serde(rename = "actionTimeout", alias = "actionTimeoutMs")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_timeout_ms: Option<u64>,

    #[serde(rename = "navigationTimeout", alias = "navigationTimeoutMs")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation_timeout_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// A named browser/device combination the suite runs under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserProjectSpec {
    pub name: String,
    pub engine: BrowserEngine,

    /// Device profile: context fields this project overrides
    #[serde(default, alias = "use")]
    pub overrides: ContextOverrides,
}

impl BrowserProjectSpec {
    /// Desktop Chrome profile, inheriting the shared viewport
    pub fn desktop_chromium() -> Self {
        Self {
            name: "chromium".to_string(),
            engine: BrowserEngine::Chromium,
            overrides: ContextOverrides::default(),
        }
    }

    /// Desktop Firefox profile, inheriting the shared viewport
    pub fn desktop_firefox() -> Self {
        Self {
            name: "firefox".to_string(),
            engine: BrowserEngine::Firefox,
            overrides: ContextOverrides::default(),
        }
    }

    /// Desktop Safari profile (WebKit runs wider by default)
    pub fn desktop_webkit() -> Self {
        Self {
            name: "webkit".to_string(),
            engine: BrowserEngine::Webkit,
            overrides: ContextOverrides {
                viewport: Some(Viewport::new(1440, 900)),
                ..Default::default()
            },
        }
    }

    pub fn effective_context(&self, shared: &BrowserContextDefaults) -> BrowserContextDefaults {
        shared.merged(&self.overrides)
    }
}

/// Dev server bootstrap parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct DevServerSpec {
    /// Shell command launching the app under test
    pub command: String,

    /// Readiness-check endpoint
    pub url: String,

    /// Skip launching when something already listens at `url`
    pub reuse_existing_server: bool,

    /// Max wait for readiness, in milliseconds
    #[serde(alias = "timeout")]
    pub timeout_ms: u64,
}

impl Default for DevServerSpec {
    fn default() -> Self {
        Self {
            command: "npm run dev".to_string(),
            url: "http://localhost:3000".to_string(),
            reuse_existing_server: true,
            timeout_ms: 120_000,
        }
    }
}

impl DevServerSpec {
    /// First token of the launch command (the program to look up on PATH)
    pub fn program(&self) -> Option<&str> {
        self.command.split_whitespace().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_record_is_complete() {
        let config = RunConfiguration::default();

        assert_eq!(config.test_directory, PathBuf::from("./e2e"));
        assert!(config.global_timeout_ms > 0);
        assert!(config.assertion_timeout_ms > 0);
        assert!(config.assertion_timeout_ms <= config.global_timeout_ms);
        assert_eq!(config.reporters.len(), 2);
        assert!(!config.projects.is_empty());

        let names: HashSet<_> = config.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), config.projects.len(), "project names must be unique");

        assert_eq!(config.shared_context.viewport, Viewport::new(1280, 720));
        assert_eq!(config.dev_server.command, "npm run dev");
        assert!(config.dev_server.reuse_existing_server);
    }

    #[test]
    fn test_trace_recorded_only_on_first_retry() {
        let policy = TracePolicy::OnFirstRetry;
        assert!(!policy.should_record(0), "no trace for the initial run");
        assert!(policy.should_record(1), "trace for the first retry");
        assert!(!policy.should_record(2));

        assert!(!TracePolicy::Off.should_record(1));
        assert!(TracePolicy::On.should_record(0));
        assert!(TracePolicy::On.should_record(5));
    }

    #[test]
    fn test_trace_retention_follows_outcome() {
        let policy = TracePolicy::RetainOnFailure;
        assert!(policy.should_record(0));
        assert!(policy.should_keep(0, true));
        assert!(!policy.should_keep(0, false));

        assert!(TracePolicy::On.should_keep(0, false));
        assert!(!TracePolicy::OnFirstRetry.should_keep(0, true), "nothing recorded, nothing kept");
    }

    #[test]
    fn test_capture_policy() {
        assert!(CapturePolicy::OnlyOnFailure.should_capture(true));
        assert!(!CapturePolicy::OnlyOnFailure.should_capture(false));
        assert!(CapturePolicy::On.should_capture(false));
        assert!(!CapturePolicy::Off.should_capture(true));
    }

    #[test]
    fn test_open_policy() {
        assert!(OpenPolicy::OnFailure.should_open(true));
        assert!(!OpenPolicy::OnFailure.should_open(false));
        assert!(OpenPolicy::Always.should_open(false));
        assert!(!OpenPolicy::Never.should_open(true));
    }

    #[test]
    fn test_merge_gives_override_precedence() {
        let shared = BrowserContextDefaults::default();
        let overrides = ContextOverrides {
            base_url: Some("http://localhost:4000".to_string()),
            viewport: Some(Viewport::new(390, 844)),
            ..Default::default()
        };

        let merged = shared.merged(&overrides);
        assert_eq!(merged.base_url, "http://localhost:4000");
        assert_eq!(merged.viewport, Viewport::new(390, 844));
        // untouched fields inherit
        assert_eq!(merged.trace, shared.trace);
        assert_eq!(merged.locale, shared.locale);
        assert_eq!(merged.action_timeout_ms, shared.action_timeout_ms);
    }

    #[test]
    fn test_effective_context_by_project_name() {
        let config = RunConfiguration::default();

        let chromium = config.effective_context("chromium").unwrap();
        assert_eq!(chromium.viewport, Viewport::new(1280, 720));

        let webkit = config.effective_context("webkit").unwrap();
        assert_eq!(webkit.viewport, Viewport::new(1440, 900));
        assert_eq!(webkit.base_url, config.shared_context.base_url);

        assert!(config.effective_context("ie11").is_none());
    }

    #[test]
    fn test_reporter_accepts_bare_kind_string() {
        let reporters: Vec<ReporterSpec> = serde_yaml::from_str("- html\n- list\n").unwrap();
        assert_eq!(
            reporters,
            vec![
                ReporterSpec::Html {
                    open: OpenPolicy::OnFailure
                },
                ReporterSpec::List,
            ]
        );
    }

    #[test]
    fn test_reporter_accepts_map_form() {
        let reporter: ReporterSpec = serde_yaml::from_str("kind: html\nopen: always\n").unwrap();
        assert_eq!(
            reporter,
            ReporterSpec::Html {
                open: OpenPolicy::Always
            }
        );
    }

    #[test]
    fn test_unknown_reporter_kind_is_rejected_with_message() {
        let err = serde_yaml::from_str::<Vec<ReporterSpec>>("- junit\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unrecognized reporter kind"), "got: {}", msg);
        assert!(msg.contains("junit"), "got: {}", msg);

        let err = serde_yaml::from_str::<ReporterSpec>("kind: teamcity\n").unwrap_err();
        assert!(err.to_string().contains("teamcity"));
    }

    #[test]
    fn test_policy_wire_names_are_kebab_case() {
        assert_eq!(
            serde_json::to_string(&TracePolicy::OnFirstRetry).unwrap(),
            "\"on-first-retry\""
        );
        assert_eq!(
            serde_json::to_string(&CapturePolicy::OnlyOnFailure).unwrap(),
            "\"only-on-failure\""
        );
        assert_eq!(
            serde_json::to_string(&OpenPolicy::OnFailure).unwrap(),
            "\"on-failure\""
        );

        let parsed: TracePolicy = serde_json::from_str("\"retain-on-failure\"").unwrap();
        assert_eq!(parsed, TracePolicy::RetainOnFailure);
    }

    #[test]
    fn test_dev_server_program_token() {
        let server = DevServerSpec::default();
        assert_eq!(server.program(), Some("npm"));

        let empty = DevServerSpec {
            command: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(empty.program(), None);
    }
}
