use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use loom_core::catalog::ImportConfiguration;
use loom_core::config::{ExecutorConfig, load_json};
use loom_core::domain::{CachingDisabledReasonCategory, Cause, TaskOutputCaching, TaskPath};
use loom_core::execution::{
    Build, BuildSpec, ExecutionVerdict, ScriptedAction, TaskAction, TaskNode, WorkResult,
};

/// loom - run build tasks and report how each one finished
#[derive(Parser)]
#[command(name = "loom")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tasks of a JSON build file and print the build report
    Run {
        build_file: PathBuf,

        /// Keep going after a task fails
        #[arg(long = "continue")]
        continue_after_failure: bool,
    },

    /// Check names against a catalog import configuration
    Catalog {
        import_file: PathBuf,

        #[arg(long = "library")]
        libraries: Vec<String>,

        #[arg(long = "bundle")]
        bundles: Vec<String>,

        #[arg(long = "version-name")]
        versions: Vec<String>,
    },

    /// Run a built-in sample build that hits every outcome, then retry the
    /// failed task with a fresh state
    Demo,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    debug!("logging initialized at {level}");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            build_file,
            continue_after_failure,
        } => {
            let mut spec: BuildSpec = load_json(&build_file)?;
            spec.executor.continue_after_failure |= continue_after_failure;
            run_build(Build::from_spec(spec)).await
        }
        Commands::Catalog {
            import_file,
            libraries,
            bundles,
            versions,
        } => {
            let config: ImportConfiguration = load_json(&import_file)?;
            print_json(&CatalogVerdicts::new(&config, &libraries, &bundles, &versions))
        }
        Commands::Demo => {
            let flaky: Arc<dyn TaskAction> = Arc::new(FlakyAction::new(1));
            if let Err(err) = run_build(demo_build(Arc::clone(&flaky))).await {
                warn!(error = %err, "retrying :app:test with a fresh task state");
            }
            let mut retry = Build::new(ExecutorConfig::default());
            retry.add_task(TaskNode::new(":app:test").with_action(flaky));
            run_build(retry).await
        }
    }
}

async fn run_build(mut build: Build) -> Result<()> {
    info!(build = %build.id(), "running build");
    let result = build.run().await;
    print_json(&build.report())?;
    result.context("build failed")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
struct CatalogVerdicts {
    libraries: BTreeMap<String, bool>,
    bundles: BTreeMap<String, bool>,
    versions: BTreeMap<String, bool>,
}

impl CatalogVerdicts {
    fn new(
        config: &ImportConfiguration,
        libraries: &[String],
        bundles: &[String],
        versions: &[String],
    ) -> Self {
        Self {
            libraries: verdicts(libraries, |n| config.include_library(n)),
            bundles: verdicts(bundles, |n| config.include_bundle(n)),
            versions: verdicts(versions, |n| config.include_version(n)),
        }
    }
}

fn verdicts(names: &[String], test: impl Fn(&str) -> bool) -> BTreeMap<String, bool> {
    names
        .iter()
        .map(|name| (name.clone(), test(name)))
        .collect()
}

/// Fails the first `n` times it runs, then succeeds.
struct FlakyAction {
    remaining_failures: AtomicU32,
}

impl FlakyAction {
    fn new(n: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(n),
        }
    }
}

#[async_trait]
impl TaskAction for FlakyAction {
    fn display_name(&self) -> &str {
        "flaky"
    }

    async fn execute(&self, path: &TaskPath) -> Result<WorkResult, Cause> {
        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(Cause::new(format!(
                "intentional failure in {path} (left={left})"
            )));
        }
        Ok(WorkResult::DidWork)
    }
}

fn demo_build(flaky: Arc<dyn TaskAction>) -> Build {
    let succeed: Arc<dyn TaskAction> = Arc::new(ScriptedAction::Succeed { did_work: true });

    let mut build = Build::new(ExecutorConfig {
        continue_after_failure: true,
    });
    build.add_task(TaskNode::new(":app:compile").with_action(Arc::clone(&succeed)));
    build.add_task(
        TaskNode::new(":app:processResources")
            .with_action(Arc::clone(&succeed))
            .with_verdict(ExecutionVerdict::UpToDate),
    );
    build.add_task(
        TaskNode::new(":app:jar")
            .with_action(Arc::clone(&succeed))
            .with_verdict(ExecutionVerdict::FromCache)
            .with_caching(TaskOutputCaching::enabled()),
    );
    build.add_task(
        TaskNode::new(":app:compileKotlin")
            .with_action(Arc::clone(&succeed))
            .has_source(false),
    );
    build.add_task(
        TaskNode::new(":app:javadoc")
            .with_action(Arc::clone(&succeed))
            .enabled(false),
    );
    build.add_task(
        TaskNode::new(":app:test")
            .with_action(flaky)
            .with_caching(TaskOutputCaching::disabled(
                CachingDisabledReasonCategory::NotEnabledForTask,
                "Caching has not been enabled for the task",
            ))
            .incremental(true),
    );
    build.add_task(TaskNode::new(":app:assemble"));
    build
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_core::catalog::IncludeExcludePredicate;

    #[test]
    fn catalog_verdicts_follow_configuration() {
        let config = ImportConfiguration::new(
            IncludeExcludePredicate::new(None::<[&str; 0]>, ["junit"]),
            IncludeExcludePredicate::accept_all(),
            IncludeExcludePredicate::new(Some(["kotlin"]), []),
        );
        let verdicts = CatalogVerdicts::new(
            &config,
            &["guava".to_string(), "junit".to_string()],
            &[],
            &["kotlin".to_string(), "groovy".to_string()],
        );

        assert_eq!(verdicts.libraries["guava"], true);
        assert_eq!(verdicts.libraries["junit"], false);
        assert!(verdicts.bundles.is_empty());
        assert_eq!(verdicts.versions["groovy"], false);
    }

    #[tokio::test]
    async fn demo_build_fails_only_on_the_flaky_task() {
        let flaky: Arc<dyn TaskAction> = Arc::new(FlakyAction::new(1));
        let mut build = demo_build(Arc::clone(&flaky));
        assert!(build.run().await.is_err());

        let report = build.report();
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.from_cache, 1);
        assert_eq!(report.summary.not_run, 0);

        let mut retry = Build::new(ExecutorConfig::default());
        retry.add_task(TaskNode::new(":app:test").with_action(flaky));
        retry.run().await.unwrap();
    }
}
