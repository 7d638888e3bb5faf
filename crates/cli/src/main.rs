use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use clinic_core::{CoreConfig, CoreError, VitalSignsEvaluator};
use clinic_records::{LimitsFile, VitalSignsRecord};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming a plausibility limits file.
const LIMITS_FILE_ENV: &str = "CLINIC_LIMITS_FILE";

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic vital-signs evaluator")]
struct Cli {
    /// Plausibility limits file (defaults to $CLINIC_LIMITS_FILE)
    #[arg(long, global = true)]
    limits: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one observation and print it with its derived values
    Evaluate {
        /// Observation YAML file
        file: PathBuf,
        /// Evaluation time (RFC 3339, defaults to now)
        #[arg(long, value_parser = parse_now)]
        now: Option<DateTime<Utc>>,
    },
    /// Validate several observations and print one line per file
    Check {
        /// Observation YAML files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Evaluation time (RFC 3339, defaults to now)
        #[arg(long, value_parser = parse_now)]
        now: Option<DateTime<Utc>>,
    },
    /// Print the effective plausibility limits
    Limits,
}

fn parse_now(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp '{value}': {e}"))
}

/// Resolve configuration once at startup.
///
/// An explicit `--limits` wins over `CLINIC_LIMITS_FILE`; with neither, the default clinical
/// ranges apply.
fn load_config(limits_path: Option<PathBuf>) -> anyhow::Result<CoreConfig> {
    let limits_path = limits_path.or_else(|| {
        std::env::var(LIMITS_FILE_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    });

    let Some(path) = limits_path else {
        return Ok(CoreConfig::default());
    };

    tracing::info!("loading plausibility limits from {}", path.display());
    let limits = LimitsFile::read_file(&path)
        .with_context(|| format!("failed to load limits from {}", path.display()))?;
    Ok(CoreConfig::with_limits(limits)?)
}

/// Evaluate `file`, writing the annotated record to `out` or each violation to `errors`.
fn evaluate_file(
    evaluator: &VitalSignsEvaluator,
    file: &Path,
    now: DateTime<Utc>,
    out: &mut impl Write,
    errors: &mut impl Write,
) -> anyhow::Result<()> {
    let observation = VitalSignsRecord::read_file(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    match evaluator.evaluate(observation, now) {
        Ok(evaluated) => {
            write!(out, "{}", VitalSignsRecord::render_evaluated(&evaluated)?)?;
            Ok(())
        }
        Err(CoreError::Rejected(rejection)) => {
            for violation in rejection.violations() {
                writeln!(errors, "{violation}")?;
            }
            bail!(
                "{} rejected with {} violation(s)",
                file.display(),
                rejection.violations().len()
            )
        }
        Err(e) => Err(e.into()),
    }
}

/// Validate every file, writing one summary line per file to `out`.
fn check_files(
    evaluator: &VitalSignsEvaluator,
    files: &[PathBuf],
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut rejected = 0usize;

    for file in files {
        let observation = match VitalSignsRecord::read_file(file) {
            Ok(obs) => obs,
            Err(e) => {
                tracing::error!("failed to read {}: {}", file.display(), e);
                writeln!(out, "{}: unreadable ({e})", file.display())?;
                rejected += 1;
                continue;
            }
        };

        match evaluator.validate(&observation, now) {
            Ok(()) => writeln!(out, "{}: accepted", file.display())?,
            Err(rejection) => {
                rejected += 1;
                let summary: Vec<String> =
                    rejection.violations().iter().map(ToString::to_string).collect();
                writeln!(out, "{}: rejected ({})", file.display(), summary.join("; "))?;
            }
        }
    }

    if rejected > 0 {
        bail!("{rejected} of {} file(s) rejected", files.len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.limits)?;
    let evaluator = VitalSignsEvaluator::new(Arc::new(config));

    match cli.command {
        Some(Commands::Evaluate { file, now }) => {
            evaluate_file(
                &evaluator,
                &file,
                now.unwrap_or_else(Utc::now),
                &mut std::io::stdout().lock(),
                &mut std::io::stderr().lock(),
            )?;
        }
        Some(Commands::Check { files, now }) => {
            check_files(
                &evaluator,
                &files,
                now.unwrap_or_else(Utc::now),
                &mut std::io::stdout().lock(),
            )?;
        }
        Some(Commands::Limits) => {
            print!("{}", LimitsFile::render(evaluator.config().limits())?);
        }
        None => {
            println!("Use 'clinic --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ACCEPTED: &str = r#"patient:
  id: P-0042
  name: Jane Doe
visit_at: "2026-10-14T09:30:00Z"
recorded_by: nurse.adams
measurements:
  systolic_bp: 118
  diastolic_bp: 76
  heart_rate: 72
"#;

    const IMPLAUSIBLE: &str = r#"patient:
  id: P-0043
visit_at: "2026-10-14T10:00:00Z"
recorded_by: nurse.adams
measurements:
  systolic_bp: 320
  diastolic_bp: 70
  heart_rate: 250
  temperature_c: 50.0
"#;

    fn now() -> DateTime<Utc> {
        parse_now("2026-10-15T12:00:00Z").expect("valid timestamp")
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).expect("write file");
        path
    }

    #[test]
    fn parses_evaluate_with_now() {
        let cli = Cli::try_parse_from([
            "clinic",
            "evaluate",
            "visit.yaml",
            "--now",
            "2026-10-15T12:00:00Z",
        ])
        .expect("valid arguments");

        match cli.command {
            Some(Commands::Evaluate { file, now }) => {
                assert_eq!(file, PathBuf::from("visit.yaml"));
                assert_eq!(
                    now.map(|dt| dt.to_rfc3339()).as_deref(),
                    Some("2026-10-15T12:00:00+00:00")
                );
            }
            _ => panic!("expected evaluate command"),
        }
    }

    #[test]
    fn rejects_malformed_now() {
        let result = Cli::try_parse_from(["clinic", "evaluate", "visit.yaml", "--now", "noon"]);
        assert!(result.is_err());
    }

    #[test]
    fn check_requires_files() {
        assert!(Cli::try_parse_from(["clinic", "check"]).is_err());
    }

    #[test]
    fn explicit_limits_path_is_loaded() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("limits.yaml");
        std::fs::write(&path, "heart_rate:\n  min: 40\n  max: 220\n").expect("write limits");

        let config = load_config(Some(path)).expect("load limits");
        assert_eq!(config.limits().heart_rate.max, 220.0);
    }

    #[test]
    fn evaluate_prints_annotated_record() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_file(&dir, "accepted.yaml", ACCEPTED);
        let (mut out, mut errors) = (Vec::new(), Vec::new());

        let evaluator = VitalSignsEvaluator::default();
        evaluate_file(&evaluator, &path, now(), &mut out, &mut errors)
            .expect("plausible observation");

        let out = String::from_utf8(out).expect("utf8");
        assert!(out.contains("derived:"));
        assert!(out.contains("118/76"));
        assert!(errors.is_empty());
    }

    #[test]
    fn evaluate_lists_every_violation_on_rejection() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_file(&dir, "implausible.yaml", IMPLAUSIBLE);
        let (mut out, mut errors) = (Vec::new(), Vec::new());

        let evaluator = VitalSignsEvaluator::default();
        let err = evaluate_file(&evaluator, &path, now(), &mut out, &mut errors)
            .expect_err("implausible observation");

        assert!(err.to_string().contains("rejected with 3 violation(s)"));
        let errors = String::from_utf8(errors).expect("utf8");
        assert_eq!(errors.lines().count(), 3);
        assert!(errors.lines().next().is_some_and(|l| l.starts_with("systolic_bp:")));
        assert!(out.is_empty());
    }

    #[test]
    fn check_prints_one_line_per_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let files = vec![
            write_file(&dir, "accepted.yaml", ACCEPTED),
            write_file(&dir, "implausible.yaml", IMPLAUSIBLE),
            dir.path().join("missing.yaml"),
        ];
        let mut out = Vec::new();

        let err = check_files(&VitalSignsEvaluator::default(), &files, now(), &mut out)
            .expect_err("two files fail");
        assert_eq!(err.to_string(), "2 of 3 file(s) rejected");

        let out = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("accepted.yaml: accepted"));
        assert!(lines[1].contains("implausible.yaml: rejected ("));
        assert!(lines[2].contains("missing.yaml: unreadable"));
    }

    #[test]
    fn check_succeeds_when_all_files_accepted() {
        let dir = tempfile::tempdir().expect("temp dir");
        let files = vec![write_file(&dir, "accepted.yaml", ACCEPTED)];
        let mut out = Vec::new();

        check_files(&VitalSignsEvaluator::default(), &files, now(), &mut out)
            .expect("accepted observation");
        assert_eq!(String::from_utf8(out).expect("utf8").lines().count(), 1);
    }

    #[test]
    fn limits_file_env_var_is_used_without_flag() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_file(&dir, "limits.yaml", "heart_rate:\n  min: 40\n  max: 260\n");
        std::env::set_var(LIMITS_FILE_ENV, &path);

        let config = load_config(None);
        std::env::remove_var(LIMITS_FILE_ENV);

        let config = config.expect("load limits from environment");
        assert_eq!(config.limits().heart_rate.max, 260.0);
    }
}
