mod fetch;
mod render;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use pageaudit_core::headings::{build_hierarchy, extract_headings};
use pageaudit_core::{
    AnalyzerConfig, AuditReport, CatalogFamily, CatalogSet, CategorizedAudit, ContentAnalyzer,
    ContentRecord, HttpSiteProbe, SiteReachability, calculate_metrics, categorize_family,
    extract_content_facts,
};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::render::{PageReport, render_audits, render_page_report};

const APP_NAME: &str = "pageaudit";
const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str = "pageaudit=info,pageaudit_core=info";

#[derive(Debug, Clone, Copy, PartialEq)]
enum FamilySelection {
    One(CatalogFamily),
    All,
}

impl FamilySelection {
    fn families(self) -> Vec<CatalogFamily> {
        match self {
            Self::One(family) => vec![family],
            Self::All => CatalogFamily::ALL.to_vec(),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Input {
    Url(String),
    Record(PathBuf),
    Lighthouse(PathBuf),
}

#[derive(Debug)]
struct CliOptions {
    input: Input,
    family: FamilySelection,
    json: bool,
    probe: bool,
    config_path: Option<PathBuf>,
    save_target: Option<PathBuf>,
}

#[derive(Debug)]
enum CliCommand {
    Run(CliOptions),
    Help,
    Version,
}

fn take_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .filter(|value| !value.starts_with('-'))
        .ok_or_else(|| anyhow!("{flag} requires a value"))
}

fn set_input(slot: &mut Option<Input>, value: Input) -> Result<()> {
    if slot.is_some() {
        return Err(anyhow!("only one of <URL>, --record or --lighthouse may be given"));
    }
    *slot = Some(value);
    Ok(())
}

fn parse_arguments(args: &[String]) -> Result<CliCommand> {
    if args.is_empty() {
        return Ok(CliCommand::Help);
    }

    let mut input: Option<Input> = None;
    let mut family: Option<FamilySelection> = None;
    let mut json = false;
    let mut probe = true;
    let mut config_path: Option<PathBuf> = None;
    let mut save_target: Option<PathBuf> = None;
    let mut i = 0;

    while i < args.len() {
        let arg = args[i].as_str();

        match arg {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "-v" | "--version" => return Ok(CliCommand::Version),
            "--json" => json = true,
            "--no-probe" => probe = false,
            "--record" => {
                let path = take_value(args, i, arg)?;
                set_input(&mut input, Input::Record(PathBuf::from(path)))?;
                i += 1;
            }
            "--lighthouse" => {
                let path = take_value(args, i, arg)?;
                set_input(&mut input, Input::Lighthouse(PathBuf::from(path)))?;
                i += 1;
            }
            "--family" => {
                let value = take_value(args, i, arg)?;
                family = Some(if value.eq_ignore_ascii_case("all") {
                    FamilySelection::All
                } else {
                    FamilySelection::One(value.parse().map_err(|e: String| anyhow!(e))?)
                });
                i += 1;
            }
            "--config" => {
                config_path = Some(PathBuf::from(take_value(args, i, arg)?));
                i += 1;
            }
            "-s" | "--save" => {
                if save_target.is_some() {
                    return Err(anyhow!("--save specified multiple times"));
                }
                save_target = Some(PathBuf::from(take_value(args, i, arg)?));
                i += 1;
            }
            _ if arg.starts_with("--save=") => {
                if save_target.is_some() {
                    return Err(anyhow!("--save specified multiple times"));
                }
                save_target = Some(PathBuf::from(&arg["--save=".len()..]));
            }
            _ if arg.starts_with('-') => return Err(anyhow!("unknown flag: {arg}")),
            _ => set_input(&mut input, Input::Url(arg.to_string()))?,
        }

        i += 1;
    }

    let input = input.ok_or_else(|| anyhow!("missing <URL>, --record or --lighthouse argument"))?;
    if family.is_some() && !matches!(input, Input::Lighthouse(_)) {
        return Err(anyhow!("--family only applies to --lighthouse"));
    }

    Ok(CliCommand::Run(CliOptions {
        input,
        family: family.unwrap_or(FamilySelection::All),
        json,
        probe,
        config_path,
        save_target,
    }))
}

fn print_help() {
    println!("{APP_NAME} {VERSION}: SEO, security, performance and content audit for a web page");
    println!("Usage:");
    println!("  {APP_NAME} [OPTIONS] <URL>");
    println!("  {APP_NAME} [OPTIONS] --record <FILE>");
    println!("  {APP_NAME} [OPTIONS] --lighthouse <FILE> [--family seo|accessibility|performance|all]\n");
    println!("Options:");
    println!("  --record <FILE>         Audit a stored content record (JSON)");
    println!("  --lighthouse <FILE>     Categorize a Lighthouse JSON report");
    println!("  --family <NAME>         Audit family for --lighthouse (default: all)");
    println!("  --json                  Emit JSON instead of the text summary");
    println!("  --no-probe              Skip live sitemap.xml / robots.txt probing");
    println!("  --config <FILE>         Analyzer configuration (JSON)");
    println!("  -s, --save <PATH>       Also write the output to a file or directory");
    println!("  -v, --version           Show version information");
    println!("  -h, --help              Show this help message");
    println!("\nLogs go to stderr; set RUST_LOG to change verbosity.");
}

fn print_version() {
    println!("{APP_NAME} {VERSION}");
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    let Some(path) = path else {
        return Ok(AnalyzerConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    AnalyzerConfig::from_json(&json)
        .with_context(|| format!("invalid config file {}", path.display()))
}

fn load_record(path: &Path) -> Result<ContentRecord> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read content record {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("invalid content record {}", path.display()))
}

async fn reachability_for(
    record: &ContentRecord,
    probe: bool,
    config: &AnalyzerConfig,
) -> Result<SiteReachability> {
    let url = record.url.as_deref().map(str::trim).unwrap_or_default();
    if !probe || Url::parse(url).is_err() {
        return Ok(SiteReachability::unknown());
    }
    let prober = HttpSiteProbe::new(config.probe_timeout())?;
    Ok(prober.probe(url).await)
}

async fn audit_page(record: ContentRecord, probe: bool, config: &AnalyzerConfig) -> Result<PageReport> {
    let reachability = reachability_for(&record, probe, config).await?;
    let metrics = calculate_metrics(&record, &reachability, config)?;

    let html = record.html();
    let text = match record.text_content.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(text) => text.to_string(),
        None => extract_content_facts(html).combined_text(),
    };
    let content = ContentAnalyzer::from_config(config).analyze(&text);

    tracing::info!(
        url = %metrics.url,
        words = content.total_words,
        "page audited"
    );

    Ok(PageReport {
        metrics,
        content,
        heading_tree: build_hierarchy(&extract_headings(html)),
    })
}

fn categorize_report(path: &Path, selection: FamilySelection) -> Result<Vec<CategorizedAudit>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read audit report {}", path.display()))?;
    let report = AuditReport::from_json(&json)
        .with_context(|| format!("invalid audit report {}", path.display()))?;
    let catalogs = CatalogSet::builtin().context("failed to load built-in catalogs")?;

    Ok(selection
        .families()
        .into_iter()
        .map(|family| categorize_family(&catalogs, &report, family))
        .collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    let raw_args = env::args().skip(1).collect::<Vec<_>>();
    let options = match parse_arguments(&raw_args)? {
        CliCommand::Help => {
            print_help();
            return Ok(());
        }
        CliCommand::Version => {
            print_version();
            return Ok(());
        }
        CliCommand::Run(options) => options,
    };

    init_logging();
    let config = load_config(options.config_path.as_deref())?;

    let (output, stem) = match &options.input {
        Input::Url(raw) => {
            let url = Url::parse(raw).context("invalid URL")?;
            let record = fetch::fetch_record(url.as_str()).await?;
            let report = audit_page(record, options.probe, &config).await?;
            (render_page(&report, options.json)?, derive_stem_from_url(&url))
        }
        Input::Record(path) => {
            let record = load_record(path)?;
            let stem = record
                .url
                .as_deref()
                .and_then(|u| Url::parse(u.trim()).ok())
                .map(|u| derive_stem_from_url(&u))
                .unwrap_or_else(|| derive_stem_from_path(path));
            let report = audit_page(record, options.probe, &config).await?;
            (render_page(&report, options.json)?, stem)
        }
        Input::Lighthouse(path) => {
            let audits = categorize_report(path, options.family)?;
            let output = if !options.json {
                render_audits(&audits)
            } else if let [single] = audits.as_slice() {
                serde_json::to_string_pretty(single)? + "\n"
            } else {
                serde_json::to_string_pretty(&audits)? + "\n"
            };
            (output, derive_stem_from_path(path))
        }
    };

    print!("{}", output);

    if let Some(save_base) = options.save_target {
        let output_path = build_output_path(&save_base, &stem, options.json);
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }

        fs::write(&output_path, output.as_bytes())
            .with_context(|| format!("failed to write output file {}", output_path.display()))?;

        tracing::info!(path = %output_path.display(), "wrote output");
    }

    Ok(())
}

fn render_page(report: &PageReport, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(report)? + "\n")
    } else {
        Ok(render_page_report(report))
    }
}

/// A path with a known extension is used as-is; anything else is a directory
fn build_output_path(base: &Path, stem: &str, json: bool) -> PathBuf {
    let has_output_extension = base
        .extension()
        .is_some_and(|ext| ["json", "txt", "md"].iter().any(|e| ext.eq_ignore_ascii_case(e)));

    if has_output_extension {
        base.to_path_buf()
    } else {
        let extension = if json { "json" } else { "txt" };
        base.join(format!("{stem}.{extension}"))
    }
}

fn derive_stem_from_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or("page");
    let mut path_component = url.path().trim_matches('/').replace('/', "_");
    if path_component.is_empty() {
        path_component = "index".to_string();
    }

    let mut parts = vec![sanitize_for_filename(host), sanitize_for_filename(&path_component)];
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        parts.push(sanitize_for_filename(query));
    }

    parts.join("__")
}

fn derive_stem_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    format!("{}__audit", sanitize_for_filename(&stem))
}

fn sanitize_for_filename(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run_options(list: &[&str]) -> CliOptions {
        match parse_arguments(&args(list)).unwrap() {
            CliCommand::Run(options) => options,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn no_arguments_shows_help() {
        assert!(matches!(parse_arguments(&[]).unwrap(), CliCommand::Help));
        assert!(matches!(
            parse_arguments(&args(&["https://example.com", "-v"])).unwrap(),
            CliCommand::Version
        ));
    }

    #[test]
    fn url_with_flags() {
        let options = run_options(&["--json", "https://example.com/", "--no-probe", "-s", "out"]);
        assert_eq!(options.input, Input::Url("https://example.com/".into()));
        assert!(options.json);
        assert!(!options.probe);
        assert_eq!(options.save_target, Some(PathBuf::from("out")));
    }

    #[test]
    fn lighthouse_with_family() {
        let options = run_options(&["--lighthouse", "report.json", "--family", "seo"]);
        assert_eq!(options.input, Input::Lighthouse("report.json".into()));
        assert_eq!(options.family, FamilySelection::One(CatalogFamily::Seo));

        let options = run_options(&["--lighthouse", "report.json"]);
        assert_eq!(options.family, FamilySelection::All);
    }

    #[test]
    fn argument_errors() {
        assert!(parse_arguments(&args(&["--record"])).is_err());
        assert!(parse_arguments(&args(&["--record", "--json"])).is_err());
        assert!(parse_arguments(&args(&["a", "b"])).is_err());
        assert!(parse_arguments(&args(&["--record", "r.json", "https://x.dev"])).is_err());
        assert!(parse_arguments(&args(&["--lighthouse", "r.json", "--family", "speed"])).is_err());
        assert!(parse_arguments(&args(&["https://x.dev", "--family", "seo"])).is_err());
        assert!(parse_arguments(&args(&["--bogus"])).is_err());
        assert!(parse_arguments(&args(&["--json"])).is_err());
    }

    #[test]
    fn output_paths() {
        let url = Url::parse("https://example.com/blog/post?id=3").unwrap();
        let stem = derive_stem_from_url(&url);
        assert_eq!(stem, "example_com__blog_post__id_3");
        assert_eq!(
            build_output_path(Path::new("out"), &stem, true),
            PathBuf::from("out/example_com__blog_post__id_3.json")
        );
        assert_eq!(
            build_output_path(Path::new("report.txt"), &stem, true),
            PathBuf::from("report.txt")
        );
        assert_eq!(
            derive_stem_from_path(Path::new("fixtures/lighthouse.json")),
            "lighthouse__audit"
        );
    }
}
