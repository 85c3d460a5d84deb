//! The analyze pipeline: discover sources, build the shared request,
//! orchestrate the tools, aggregate and report.

use super::Cli;
use crate::config::ProjectConfig;
use crate::discovery;
use crate::models::{AnalysisRequest, Language};
use crate::report;
use crate::scoring;
use crate::tools::Engine;
use anyhow::{ensure, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(cli: Cli) -> Result<()> {
    let program_dir = cli
        .path
        .canonicalize()
        .with_context(|| format!("cannot analyze {}", cli.path.display()))?;
    let config = ProjectConfig::load(&program_dir);

    // CLI flags extend the config file values
    let mut excluded_paths = resolve_paths(&program_dir, &config.exclude);
    excluded_paths.extend(resolve_paths(&program_dir, &cli.exclude));

    let mut custom_asserts = config.custom_asserts.clone();
    custom_asserts.extend(cli.custom_asserts.iter().cloned());

    let mut skipped_tools = config.skip_tools.clone();
    skipped_tools.extend(cli.skip_tool.iter().cloned());

    let source_files = discovery::find_source_files(&program_dir, &excluded_paths)?;
    ensure!(
        !source_files.is_empty(),
        "no C/C++ source files found under {}",
        program_dir.display()
    );
    let lines_of_code = discovery::count_lines_of_code(&source_files)?;
    ensure!(
        lines_of_code > 0,
        "the discovered sources contain no lines of code"
    );
    info!(
        "analyzing {} files, {} lines of pure code",
        source_files.len(),
        lines_of_code
    );

    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| program_dir.join(".codegauge"));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("cannot create {}", output_dir.display()))?;

    let request = AnalysisRequest {
        program_dir: program_dir.clone(),
        source_files,
        lines_of_code,
        function_count: cli.functions,
        language: if cli.cpp { Language::Cpp } else { Language::C },
        excluded_paths,
        custom_asserts,
        compiler_warnings: cli.compiler_warnings,
        compiler_log: cli.compiler_log.clone(),
        sanitizer_log: cli.sanitizer_log.clone(),
        kwstyle_xml: cli
            .kwstyle_xml
            .clone()
            .or_else(|| config.kwstyle_xml.as_ref().map(|p| program_dir.join(p))),
        output_dir,
        tool_timeout: cli.tool_timeout,
    };

    let engine = Engine::with_default_tools(cli.workers)
        .with_strict(cli.strict)
        .without_tools(&skipped_tools);
    let runs = engine.run(&request)?;

    let overall = scoring::composite(runs.iter().map(|r| &r.result));

    match cli.format.as_str() {
        "json" => {
            let quality_report = report::build_report(&runs, overall, &request);
            println!("{}", report::render_json(&quality_report)?);
        }
        _ => print!("{}", report::render_text(&runs, overall, &request)),
    }

    let badge_target = cli
        .badge
        .clone()
        .or_else(|| config.badge.as_ref().map(|p| program_dir.join(p)));
    if let Some(badge_path) = badge_target {
        match overall {
            Some(score) => {
                report::update_badge(&badge_path, score)?;
                info!("badge updated in {}", badge_path.display());
            }
            None => warn!("no score available; badge not updated"),
        }
    }

    Ok(())
}

/// Make config/CLI paths absolute relative to the analyzed directory.
fn resolve_paths(program_dir: &Path, paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                program_dir.join(p)
            }
        })
        .collect()
}
