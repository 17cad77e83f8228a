//! Command-line interface.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::delivery::{DeliveryLimits, DeliveryPlan};
use crate::app::pipeline::Pipeline;
use crate::app::report::{OutputFormat, Report, ReportOptions, Reporter};
use crate::app::writer::write_files;
use crate::domain::model::Artifacts;
use crate::infra::config::Config;

#[derive(Debug, Parser)]
#[command(
    name = "genparse",
    author,
    version,
    about = "Split model-generated prose into files, narrative, features, and a file tree"
)]
pub struct Cli {
    /// Extra config file layered over user and workspace config.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a full report of the generated app
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Built-in template name or template file path.
        #[arg(long)]
        template: Option<String>,
        /// Prompt that produced the response, shown in the report.
        #[arg(long)]
        prompt: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List extracted files, or write them to a directory
    Files {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print the file tree
    Tree {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print detected feature highlights
    Features {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print the response with code blocks replaced
    Narrative {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Show how files would be split into chat messages
    Deliver {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Response files to parse; `-` or none reads stdin.
    pub inputs: Vec<PathBuf>,
}

/// A raw response and where it came from.
#[derive(Debug, Clone)]
pub struct Source {
    pub label: String,
    pub raw: String,
}

pub fn run(cli: Cli) -> Result<()> {
    if let Command::Completions { shell } = cli.command {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "genparse", &mut io::stdout());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    let pipeline = Pipeline::from_config(&config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Report {
            input,
            format,
            template,
            prompt,
            output,
        } => {
            let sources = read_sources(&input.inputs)?;
            let artifacts = process(&pipeline, &sources);

            let mut options = ReportOptions::from_config(&config);
            if let Some(format) = format {
                options = options.with_format(format);
            }
            if let Some(template) = template {
                options.template = template;
            }
            options.output_path = output;

            let reports = sources
                .iter()
                .zip(&artifacts)
                .map(|(source, artifacts)| Report::new(&source.raw, artifacts, prompt.as_deref()))
                .collect::<Result<Vec<_>>>()?;
            let rendered = render_reports(&reports, &options)?;
            if options.output_path.is_none() {
                write!(out, "{rendered}")?;
            }
        }
        Command::Files { input, out_dir } => {
            let sources = read_sources(&input.inputs)?;
            let artifacts = process(&pipeline, &sources);
            for (source, artifacts) in sources.iter().zip(&artifacts) {
                section(&mut out, &sources, source)?;
                let files = &artifacts.parse.files;
                match &out_dir {
                    Some(dir) => {
                        let report = write_files(files, dir)?;
                        for path in &report.written {
                            writeln!(out, "wrote {}", path.display())?;
                        }
                        for (path, err) in &report.skipped {
                            writeln!(out, "skipped {path}: {err}")?;
                        }
                    }
                    None => {
                        for file in files {
                            writeln!(
                                out,
                                "{}\t{}\t{} chars",
                                file.path,
                                file.language,
                                file.char_count()
                            )?;
                        }
                    }
                }
            }
        }
        Command::Tree { input } => {
            let sources = read_sources(&input.inputs)?;
            for (source, artifacts) in sources.iter().zip(process(&pipeline, &sources)) {
                section(&mut out, &sources, source)?;
                if !artifacts.tree.is_empty() {
                    writeln!(out, "{}", artifacts.tree)?;
                }
            }
        }
        Command::Features { input } => {
            let sources = read_sources(&input.inputs)?;
            for (source, artifacts) in sources.iter().zip(process(&pipeline, &sources)) {
                section(&mut out, &sources, source)?;
                for (index, feature) in artifacts.features.iter().enumerate() {
                    writeln!(out, "{}. {}: {}", index + 1, feature.name, feature.description)?;
                }
            }
        }
        Command::Narrative { input } => {
            let sources = read_sources(&input.inputs)?;
            for (source, artifacts) in sources.iter().zip(process(&pipeline, &sources)) {
                section(&mut out, &sources, source)?;
                writeln!(out, "{}", artifacts.parse.narrative)?;
            }
        }
        Command::Deliver { input } => {
            let sources = read_sources(&input.inputs)?;
            let limits = DeliveryLimits::from_config(&config);
            for (source, artifacts) in sources.iter().zip(process(&pipeline, &sources)) {
                section(&mut out, &sources, source)?;
                print_plan(&mut out, &artifacts, &limits)?;
            }
        }
        Command::Completions { .. } => {}
    }

    Ok(())
}

fn process(pipeline: &Pipeline, sources: &[Source]) -> Vec<Artifacts> {
    let raws: Vec<&str> = sources.iter().map(|source| source.raw.as_str()).collect();
    pipeline.run_many(&raws)
}

/// Read every input, treating an empty list or `-` as stdin.
pub fn read_sources(inputs: &[PathBuf]) -> Result<Vec<Source>> {
    if inputs.is_empty() {
        return Ok(vec![read_stdin()?]);
    }

    inputs
        .iter()
        .map(|path| {
            if path.as_os_str() == "-" {
                read_stdin()
            } else {
                read_file(path)
            }
        })
        .collect()
}

fn read_file(path: &Path) -> Result<Source> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read response from {}", path.display()))?;
    Ok(Source {
        label: path.display().to_string(),
        raw,
    })
}

fn read_stdin() -> Result<Source> {
    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .context("failed to read response from stdin")?;
    Ok(Source {
        label: "<stdin>".into(),
        raw,
    })
}

fn render_reports(reports: &[Report], options: &ReportOptions) -> Result<String> {
    Ok(Reporter::new()?.write_all(reports, options)?.rendered)
}

fn section(out: &mut impl Write, sources: &[Source], source: &Source) -> Result<()> {
    if sources.len() > 1 {
        writeln!(out, "==> {} <==", source.label)?;
    }
    Ok(())
}

fn print_plan(out: &mut impl Write, artifacts: &Artifacts, limits: &DeliveryLimits) -> Result<()> {
    let plan = DeliveryPlan::build(artifacts, limits);
    let files = &artifacts.parse.files;

    for (index, batch) in plan.batches.iter().enumerate() {
        let paths: Vec<&str> = files[batch.files.clone()]
            .iter()
            .map(|file| file.path.as_str())
            .collect();
        match &batch.caption {
            Some(caption) => writeln!(out, "message {}: {caption} {}", index + 1, paths.join(", "))?,
            None => writeln!(out, "message {}: {}", index + 1, paths.join(", "))?,
        }
    }

    if let Some(preview) = &plan.preview {
        let note = if preview.truncated { " (truncated)" } else { "" };
        writeln!(out, "preview: {}{note}", preview.path)?;
        writeln!(out, "{}", preview.message)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_report_flags() {
        let cli = Cli::try_parse_from([
            "genparse", "-vv", "report", "a.md", "--format", "json", "--prompt", "todo app",
        ])
        .expect("parses");
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Report {
                input,
                format,
                prompt,
                ..
            } => {
                assert_eq!(input.inputs, vec![PathBuf::from("a.md")]);
                assert_eq!(format, Some(OutputFormat::Json));
                assert_eq!(prompt.as_deref(), Some("todo app"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn plan_lists_batches_and_preview() -> Result<()> {
        let raw = "```tsx file=\"app/page.tsx\"\nexport default function Page() {}\n```";
        let artifacts = Pipeline::default().run(raw);
        let mut buffer = Vec::new();
        print_plan(&mut buffer, &artifacts, &DeliveryLimits::default())?;

        let printed = String::from_utf8(buffer)?;
        assert!(printed.starts_with("message 1: app/page.tsx\n"));
        assert!(printed.contains("preview: app/page.tsx\n```tsx\n"));
        Ok(())
    }
}
