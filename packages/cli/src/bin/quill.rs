/**
 * Quill CLI - quill
 *
 * Compile and render Quill templates from the command line
 */
use clap::{Arg, ArgAction, ArgMatches, Command};
use quill_cli::commands::{self, RenderRequest};
use quill_compiler::TemplateCompiler;
use quill_runtime::HtmlRenderer;
use std::path::{Path, PathBuf};
use std::process;

fn cli() -> Command {
    Command::new("quill")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Quill template compiler and renderer")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("emit")
                .about("Print the generated source of a template")
                .arg(Arg::new("file").required(true).value_name("FILE")),
        )
        .subcommand(
            Command::new("render")
                .about("Compile a template and print the rendered HTML")
                .arg(Arg::new("file").required(true).value_name("FILE"))
                .arg(
                    Arg::new("param")
                        .short('p')
                        .long("param")
                        .value_name("NAME=VALUE")
                        .action(ArgAction::Append)
                        .help("Bind a parameter; VALUE is read as JSON when it parses"),
                )
                .arg(
                    Arg::new("params-json")
                        .long("params-json")
                        .value_name("FILE")
                        .help("Read parameters from a JSON object"),
                )
                .arg(
                    Arg::new("reference")
                        .short('r')
                        .long("reference")
                        .value_name("FILE")
                        .action(ArgAction::Append)
                        .help("Template compiled first and usable as a component"),
                )
                .arg(
                    Arg::new("debug")
                        .long("debug")
                        .action(ArgAction::SetTrue)
                        .help("Compile without optimizations"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Compile every template matching a glob pattern")
                .arg(Arg::new("pattern").required(true).value_name("GLOB")),
        )
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn run(matches: &ArgMatches) -> anyhow::Result<bool> {
    let compiler = TemplateCompiler::default();
    match matches.subcommand() {
        Some(("emit", sub)) => {
            let file = sub.get_one::<String>("file").cloned().unwrap_or_default();
            println!("{}", commands::emit(&compiler, Path::new(&file))?);
            Ok(true)
        }
        Some(("render", sub)) => {
            let request = RenderRequest {
                file: sub.get_one::<String>("file").map(PathBuf::from).unwrap_or_default(),
                params: strings(sub, "param"),
                params_json: sub.get_one::<String>("params-json").map(PathBuf::from),
                references: strings(sub, "reference").into_iter().map(PathBuf::from).collect(),
                debug: sub.get_flag("debug"),
            };
            let html = commands::render(&compiler, &HtmlRenderer::default(), &request)?;
            println!("{}", html);
            Ok(true)
        }
        Some(("check", sub)) => {
            let pattern = sub.get_one::<String>("pattern").cloned().unwrap_or_default();
            let report = commands::check(&compiler, &pattern)?;
            for (path, error) in &report.failures {
                eprintln!("{}:\n{}", path.display(), error);
            }
            println!(
                "Checked {} template(s), {} failed",
                report.checked.len(),
                report.failures.len()
            );
            Ok(report.is_success())
        }
        _ => Ok(false),
    }
}

fn main() {
    quill_cli::logging::init();
    let matches = cli().get_matches();

    match run(&matches) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
