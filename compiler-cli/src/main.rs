#![warn(rust_2018_idioms)]

use ast::Program;
use diagnostics::Diagnostics;
use failure::{Error, ResultExt};
use log::{debug, info};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    process::exit,
};
use structopt::StructOpt;
use termcolor::{ColorChoice, StandardStream};

/// Semantic analysis for LCPL programs.
///
/// Reads a parsed program as JSON, checks it and writes the annotated
/// program back out, even when an error was found.
#[derive(StructOpt)]
#[structopt(name = "lcpl-semant")]
struct Opt {
    /// When to colour diagnostics
    #[structopt(
        long = "color",
        default_value = "auto",
        possible_values = &["auto", "always", "never"],
        parse(try_from_str = parse_color)
    )]
    color: ColorChoice,
    /// The parsed program
    #[structopt(name = "INPUT", parse(from_os_str))]
    input: PathBuf,
    /// Where to write the annotated program
    #[structopt(name = "OUTPUT", parse(from_os_str))]
    output: PathBuf,
}

fn parse_color(choice: &str) -> Result<ColorChoice, String> {
    match choice {
        "auto" => Ok(ColorChoice::Auto),
        "always" => Ok(ColorChoice::Always),
        "never" => Ok(ColorChoice::Never),
        other => Err(format!("invalid color choice: {}", other)),
    }
}

fn main() {
    env_logger::init();
    let opt = Opt::from_args();

    let diagnostics = Diagnostics::new(Box::new(StandardStream::stderr(opt.color)));
    let code = match run(&opt, &diagnostics) {
        Ok(()) if diagnostics.errored() => 1,
        Ok(()) => 0,
        Err(err) => {
            diagnostics.error_without_line(err.as_fail());
            2
        }
    };
    exit(code);
}

/// Semantic errors go to `diagnostics`; only failures to read or write the
/// program are returned.
fn run(opt: &Opt, diagnostics: &Diagnostics) -> Result<(), Error> {
    let mut program = load(&opt.input)?;
    program.check_references()?;
    debug!(
        "loaded {} classes and {} expressions",
        program.classes.len(),
        program.exprs.len()
    );

    match type_checking::check(&mut program) {
        Ok(type_system) => info!("program is valid, {} classes known", type_system.len()),
        Err(err) => diagnostics.error(&err),
    }

    store(&program, &opt.output)
}

fn load(path: &Path) -> Result<Program, Error> {
    let file = File::open(path).with_context(|_| format!("cannot open {}", path.display()))?;
    let program = serde_json::from_reader(BufReader::new(file))
        .with_context(|_| format!("{} does not contain a program", path.display()))?;
    Ok(program)
}

fn store(program: &Program, path: &Path) -> Result<(), Error> {
    let file = File::create(path).with_context(|_| format!("cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, program)
        .with_context(|_| format!("cannot write {}", path.display()))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
