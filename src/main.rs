use anyhow::{anyhow, Context};
use clap::{App, Arg};

use metal::diagnostics::StderrReporter;
use metal::eval::Evaluator;
use metal::lexer::lex;
use metal::parser::Parser;

fn main() -> anyhow::Result<()> {
    let matches = App::new("metal")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::with_name("tokens")
                .short("t")
                .long("tokens")
                .help("print the token stream"),
        )
        .arg(
            Arg::with_name("ast")
                .short("a")
                .long("ast")
                .help("print the parsed functions"),
        )
        .arg(
            Arg::with_name("args")
                .long("args")
                .value_name("VALUES")
                .takes_value(true)
                .use_delimiter(true)
                .allow_hyphen_values(true)
                .help("comma separated arguments for the last function"),
        )
        .arg(
            Arg::with_name("SOURCE")
                .required(true)
                .multiple(true)
                .help("program source, e.g. 'sq(x) x * x'"),
        )
        .get_matches();

    let source = matches
        .values_of("SOURCE")
        .map(|words| words.collect::<Vec<&str>>().join(" "))
        .unwrap_or_default();
    println!("Source:");
    println!("{}\n", source);

    let args = match matches.values_of("args") {
        Some(values) => values
            .map(|value| {
                value
                    .trim()
                    .parse::<f64>()
                    .with_context(|| format!("invalid argument {:?}", value))
            })
            .collect::<anyhow::Result<Vec<f64>>>()?,
        None => Vec::new(),
    };

    let mut reporter = StderrReporter::new(&source);
    let tokens = lex(&source, &mut reporter);

    if matches.is_present("tokens") {
        println!("Tokens:");
        for token in &tokens {
            println!("{}", token);
        }
        println!();
    }

    let functions = Parser::new(tokens, &mut reporter)
        .parse_program()
        .context("failed to parse function")?;

    if matches.is_present("ast") {
        println!("AST:");
        for function in &functions {
            println!("{}", function);
        }
        println!();
    }

    let mut evaluator = Evaluator::new();
    let mut entry = None;
    for function in functions {
        entry = Some(function.prototype.name.clone());
        evaluator.register(function)?;
    }
    let entry = entry.ok_or_else(|| anyhow!("no function to call"))?;

    println!("Result:");
    println!("{}", evaluator.call(&entry, &args)?);

    Ok(())
}
