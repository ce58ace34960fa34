use {
    argh::FromArgs,
    culpa::throws,
    error::{Reporter, RuntimeError, ScanError},
    liso::{liso, OutputOnly, Response},
    miette::{LabeledSpan, MietteDiagnostic, Report},
    scanner::Scanner,
    std::sync::OnceLock,
};

mod error;
mod literal;
mod scanner;
mod token;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scan a loxlex script and print its token stream, or run a REPL.
#[derive(FromArgs)]
struct Args {
    /// print version information
    #[argh(switch, short = 'v')]
    version: bool,

    /// script file
    #[argh(positional)]
    script: Vec<String>,
}

#[throws(RuntimeError)]
fn main() {
    let args: Args = argh::from_env();

    if args.version {
        println!("{} {}", APP_NAME, APP_VERSION);
        return;
    }

    if args.script.len() > 1 {
        eprintln!("Usage: {} [script file]", APP_NAME);
        std::process::exit(64); // sysexits EX_USAGE
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .unicode(true) // liso doesn't wrapln! unicode output well.. use println!
                .color(false) // liso doesn't handle color codes well..
                .context_lines(3)
                .build(),
        )
    }))
    .unwrap();

    let io = liso::InputOutput::new();
    let _ = OUT.set(io.clone_output());

    if args.script.len() == 1 {
        run_script(io, &args.script[0])?;
    } else {
        run_repl(io)?;
    }
}

static OUT: OnceLock<OutputOnly> = OnceLock::new();

#[throws(RuntimeError)]
fn run_repl(mut io: liso::InputOutput) {
    io.prompt(liso!(fg = green, bold, "> ", reset), true, false);
    loop {
        match io.read_blocking() {
            Response::Input(line) => {
                let source = line.as_str();
                io.echoln(liso!(fg = green, dim, "> ", fg = none, source));
                if source.eq_ignore_ascii_case("exit") {
                    break;
                }
                // Each line is scanned on its own; a string or comment
                // cannot continue onto the next prompt.
                run(source);
            }
            Response::Discarded(line) => {
                io.echoln(liso!(bold + dim, "X ", -bold, line));
            }
            Response::Dead => break,
            Response::Quit => break,
            Response::Finish => break,
            _ => {}
        }
    }
}

#[throws(RuntimeError)]
fn run_script(io: liso::InputOutput, script: &str) {
    let contents = std::fs::read_to_string(script)?;
    let errors = run(&contents);
    if errors > 0 {
        drop(io); // put the terminal back before exiting
        std::process::exit(65); // sysexits EX_DATAERR
    }
}

/// Scan one source unit, print its tokens, and return how many lexical
/// errors were reported.
fn run(source: &str) -> usize {
    let mut reporter = LisoReporter { source, errors: 0 };
    let tokens = Scanner::new(source).scan_tokens(&mut reporter);
    for token in &tokens {
        match &token.literal {
            Some(value) => wrapln(format!("{:?} {} {}", token.kind, token.lexeme, value)),
            None => wrapln(format!("{:?} {}", token.kind, token.lexeme)),
        }
    }
    reporter.errors
}

/// Renders lexical errors as miette reports over the scanned source.
struct LisoReporter<'src> {
    source: &'src str,
    errors: usize,
}

impl Reporter for LisoReporter<'_> {
    fn report(&mut self, error: ScanError) {
        self.errors += 1;

        let diag = MietteDiagnostic::new(error.to_string()).with_label(LabeledSpan::at(
            error.span(),
            format!("line {}", error.line()),
        ));
        let report = Report::new(diag).with_source_code(self.source.to_string());

        OUT.get().expect("Must be set at start").println(liso!(
            fg = red,
            bold,
            format!("{:?}", report),
            fg = none
        ));
    }
}

pub fn wrapln(args: impl AsRef<str>) {
    OUT.get()
        .expect("Must be set at start")
        .wrapln(liso!(fg = blue, args.as_ref(), fg = none));
}
