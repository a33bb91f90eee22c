//! nanoc-drv — the compiler driver.
//!
//! The whole pipeline is a strict sequence: lex, parse, analyze, lower to
//! IR, generate assembly. Each stage consumes the immutable output of the
//! one before it, so the driver's job is just to own a [`Session`] (the
//! interner every stage after lexing shares) and run the five stages in
//! order, turning the first error any of them returns into the single
//! fatal [`CompileError`] the binary reports.
//!
//! There is exactly one positional argument and no flags, so there is no
//! `Config` to parse; one invocation compiles exactly one file, so there
//! is no multi-file source map, no incremental cache, no
//! emit-intermediate-representation modes. Per-phase progress is logged
//! with `log::info!` at each stage boundary, initialized via `env_logger`.

use std::fmt;
use std::path::PathBuf;

use nanoc_util::symbol::Interner;
use thiserror::Error;

/// The single fatal-error type the driver ever returns. Every error is
/// fatal and there is no diagnostic formatting beyond a terminating
/// message. Each phase's own error type already carries enough context to
/// describe itself; this just tags which phase it came from.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("no input file given")]
    NoInputFile,

    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Lex(#[from] nanoc_lex::LexError),

    #[error("{0}")]
    Parse(#[from] nanoc_par::ParseError),

    #[error("{0}")]
    Sem(#[from] nanoc_sem::SemError),

    #[error("{0}")]
    Codegen(#[from] nanoc_gen::CodegenError),
}

/// One compilation run: owns the [`Interner`] shared by lexing, parsing,
/// and semantic analysis. Dropped when the run ends — the interner and the
/// two symbol tables inside `nanoc-sem` are scoped to one compilation,
/// never process-wide.
pub struct Session {
    interner: Interner,
}

impl Session {
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
        }
    }

    /// Run the full pipeline over `source`, returning the rendered
    /// assembly listing on success.
    pub fn compile(&mut self, source: &str) -> Result<String, CompileError> {
        log::info!("lexing");
        let tokens = nanoc_lex::tokenize(source, &mut self.interner)?;

        log::info!("parsing");
        let program = nanoc_par::parse(&tokens, &self.interner)?;

        log::info!("analyzing");
        nanoc_sem::analyze(&program, &self.interner)?;

        log::info!("lowering to ir");
        let instrs = nanoc_ir::build(&program);

        log::info!("generating assembly");
        let asm = nanoc_gen::generate(&instrs, &self.interner)?;

        Ok(asm)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

/// The source path: taken from the invocation's last argument, not parsed
/// as a flag — there are none to parse.
fn input_path() -> Option<PathBuf> {
    std::env::args_os().skip(1).last().map(PathBuf::from)
}

/// Entry point shared by the `nanoc` binary: read the one input file,
/// run the pipeline, and print the assembly listing to stdout. Errors are
/// also printed to stdout — stderr is unused — and left for the binary's
/// `main` to translate into a non-zero exit code.
pub fn main() -> Result<(), CompileError> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();

    let path = input_path().ok_or(CompileError::NoInputFile)?;
    log::info!("compiling {}", path.display());

    let source = std::fs::read_to_string(&path).map_err(|source| CompileError::Io {
        path: path.clone(),
        source,
    })?;

    let mut session = Session::new();
    let asm = session.compile(&source)?;

    print!("{asm}");
    Ok(())
}
