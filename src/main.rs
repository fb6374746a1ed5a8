// src/main.rs
//
// Analyseur de fonctions — point d’entrée (terminal)
// --------------------------------------------------
// Usage :
//   analyseur-fonctions "<f(x)>" [--x <x0>] [--fenetre <min> <max>] [--points <n>] [-v|-vv]
//
// - Journal : simplelog::TermLogger sur stderr (Warn par défaut, -v Info, -vv Debug)
// - Rapport : stdout, dans l’ordre fonction / domaine / image / intersections / évaluation

use std::process::ExitCode;

use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

mod app;

use app::Options;

fn niveau(verbosite: u8) -> LevelFilter {
    match verbosite {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn main() -> ExitCode {
    let options = match Options::depuis_args(std::env::args().skip(1)) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("erreur : {e}");
            eprintln!("{}", app::USAGE);
            return ExitCode::from(2);
        }
    };

    // Un logger déjà installé n’est pas bloquant : le rapport passe par stdout.
    if let Err(e) = TermLogger::init(
        niveau(options.verbosite),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("journal indisponible : {e}");
    }

    app::executer(&options)
}
