use std::path::PathBuf;

use mood::{Arena, Compiler, FileData};

fn main() {
    tracing_subscriber::fmt::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: mood <file.mood>");
        std::process::exit(1);
    };

    let arena = Arena::new();
    let output = Arena::new();

    let mut compiler = Compiler::new(&arena);

    let file = match FileData::open(&path, &mut compiler.string_map) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("cannot read '{path}': {e}");
            std::process::exit(1);
        },
    };

    match compiler.compile(&output, &file) {
        Ok(bytes) => {
            let out_path = PathBuf::from(&path).with_extension("wasm");

            if let Err(e) = std::fs::write(&out_path, bytes) {
                eprintln!("cannot write '{}': {e}", out_path.display());
                std::process::exit(1);
            }

            println!("wrote {}", out_path.display());
        },

        Err(diagnostic) => {
            eprint!("{diagnostic}");
            std::process::exit(1);
        },
    }
}
