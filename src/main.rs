use hlsl2usf::cli::{self, CliResult};

fn main() {
    match cli::process_cli() {
        CliResult::Exit(0) => {}
        CliResult::Exit(code) => std::process::exit(code),
        CliResult::Error(e) => {
            eprintln!("hlsl2usf: error: {e:#}");
            std::process::exit(1);
        }
    }
}
