use ffsl::compiler;
use log::error;
use std::env;
use std::process;

fn main() {
    env_logger::init();

    let command = compiler::Command::new();

    match command.run(env::args()) {
        Ok(output) => {
            print!("{}", output)
        }
        Err(err) => {
            error!("compilation failed");
            eprintln!("{}", err);
            process::exit(1);
        }
    };
}
