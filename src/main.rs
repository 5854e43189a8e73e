mod cli;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() == 1 {
        cli::print_help();
        return;
    }

    let command = match cli::parse_command_from_args(&args) {
        Ok(cmd) => cmd,
        Err(error) => {
            eprintln!("Error: {}", error);
            std::process::exit(1);
        }
    };

    if let Err(error) = cli::execute_command(command) {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}
