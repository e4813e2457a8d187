fn main() {
    if let Err(err) = relroute::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
